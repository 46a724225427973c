use crate::utils::error::{ExtractError, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Semaphore, SemaphorePermit};

pub const DEFAULT_CONCURRENT_REQUESTS: usize = 5;

/// Counting admission gate bounding how many work units talk to the upstream
/// at once. Tracks in-flight and peak counts so the bound can be observed.
#[derive(Debug)]
pub struct AdmissionGate {
    semaphore: Semaphore,
    max_permits: usize,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
    admitted: AtomicUsize,
}

impl AdmissionGate {
    /// A zero limit is raised to one so the gate can never deadlock a batch.
    pub fn new(max_concurrent: usize) -> Self {
        let max_permits = max_concurrent.max(1);
        Self {
            semaphore: Semaphore::new(max_permits),
            max_permits,
            in_flight: AtomicUsize::new(0),
            peak_in_flight: AtomicUsize::new(0),
            admitted: AtomicUsize::new(0),
        }
    }

    /// Waits for a free slot. The slot is released when the permit drops,
    /// whether the holder finished, failed or was cancelled.
    pub async fn acquire(&self) -> Result<GatePermit<'_>> {
        let permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|e| ExtractError::ProcessingError {
                message: format!("Admission gate closed: {}", e),
            })?;

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.admitted.fetch_add(1, Ordering::Relaxed);
        self.update_peak(current);

        Ok(GatePermit {
            _permit: permit,
            in_flight: &self.in_flight,
        })
    }

    fn update_peak(&self, current: usize) {
        let mut peak = self.peak_in_flight.load(Ordering::SeqCst);
        while current > peak {
            match self.peak_in_flight.compare_exchange_weak(
                peak,
                current,
                Ordering::SeqCst,
                Ordering::SeqCst,
            ) {
                Ok(_) => break,
                Err(p) => peak = p,
            }
        }
    }

    pub fn max_concurrent(&self) -> usize {
        self.max_permits
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Total number of permits handed out since creation.
    pub fn admitted(&self) -> usize {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

impl Default for AdmissionGate {
    fn default() -> Self {
        Self::new(DEFAULT_CONCURRENT_REQUESTS)
    }
}

pub struct GatePermit<'a> {
    _permit: SemaphorePermit<'a>,
    in_flight: &'a AtomicUsize,
}

impl Drop for GatePermit<'_> {
    fn drop(&mut self) {
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
