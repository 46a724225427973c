//! Retry with exponential backoff around single upstream calls.
//!
//! Every attempt runs under the per-call timeout. Retryable failures are
//! retried up to `max_retries` times with delays of `base_delay * 2^n`.
//! [`ResilientSource`] then downgrades an exhausted call to an empty result so
//! one bad identifier never aborts a batch.

use crate::domain::model::{SemesterDescriptor, SubjectRecord};
use crate::domain::ports::ResultSource;
use crate::utils::error::{ExtractError, Result};
use std::future::Future;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub call_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            base_delay: DEFAULT_BASE_DELAY,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `retry` (1-based).
    pub fn backoff(&self, retry: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries + 1
    }
}

/// Runs `call` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. Returns the last error in the failure cases.
pub async fn call_with_retry<F, Fut, T>(policy: &RetryPolicy, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut retries = 0;

    loop {
        let outcome = match tokio::time::timeout(policy.call_timeout, call()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(ExtractError::TimeoutError {
                operation: operation.to_string(),
                timeout_ms: policy.call_timeout.as_millis() as u64,
            }),
        };

        match outcome {
            Ok(value) => {
                if retries > 0 {
                    tracing::info!(attempts = retries + 1, "{} succeeded after retry", operation);
                }
                return Ok(value);
            }
            Err(e) if e.is_retryable() && retries < policy.max_retries => {
                retries += 1;
                let delay = policy.backoff(retries);
                tracing::warn!(
                    error = %e,
                    attempt = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    "Retrying {}",
                    operation
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::error!(
                        error = %e,
                        attempts = retries + 1,
                        "Max retries exceeded for {}",
                        operation
                    );
                }
                return Err(e);
            }
        }
    }
}

/// Wraps a [`ResultSource`] with the retry policy and the partial-failure rule:
/// once retries are exhausted the call yields an empty list. Non-retryable
/// errors still propagate so the caller can log them as local failures.
pub struct ResilientSource<R: ResultSource> {
    inner: R,
    policy: RetryPolicy,
}

impl<R: ResultSource> ResilientSource<R> {
    pub fn new(inner: R, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    pub fn inner(&self) -> &R {
        &self.inner
    }

    pub async fn fetch_result_list(
        &self,
        regd_no: &str,
        dob: &str,
        session: &str,
    ) -> Result<Vec<SemesterDescriptor>> {
        let outcome = call_with_retry(&self.policy, "fetch_result_list", || {
            self.inner.fetch_result_list(regd_no, dob, session)
        })
        .await;

        match outcome {
            Ok(semesters) => {
                tracing::debug!(
                    "Fetched {} semesters for rollNo: {}, session: {}",
                    semesters.len(),
                    regd_no,
                    session
                );
                Ok(semesters)
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(
                    "Returning empty list due to error for rollNo: {}, session: {}, error: {}",
                    regd_no,
                    session,
                    e
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }

    pub async fn fetch_subject_results(
        &self,
        sem_id: &str,
        regd_no: &str,
        exam_session: &str,
    ) -> Result<Vec<SubjectRecord>> {
        let outcome = call_with_retry(&self.policy, "fetch_subject_results", || {
            self.inner.fetch_subject_results(sem_id, regd_no, exam_session)
        })
        .await;

        match outcome {
            Ok(subjects) => {
                tracing::debug!(
                    "Fetched {} subjects for rollNo: {}, semId: {}",
                    subjects.len(),
                    regd_no,
                    sem_id
                );
                Ok(subjects)
            }
            Err(e) if e.is_retryable() => {
                tracing::error!(
                    "Returning empty list due to error for rollNo: {}, semId: {}, error: {}",
                    regd_no,
                    sem_id,
                    e
                );
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
