//! Fan-out of (identifier, session) work units over the upstream service.
//!
//! Every pair becomes its own tokio task. Tasks queue on the shared
//! [`AdmissionGate`], run their two-stage lookup sequentially, and hand their
//! rows back through a `JoinSet`, which is drained in completion order. A task
//! that fails, panics or is cancelled contributes zero rows; the batch always
//! runs to completion.

use crate::core::gate::AdmissionGate;
use crate::core::retry::{ResilientSource, RetryPolicy};
use crate::domain::model::{OutputRow, SemesterDescriptor, WorkUnit};
use crate::domain::ports::ResultSource;
use crate::domain::session::{generate_sessions, SessionLabel};
use crate::utils::error::{ExtractError, Result};
use std::sync::Arc;
use tokio::task::JoinSet;

/// Outcome of one batch.
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    pub rows: Vec<OutputRow>,
    pub sessions: Vec<SessionLabel>,
    pub tasks_dispatched: usize,
    pub tasks_completed: usize,
    pub tasks_failed: usize,
}

pub struct Extractor<R: ResultSource> {
    source: Arc<ResilientSource<R>>,
    gate: Arc<AdmissionGate>,
}

impl<R: ResultSource + 'static> Extractor<R> {
    pub fn new(source: R, policy: RetryPolicy, max_concurrent: usize) -> Self {
        Self {
            source: Arc::new(ResilientSource::new(source, policy)),
            gate: Arc::new(AdmissionGate::new(max_concurrent)),
        }
    }

    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    pub fn source(&self) -> &R {
        self.source.inner()
    }

    pub async fn extract(
        &self,
        identifiers: &[String],
        dob: &str,
        start_session: &str,
        end_session: &str,
    ) -> Result<Vec<OutputRow>> {
        Ok(self
            .run(identifiers, dob, start_session, end_session)
            .await?
            .rows)
    }

    /// Session format and range errors are returned before any task is spawned.
    pub async fn run(
        &self,
        identifiers: &[String],
        dob: &str,
        start_session: &str,
        end_session: &str,
    ) -> Result<ExtractionReport> {
        let sessions = generate_sessions(start_session, end_session)?;
        tracing::info!(
            "Processing {} registration numbers across {} sessions",
            identifiers.len(),
            sessions.len()
        );

        let dob: Arc<str> = Arc::from(dob);
        let mut tasks = JoinSet::new();

        for regd_no in identifiers {
            for session in &sessions {
                let unit = WorkUnit {
                    regd_no: regd_no.clone(),
                    session: *session,
                };
                let source = self.source.clone();
                let gate = self.gate.clone();
                let dob = dob.clone();

                tasks.spawn(async move {
                    let _permit = match gate.acquire().await {
                        Ok(permit) => permit,
                        Err(e) => {
                            tracing::error!(
                                "Could not admit regno: {} session: {}: {}",
                                unit.regd_no,
                                unit.session,
                                e
                            );
                            return Vec::new();
                        }
                    };
                    process_work_unit(&source, &unit, &dob).await
                });
            }
        }

        let mut report = ExtractionReport {
            tasks_dispatched: tasks.len(),
            sessions,
            ..Default::default()
        };

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(mut rows) => {
                    report.tasks_completed += 1;
                    report.rows.append(&mut rows);
                }
                Err(e) if e.is_cancelled() => {
                    report.tasks_failed += 1;
                    tracing::error!("Work unit was cancelled before completing: {}", e);
                }
                Err(e) => {
                    report.tasks_failed += 1;
                    tracing::error!("Error during result extraction: {}", e);
                }
            }
        }

        tracing::info!(
            "Extraction finished: {} rows from {} tasks ({} failed)",
            report.rows.len(),
            report.tasks_dispatched,
            report.tasks_failed
        );
        Ok(report)
    }
}

async fn process_work_unit<R: ResultSource>(
    source: &ResilientSource<R>,
    unit: &WorkUnit,
    dob: &str,
) -> Vec<OutputRow> {
    let session = unit.session.to_string();
    tracing::info!("Processing regno: {} for session: {}", unit.regd_no, session);

    let semesters = match source.fetch_result_list(&unit.regd_no, dob, &session).await {
        Ok(semesters) => semesters,
        Err(e) => {
            tracing::error!("Error processing regno: {}: {}", unit.regd_no, e);
            return Vec::new();
        }
    };

    if semesters.is_empty() {
        tracing::warn!(
            "No results found for regno: {} session: {}",
            unit.regd_no,
            session
        );
        return Vec::new();
    }

    let mut rows = Vec::new();
    for semester in &semesters {
        match process_semester(source, unit, &session, semester).await {
            Ok(mut semester_rows) => rows.append(&mut semester_rows),
            Err(e) => tracing::error!(
                "Error processing semester {} for regno {}: {}",
                semester.sem_id.as_deref().unwrap_or("<missing>"),
                unit.regd_no,
                e
            ),
        }
    }
    rows
}

async fn process_semester<R: ResultSource>(
    source: &ResilientSource<R>,
    unit: &WorkUnit,
    scheduled_session: &str,
    semester: &SemesterDescriptor,
) -> Result<Vec<OutputRow>> {
    let sem_id = semester
        .sem_id
        .as_deref()
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| ExtractError::ProcessingError {
            message: "semester descriptor has no semId".to_string(),
        })?;

    let exam_session = match semester.exam_session.as_deref() {
        Some(label) if !label.trim().is_empty() => label,
        _ => scheduled_session,
    };
    if exam_session != scheduled_session {
        tracing::debug!(
            "regno {} semester {} published under {} (scheduled {})",
            unit.regd_no,
            sem_id,
            exam_session,
            scheduled_session
        );
    }

    let subjects = source
        .fetch_subject_results(sem_id, &unit.regd_no, exam_session)
        .await?;

    Ok(subjects
        .into_iter()
        .map(|subject| OutputRow::from_subject(&unit.regd_no, exam_session, subject))
        .collect())
}
