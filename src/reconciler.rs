use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::collaborators::{CandidateId, GradingService};
use crate::metrics::Metrics;
use crate::runtime::AssessmentEvent;
use crate::session::SessionId;

/// Payload handed to the grading authority, keyed by session so the
/// authority can enforce its own at-most-once acceptance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub session_id: SessionId,
    pub candidate_id: CandidateId,
    pub test_id: String,
    pub metrics: Metrics,
    pub backspace_count: u32,
    pub time_taken_seconds: u32,
    pub duration_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Succeeded { warnings: Vec<String> },
    Failed { reason: String },
}

impl SubmissionOutcome {
    pub fn status(&self) -> SubmissionStatus {
        match self {
            Self::Succeeded { .. } => SubmissionStatus::Succeeded,
            Self::Failed { .. } => SubmissionStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    pub backoff: Duration,
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
            jitter: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    /// Exponential backoff before retry number `retry` (1-based).
    pub fn delay_before(&self, retry: u32) -> Duration {
        let base = self
            .backoff
            .saturating_mul(1u32 << retry.saturating_sub(1).min(16));
        if self.jitter.is_zero() {
            return base;
        }
        let jitter_ms = rand::thread_rng().gen_range(0..=self.jitter.as_millis() as u64);
        base + Duration::from_millis(jitter_ms)
    }
}

/// Where a completed session's record goes. The state machine calls this
/// exactly once per transition into `Completed`.
pub trait SubmissionSink {
    fn dispatch(&mut self, record: SubmissionRecord);
}

/// Submits records on a background thread and reports the outcome back
/// into the event loop as [`AssessmentEvent::Submission`].
pub struct ResultReconciler<G: GradingService> {
    service: Arc<G>,
    policy: RetryPolicy,
    events: Sender<AssessmentEvent>,
    /// Completions arrive one at a time, so the latest id is enough to
    /// catch a repeated dispatch.
    last_dispatched: Option<SessionId>,
}

impl<G: GradingService> ResultReconciler<G> {
    pub fn new(service: Arc<G>, policy: RetryPolicy, events: Sender<AssessmentEvent>) -> Self {
        Self {
            service,
            policy,
            events,
            last_dispatched: None,
        }
    }

    /// Blocking submission with bounded retries on transient failures.
    pub fn submit(
        service: &G,
        policy: &RetryPolicy,
        record: &SubmissionRecord,
    ) -> SubmissionOutcome {
        let attempts = policy.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match service.submit(record) {
                Ok(ack) if ack.accepted => {
                    for warning in &ack.warnings {
                        warn!(session_id = %record.session_id, warning = %warning, "grading service warning");
                    }
                    info!(session_id = %record.session_id, attempt, "submission accepted");
                    return SubmissionOutcome::Succeeded {
                        warnings: ack.warnings,
                    };
                }
                Ok(ack) => {
                    warn!(session_id = %record.session_id, "submission rejected");
                    let reason = if ack.warnings.is_empty() {
                        "submission rejected by grading service".to_string()
                    } else {
                        ack.warnings.join("; ")
                    };
                    return SubmissionOutcome::Failed { reason };
                }
                Err(err) if err.is_transient() && attempt < attempts => {
                    let delay = policy.delay_before(attempt);
                    warn!(
                        session_id = %record.session_id,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "submission failed, retrying"
                    );
                    thread::sleep(delay);
                    attempt += 1;
                }
                Err(err) => {
                    warn!(session_id = %record.session_id, attempt, error = %err, "submission failed");
                    return SubmissionOutcome::Failed {
                        reason: err.to_string(),
                    };
                }
            }
        }
    }
}

impl<G: GradingService> SubmissionSink for ResultReconciler<G> {
    fn dispatch(&mut self, record: SubmissionRecord) {
        if self.last_dispatched == Some(record.session_id) {
            warn!(session_id = %record.session_id, "duplicate dispatch ignored");
            return;
        }
        self.last_dispatched = Some(record.session_id);

        let session_id = record.session_id;
        let service = Arc::clone(&self.service);
        let policy = self.policy;
        let events = self.events.clone();

        let spawned = thread::Builder::new()
            .name(format!("reconcile-{session_id}"))
            .spawn(move || {
                let outcome = Self::submit(&service, &policy, &record);
                let _ = events.send(AssessmentEvent::Submission {
                    session_id,
                    outcome,
                });
            });

        if let Err(err) = spawned {
            warn!(session_id = %session_id, error = %err, "could not spawn submission thread");
            let _ = self.events.send(AssessmentEvent::Submission {
                session_id,
                outcome: SubmissionOutcome::Failed {
                    reason: err.to_string(),
                },
            });
        }
    }
}
