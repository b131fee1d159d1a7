use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::collaborators::CandidateId;
use crate::diff::{self, CharacterComparison};
use crate::metrics::{self, Metrics};
use crate::timer::CountdownTimer;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Phase {
    Idle,
    Running,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One attempt at a typing test. Created on start, dropped on restart.
#[derive(Debug, Clone)]
pub struct AssessmentSession {
    pub id: SessionId,
    pub candidate_id: CandidateId,
    pub test_id: String,
    pub reference_text: Arc<str>,
    pub timer: CountdownTimer,
    pub started_at: Option<DateTime<Utc>>,
    /// Replaced wholesale on every input event.
    pub typed_text: Arc<str>,
    pub backspace_count: u32,
}

impl AssessmentSession {
    pub fn new(
        candidate_id: CandidateId,
        test_id: String,
        reference_text: Arc<str>,
        duration_seconds: u32,
    ) -> Self {
        Self {
            id: SessionId::new(),
            candidate_id,
            test_id,
            reference_text,
            timer: CountdownTimer::new(duration_seconds),
            started_at: None,
            typed_text: Arc::from(""),
            backspace_count: 0,
        }
    }

    pub fn duration_seconds(&self) -> u32 {
        self.timer.duration_seconds()
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.timer.remaining_seconds()
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.timer.elapsed_seconds()
    }

    pub fn reference_len(&self) -> usize {
        self.reference_text.chars().count()
    }

    pub fn typed_len(&self) -> usize {
        self.typed_text.chars().count()
    }

    pub fn is_fully_typed(&self) -> bool {
        self.typed_len() >= self.reference_len()
    }

    pub fn comparisons(&self) -> Vec<CharacterComparison> {
        diff::compare(&self.reference_text, &self.typed_text)
    }

    pub fn metrics(&self) -> Metrics {
        metrics::compute_metrics(
            &self.reference_text,
            &self.typed_text,
            self.elapsed_seconds(),
            self.backspace_count,
        )
    }
}
