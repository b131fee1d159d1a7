//! Interfaces to the services around the engine: where tests come from,
//! who authorizes a start, and who grades the result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{AssessError, AssessResult};
use crate::reconciler::SubmissionRecord;

/// A typing test as served by the test backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTest {
    pub test_id: String,
    pub reference_text: String,
    #[serde(default)]
    pub duration_options: Vec<u32>,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub closed: bool,
}

impl ReferenceTest {
    pub fn validate(&self) -> AssessResult<()> {
        if self.reference_text.is_empty() {
            return Err(AssessError::Validation(format!(
                "test `{}` has an empty reference text",
                self.test_id
            )));
        }
        if self.duration_options.contains(&0) {
            return Err(AssessError::Validation(format!(
                "test `{}` offers a zero-second duration",
                self.test_id
            )));
        }
        Ok(())
    }

    /// An empty option list means the backend places no restriction.
    pub fn allows_duration(&self, duration_seconds: u32) -> bool {
        duration_seconds > 0
            && (self.duration_options.is_empty() || self.duration_options.contains(&duration_seconds))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CandidateId(String);

impl CandidateId {
    /// Blank identities are treated as absent.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Grading authority's reply to a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionAck {
    pub accepted: bool,
    #[serde(default)]
    pub warnings: Vec<String>,
}

pub trait TestFetch {
    /// Fails with `NotFound` when the link is unknown or the test is closed.
    fn fetch(&self, link: &str) -> AssessResult<ReferenceTest>;
}

pub trait SessionStartNotifier {
    fn notify_start(
        &self,
        candidate: &CandidateId,
        test_id: &str,
        duration_seconds: u32,
    ) -> AssessResult<()>;
}

pub trait GradingService: Send + Sync + 'static {
    fn submit(&self, record: &SubmissionRecord) -> AssessResult<SubmissionAck>;
}
