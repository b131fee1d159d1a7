use thiserror::Error;

use crate::session::Phase;

pub type AssessResult<T> = Result<T, AssessError>;

#[derive(Debug, Error)]
pub enum AssessError {
    #[error("assessment not ready: no reference text has been loaded")]
    NotReady,

    #[error("no candidate identity present")]
    MissingCandidate,

    #[error("`{operation}` is not valid while {phase}")]
    InvalidState {
        operation: &'static str,
        phase: Phase,
    },

    #[error("network failure: {0}")]
    Network(String),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("i/o failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("json failure: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv failure: {0}")]
    Csv(#[from] csv::Error),
}

impl AssessError {
    #[must_use]
    pub fn invalid_state(operation: &'static str, phase: Phase) -> Self {
        Self::InvalidState { operation, phase }
    }

    /// Only network failures are worth another attempt.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Stable, machine-readable code for every variant.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotReady => "ASSESS-NOT-READY",
            Self::MissingCandidate => "ASSESS-MISSING-CANDIDATE",
            Self::InvalidState { .. } => "ASSESS-INVALID-STATE",
            Self::Network(_) => "ASSESS-NETWORK",
            Self::Validation(_) => "ASSESS-VALIDATION",
            Self::NotFound(_) => "ASSESS-NOT-FOUND",
            Self::Io(_) => "ASSESS-IO",
            Self::Json(_) => "ASSESS-JSON",
            Self::Csv(_) => "ASSESS-CSV",
        }
    }
}
