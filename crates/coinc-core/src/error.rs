use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

/// Failure reasons surfaced by the grouping engine itself.
///
/// Transport, storage and publish failures are a `coinc-runtime` concern
/// (`RuntimeReason`) — this enum only covers what the Cache/Classifier/
/// Grouping/Decider pipeline can fail on.
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum CoreReason {
    #[error("malformed observation message")]
    BadMessage,
    #[error("retraction for unknown detector")]
    UnknownDetector,
    #[error("sub-group invariant violated")]
    InvariantViolation,
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for CoreReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::BadMessage => 1001,
            Self::UnknownDetector => 1002,
            Self::InvariantViolation => 1003,
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type CoreError = StructError<CoreReason>;
pub type CoreResult<T> = Result<T, CoreError>;
