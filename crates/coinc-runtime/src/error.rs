use derive_more::From;
use orion_error::{ErrorCode, StructError, UvsReason};

use coinc_core::error::CoreReason;

/// Failure reasons surfaced above the grouping engine: bootstrap, shutdown,
/// and the collaborator-level transport/publish/storage failures that
/// `coinc-core`'s `BusError`/`PublishError`/`StorageError` only describe as
/// trait contracts.
#[derive(Debug, Clone, PartialEq, thiserror::Error, From)]
pub enum RuntimeReason {
    #[error("bootstrap error: {0}")]
    #[from(skip)]
    Bootstrap(String),
    #[error("shutdown error: {0}")]
    #[from(skip)]
    Shutdown(String),
    #[error("transient transport error: {0}")]
    #[from(skip)]
    TransientTransport(String),
    #[error("fatal transport error: {0}")]
    #[from(skip)]
    FatalTransport(String),
    #[error("alert publish failed: {0}")]
    #[from(skip)]
    PublisherFailure(String),
    #[error("observation storage failed: {0}")]
    #[from(skip)]
    StorageFailure(String),
    #[error("{0}")]
    Core(CoreReason),
    #[error("{0}")]
    Uvs(UvsReason),
}

impl ErrorCode for RuntimeReason {
    fn error_code(&self) -> i32 {
        match self {
            Self::Bootstrap(_) => 2001,
            Self::Shutdown(_) => 2002,
            Self::TransientTransport(_) => 2003,
            Self::FatalTransport(_) => 2004,
            Self::PublisherFailure(_) => 2005,
            Self::StorageFailure(_) => 2006,
            Self::Core(c) => c.error_code(),
            Self::Uvs(u) => u.error_code(),
        }
    }
}

pub type RuntimeError = StructError<RuntimeReason>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
