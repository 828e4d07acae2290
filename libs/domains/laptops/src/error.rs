use thiserror::Error;

/// Outcome kinds of the catalog service call patterns
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LaptopError {
    #[error("{0}")]
    InvalidArgument(String),

    #[error("laptop {0} already exists")]
    AlreadyExists(String),

    #[error("{0}")]
    NotFound(String),

    #[error("request is cancelled")]
    Canceled,

    #[error("request deadline exceeded")]
    DeadlineExceeded,

    #[error("{0}")]
    Internal(String),

    #[error("{0}")]
    Unknown(String),
}

pub type LaptopResult<T> = Result<T, LaptopError>;

impl LaptopError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        LaptopError::InvalidArgument(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        LaptopError::Internal(msg.into())
    }

    /// Cancellation and deadline outcomes come from the caller, not from us
    pub fn is_cancellation(&self) -> bool {
        matches!(self, LaptopError::Canceled | LaptopError::DeadlineExceeded)
    }
}

/// Convert LaptopError to tonic::Status at the transport boundary
impl From<LaptopError> for tonic::Status {
    fn from(err: LaptopError) -> Self {
        let msg = err.to_string();
        match err {
            LaptopError::InvalidArgument(_) => tonic::Status::invalid_argument(msg),
            LaptopError::AlreadyExists(_) => tonic::Status::already_exists(msg),
            LaptopError::NotFound(_) => tonic::Status::not_found(msg),
            LaptopError::Canceled => tonic::Status::cancelled(msg),
            LaptopError::DeadlineExceeded => tonic::Status::deadline_exceeded(msg),
            LaptopError::Internal(_) => tonic::Status::internal(msg),
            LaptopError::Unknown(_) => tonic::Status::unknown(msg),
        }
    }
}

/// Failures raised by the store implementations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("image I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// A scan stopped early because the call was cancelled or the
    /// consumer refused a record
    #[error("scan aborted: {0}")]
    Aborted(LaptopError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        StoreError::Poisoned
    }
}
