use thiserror::Error;

/// Service layer errors
#[derive(Error, Debug)]
pub enum ServiceError {
    #[error(transparent)]
    CoreError(#[from] catalog_core::error::CoreError),

    /// Bad local input (sequence text, missing mandatory reference, media limits).
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// A unique code or title already exists.
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Network or timeout failure of an in-flight call.
    #[error("Transient error: {0}")]
    Transient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(&'static str),
}

impl ServiceError {
    /// Returns `true` if retrying the same call may succeed.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Transient(_))
    }
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
