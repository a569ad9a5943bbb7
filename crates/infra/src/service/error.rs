use thiserror::Error;

use stockroom_auth::PasswordError;
use stockroom_core::DomainError;
use stockroom_reports::{ImportError, ReportError};

use crate::store::StoreError;

/// Use-case failure, flattened so the API can map each variant to a status.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Bad input (deterministic).
    #[error("{0}")]
    Validation(String),
    /// A business rule would be broken (e.g. exit larger than stock).
    #[error("{0}")]
    InvariantViolation(String),
    /// Duplicate code/name, setup already completed, login taken.
    #[error("{0}")]
    Conflict(String),
    #[error("not found")]
    NotFound,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("forbidden: {0}")]
    Forbidden(String),
    /// Persisting or loading failed.
    #[error(transparent)]
    Store(StoreError),
    /// Rendering a report failed.
    #[error(transparent)]
    Report(#[from] ReportError),
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict(msg) | StoreError::Concurrency(msg) => ServiceError::Conflict(msg),
            other => ServiceError::Store(other),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(value: DomainError) -> Self {
        match value {
            DomainError::Validation(msg) => ServiceError::Validation(msg),
            DomainError::InvalidId(msg) => ServiceError::Validation(msg),
            DomainError::InvariantViolation(msg) => ServiceError::InvariantViolation(msg),
            DomainError::Conflict(msg) => ServiceError::Conflict(msg),
            DomainError::NotFound => ServiceError::NotFound,
            DomainError::Unauthorized => ServiceError::Forbidden("unauthorized".into()),
        }
    }
}

impl From<ImportError> for ServiceError {
    fn from(value: ImportError) -> Self {
        ServiceError::Validation(value.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(value: PasswordError) -> Self {
        ServiceError::Internal(value.to_string())
    }
}

impl ServiceError {
    /// Short machine-readable code for API bodies and logs.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Validation(_) => "validation_error",
            ServiceError::InvariantViolation(_) => "invariant_violation",
            ServiceError::Conflict(_) => "conflict",
            ServiceError::NotFound => "not_found",
            ServiceError::InvalidCredentials => "invalid_credentials",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::Store(_) => "store_error",
            ServiceError::Report(_) => "report_error",
            ServiceError::Internal(_) => "internal_error",
        }
    }
}
