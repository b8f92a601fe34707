use modkit_db::RepoError;
use thiserror::Error;

/// Error kinds callers can branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Conflict,
    Unauthorized,
    Validation,
    Timeout,
    Unknown,
}

/// Domain-level errors of the catalog services.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("invalid credentials")]
    Unauthorized,

    #[error("validation failed: {field}: {message}")]
    Validation { field: String, message: String },

    #[error("operation {operation} timed out")]
    Timeout { operation: &'static str },

    #[error("internal error: {message}")]
    Unknown { message: String },
}

impl DomainError {
    pub fn not_found(entity: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Unknown { .. } => ErrorKind::Unknown,
        }
    }
}

impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound { entity } => Self::NotFound { entity },
            RepoError::Conflict { message } => Self::Conflict { message },
            RepoError::Unknown { message } => Self::Unknown { message },
        }
    }
}
