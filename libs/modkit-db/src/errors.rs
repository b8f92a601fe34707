//! Classification of storage errors.
//!
//! Every [`DbErr`] that leaves the repository layer is folded into exactly one
//! [`RepoError`] kind. Callers branch on the kind only and never look at the
//! driver message.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepoError {
    /// No row matched the identity or filter.
    #[error("{entity} not found")]
    NotFound { entity: String },

    /// Uniqueness or foreign-key constraint violation.
    #[error("constraint violation: {message}")]
    Conflict { message: String },

    /// Anything the classifier does not recognise (connectivity, syntax, decoding...).
    #[error("storage error: {message}")]
    Unknown { message: String },
}

impl RepoError {
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

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

impl From<DbErr> for RepoError {
    fn from(err: DbErr) -> Self {
        classify(err, "record")
    }
}

/// Classify a SeaORM error, naming `entity` in not-found results.
pub fn classify(err: DbErr, entity: &str) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(msg)) => return RepoError::conflict(msg),
        Some(SqlErr::ForeignKeyConstraintViolation(msg)) => return RepoError::conflict(msg),
        _ => {}
    }

    match err {
        DbErr::RecordNotFound(_) | DbErr::RecordNotUpdated => RepoError::not_found(entity),
        DbErr::Exec(_) | DbErr::Query(_) => {
            let message = err.to_string();
            if is_constraint_violation_message(&message) {
                RepoError::conflict(message)
            } else {
                RepoError::unknown(message)
            }
        }
        other => RepoError::unknown(other.to_string()),
    }
}

/// Returns true if the given SQLSTATE / SQLite extended code represents a
/// unique or foreign-key constraint violation (Postgres 23505/23503,
/// SQLite 2067/1555/787).
pub fn is_constraint_violation_code(code: &str) -> bool {
    matches!(code, "23505" | "23503" | "2067" | "1555" | "787")
}

/// Fallback for drivers whose errors were not mapped by `sql_err()`.
///
/// Numeric codes only count right after a `code` or `sqlstate` label, as in
/// `(code: 2067)` or `SQLSTATE 23505`; other numbers in the text are ignored.
fn is_constraint_violation_message(message: &str) -> bool {
    let msg = message.to_lowercase();
    if msg.contains("unique constraint")
        || msg.contains("foreign key constraint")
        || msg.contains("duplicate key")
    {
        return true;
    }

    let tokens: Vec<&str> = msg
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    tokens
        .windows(2)
        .any(|w| matches!(w[0], "code" | "sqlstate") && is_constraint_violation_code(w[1]))
}
