//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for groups and todos.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Repository writes validate caller-supplied input before SQL mutations.
//! - Repository APIs return semantic errors (`TodoNotFound`, `Constraint`)
//!   in addition to DB transport errors.
//! - Filters are assembled as predicate + bind-value pairs; values are never
//!   interpolated into SQL text.

use crate::db::DbError;
use crate::model::todo::TodoId;
use crate::model::ValidationError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod group_repo;
pub mod todo_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence and query error for group/todo repositories.
#[derive(Debug)]
pub enum RepoError {
    Validation(ValidationError),
    Db(DbError),
    /// Update/toggle referenced a todo that has no live row.
    TodoNotFound(TodoId),
    /// Schema-level rejection, e.g. a foreign key violation. Not expected in
    /// normal operation since deletes are soft.
    Constraint(String),
    /// Persisted state failed to parse into the domain model.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::TodoNotFound(id) => write!(f, "todo not found: {id}"),
            Self::Constraint(message) => write!(f, "constraint violation: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::TodoNotFound(_) | Self::Constraint(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<ValidationError> for RepoError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(inner, ref message) = value {
            if inner.code == rusqlite::ErrorCode::ConstraintViolation {
                let detail = message
                    .clone()
                    .unwrap_or_else(|| "constraint violation".to_string());
                return Self::Constraint(detail);
            }
        }
        Self::Db(DbError::Sqlite(value))
    }
}
