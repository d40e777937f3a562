//! SQLite storage bootstrap and schema lifecycle entry points.
//!
//! # Responsibility
//! - Open and configure SQLite connections for the todolist core.
//! - Bring the store to the latest schema version before data access runs.
//!
//! # Invariants
//! - Schema version is tracked in the `db_meta` table under key `version`.
//! - Core code must not read/write application data before `ensure_schema`
//!   succeeds; any migration failure is fatal to startup.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{default_db_path, open_db, open_db_in_memory, DB_FILE_NAME};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// The on-disk schema was written by a newer binary.
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// `db_meta.version` holds something that is not a non-negative integer.
    CorruptSchemaVersion(String),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::CorruptSchemaVersion(value) => {
                write!(f, "db_meta version value `{value}` is not a valid integer")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } | Self::CorruptSchemaVersion(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
