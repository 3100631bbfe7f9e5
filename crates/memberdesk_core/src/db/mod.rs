//! SQLite storage bootstrap, schema migrations and transactional scopes.
//!
//! # Responsibility
//! - Open and configure SQLite connections for memberdesk core.
//! - Apply schema migrations in deterministic order.
//! - Hand out one `UnitOfWork` per logical operation.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - Core code must not read/write application data before migrations succeed.
//! - Every opened scope ends in exactly one commit or rollback.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;
mod unit_of_work;

pub use open::{open_db, open_db_in_memory, Database};
pub use unit_of_work::{ScopeMode, UnitOfWork};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    /// Connection points at a database that was never migrated by `Database::open`.
    SchemaNotReady {
        expected_version: u32,
        actual_version: u32,
    },
    /// Cancellation was observed before the scope could open.
    ScopeCancelled(&'static str),
    /// Path names a per-connection database that cannot back a `Database`.
    EphemeralPath(PathBuf),
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
            Self::SchemaNotReady {
                expected_version,
                actual_version,
            } => write!(
                f,
                "database requires schema version {expected_version}, got {actual_version}"
            ),
            Self::ScopeCancelled(label) => write!(f, "scope `{label}` cancelled before opening"),
            Self::EphemeralPath(path) => write!(
                f,
                "database path {path:?} is in-memory or temporary; a file path is required"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::UnsupportedSchemaVersion { .. } => None,
            Self::SchemaNotReady { .. } => None,
            Self::ScopeCancelled(_) => None,
            Self::EphemeralPath(_) => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
