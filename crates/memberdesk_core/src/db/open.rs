//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Provide the per-scope connection factory (`Database`).
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - `open_db*` connections have migrations fully applied.
//! - `Database::connect` never migrates; it only verifies the schema version.

use super::migrations::{apply_migrations, current_user_version, latest_version};
use super::unit_of_work::{ScopeMode, UnitOfWork};
use super::{DbError, DbResult};
use log::{debug, error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and applies all pending migrations.
///
/// # Side effects
/// - Performs connection bootstrap and migration checks.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=file");

    let result = Connection::open(path)
        .map_err(DbError::from)
        .and_then(|mut conn| {
            configure_connection(&conn, true)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });
    log_open_result("file", started_at, &result);
    result
}

/// Opens an in-memory SQLite database and applies all pending migrations.
///
/// Each call yields an isolated database; used by repository-level tests.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            configure_connection(&conn, false)?;
            apply_migrations(&mut conn)?;
            Ok(conn)
        });
    log_open_result("memory", started_at, &result);
    result
}

/// Session factory over one SQLite database file.
///
/// Cloning is cheap; every scope gets its own connection, so clones can be
/// moved into worker threads freely.
#[derive(Debug, Clone)]
pub struct Database {
    path: Arc<PathBuf>,
}

impl Database {
    /// Opens (creating if needed) and migrates the database at `path`.
    ///
    /// Every scope reopens `path`, so in-memory and temporary databases are
    /// rejected with `DbError::EphemeralPath`.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        if is_ephemeral_path(&path) {
            error!(
                "event=db_open module=db status=rejected reason=ephemeral_path path={}",
                path.display()
            );
            return Err(DbError::EphemeralPath(path));
        }
        drop(open_db(&path)?);
        Ok(Self {
            path: Arc::new(path),
        })
    }

    /// Database file backing this handle.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }

    /// Opens a configured connection to an already migrated database.
    pub fn connect(&self) -> DbResult<Connection> {
        let conn = Connection::open(self.path.as_path())?;
        configure_connection(&conn, true)?;

        let expected_version = latest_version();
        let actual_version = current_user_version(&conn)?;
        if actual_version != expected_version {
            return Err(DbError::SchemaNotReady {
                expected_version,
                actual_version,
            });
        }
        Ok(conn)
    }

    /// Opens one transactional scope for the operation named by `label`.
    ///
    /// Cancellation is checked before any connection or statement work, so a
    /// request abandoned early never touches the store.
    pub fn begin(
        &self,
        label: &'static str,
        mode: ScopeMode,
        cancel: &CancellationToken,
    ) -> DbResult<UnitOfWork> {
        if cancel.is_cancelled() {
            info!("event=uow_begin module=db status=cancelled scope={label}");
            return Err(DbError::ScopeCancelled(label));
        }
        let conn = self.connect()?;
        UnitOfWork::begin(conn, label, mode)
    }
}

/// True when SQLite would give each connection its own private database:
/// the empty path, `:memory:` and `file:` URIs naming memory.
fn is_ephemeral_path(path: &Path) -> bool {
    let text = path.to_string_lossy();
    let text = text.trim();
    if text.is_empty() || text == ":memory:" {
        return true;
    }
    match text.strip_prefix("file:") {
        Some(uri) => {
            let (name, query) = uri.split_once('?').unwrap_or((uri, ""));
            name.is_empty()
                || name == ":memory:"
                || query.split('&').any(|param| param == "mode=memory")
        }
        None => false,
    }
}

fn configure_connection(conn: &Connection, file_backed: bool) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    if file_backed {
        let mode: String = conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
        debug!("event=db_configure module=db status=ok journal_mode={mode}");
    }
    Ok(())
}

fn log_open_result(mode: &str, started_at: Instant, result: &DbResult<Connection>) {
    match result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode={mode} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::{is_ephemeral_path, Database};
    use crate::db::DbError;
    use std::path::Path;

    #[test]
    fn ephemeral_paths_are_detected() {
        for path in [
            "",
            ":memory:",
            "file::memory:",
            "file::memory:?cache=shared",
            "file:members?mode=memory&cache=shared",
            "file:",
        ] {
            assert!(is_ephemeral_path(Path::new(path)), "{path:?}");
        }
        for path in ["memberdesk.sqlite3", "/var/lib/memberdesk/members.db", "file:members.db"] {
            assert!(!is_ephemeral_path(Path::new(path)), "{path:?}");
        }
    }

    #[test]
    fn database_open_rejects_in_memory_path() {
        let err = Database::open(":memory:").unwrap_err();
        assert!(matches!(err, DbError::EphemeralPath(ref path) if path == Path::new(":memory:")));
        assert!(err.to_string().contains("file path is required"));
    }
}
