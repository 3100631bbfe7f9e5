//! Per-operation transactional scope.
//!
//! # Responsibility
//! - Own the connection and the open transaction of one logical operation.
//! - Make commit and rollback explicit, consuming the scope.
//!
//! # Invariants
//! - A scope ends in exactly one of commit or rollback.
//! - Dropping an unfinished scope rolls it back; no partial write survives.
//! - `ReadWrite` scopes take the SQLite writer lock at `BEGIN`, so writers
//!   are serialized for their whole lifetime.

use super::DbResult;
use log::{debug, error, warn};
use rusqlite::Connection;
use std::ops::Deref;
use std::time::Instant;

/// Locking behavior requested when a scope opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeMode {
    /// `BEGIN DEFERRED`: snapshot reads, no writer lock.
    ReadOnly,
    /// `BEGIN IMMEDIATE`: writer lock held from the first statement.
    ReadWrite,
}

impl ScopeMode {
    fn begin_sql(self) -> &'static str {
        match self {
            Self::ReadOnly => "BEGIN DEFERRED;",
            Self::ReadWrite => "BEGIN IMMEDIATE;",
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
        }
    }
}

/// One open transaction bound to its own connection.
///
/// Repositories borrow the scope through `Deref<Target = Connection>`.
pub struct UnitOfWork {
    conn: Connection,
    label: &'static str,
    mode: ScopeMode,
    started_at: Instant,
    finished: bool,
}

impl UnitOfWork {
    pub(crate) fn begin(conn: Connection, label: &'static str, mode: ScopeMode) -> DbResult<Self> {
        conn.execute_batch(mode.begin_sql())?;
        debug!(
            "event=uow_begin module=db status=ok scope={label} mode={}",
            mode.as_str()
        );
        Ok(Self {
            conn,
            label,
            mode,
            started_at: Instant::now(),
            finished: false,
        })
    }

    /// Operation name used in diagnostics.
    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Locking behavior this scope was opened with.
    pub fn mode(&self) -> ScopeMode {
        self.mode
    }

    /// Durably applies every write made through this scope.
    ///
    /// On failure the scope is still released: `Drop` rolls it back.
    pub fn commit(mut self) -> DbResult<()> {
        self.conn.execute_batch("COMMIT;")?;
        self.finished = true;
        debug!(
            "event=uow_finish module=db status=committed scope={} duration_ms={}",
            self.label,
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }

    /// Discards every write made through this scope.
    pub fn rollback(mut self) -> DbResult<()> {
        self.finished = true;
        self.conn.execute_batch("ROLLBACK;")?;
        debug!(
            "event=uow_finish module=db status=rolled_back scope={} duration_ms={}",
            self.label,
            self.started_at.elapsed().as_millis()
        );
        Ok(())
    }
}

impl Deref for UnitOfWork {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        &self.conn
    }
}

impl Drop for UnitOfWork {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        // SQLite may already have rolled back on its own (e.g. after SQLITE_FULL).
        if self.conn.is_autocommit() {
            return;
        }
        match self.conn.execute_batch("ROLLBACK;") {
            Ok(()) => warn!(
                "event=uow_finish module=db status=rolled_back_on_drop scope={} duration_ms={}",
                self.label,
                self.started_at.elapsed().as_millis()
            ),
            Err(err) => error!(
                "event=uow_finish module=db status=error scope={} error={}",
                self.label, err
            ),
        }
    }
}
