//! Connection bootstrap and release for the embedded SQLite store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections from a `ConnectionConfig`.
//! - Configure connection pragmas used by the harness.
//! - Release the connection exactly once, even on failure paths.
//!
//! # Invariants
//! - Opening a missing file database creates it and its parent directory.
//! - `Database::close` is idempotent; dropping an open `Database` closes it.

use super::{ConnectionConfig, DbError, DbLocation, DbResult};
use log::{debug, error, info, warn};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Owner of the single harness connection.
#[derive(Debug)]
pub struct Database {
    conn: Option<Connection>,
    location: DbLocation,
}

impl Database {
    /// Borrows the open connection.
    ///
    /// # Errors
    /// - `DbError::Closed` after `close` has run.
    pub fn conn(&self) -> DbResult<&Connection> {
        self.conn.as_ref().ok_or(DbError::Closed)
    }

    pub fn location(&self) -> &DbLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Releases the connection.
    ///
    /// Calling this on an already-closed handle is a no-op. If SQLite refuses
    /// to close, the handle is still considered released and the error is
    /// returned.
    pub fn close(&mut self) -> DbResult<()> {
        let Some(conn) = self.conn.take() else {
            debug!(
                "event=db_close module=db status=skipped location={}",
                self.location
            );
            return Ok(());
        };

        match conn.close() {
            Ok(()) => {
                info!(
                    "event=db_close module=db status=ok location={}",
                    self.location
                );
                Ok(())
            }
            Err((_conn, err)) => {
                error!(
                    "event=db_close module=db status=error location={} error={}",
                    self.location, err
                );
                Err(DbError::Close(err))
            }
        }
    }
}

impl Drop for Database {
    fn drop(&mut self) {
        if self.conn.is_some() {
            warn!(
                "event=db_close module=db status=start trigger=drop location={}",
                self.location
            );
            // close() already logs its own failure.
            let _ = self.close();
        }
    }
}

/// Opens the database described by `config`.
///
/// # Side effects
/// - Creates the parent directory of a file location if it is missing.
/// - Emits `db_open` logging events with duration and status.
///
/// # Errors
/// - `DbError::Io` when the parent directory cannot be created.
/// - `DbError::Connection` when SQLite cannot open or configure the store.
pub fn open_db(config: &ConnectionConfig) -> DbResult<Database> {
    let started_at = Instant::now();
    let mode = mode_label(&config.location);
    info!(
        "event=db_open module=db status=start mode={} location={} user={}",
        mode, config.location, config.user
    );

    let result = match &config.location {
        DbLocation::File(path) => ensure_parent_dir(path).and_then(|()| {
            Connection::open(path).map_err(|source| DbError::Connection {
                location: config.location.to_string(),
                source,
            })
        }),
        DbLocation::Memory => {
            Connection::open_in_memory().map_err(|source| DbError::Connection {
                location: config.location.to_string(),
                source,
            })
        }
    };

    let conn = match result.and_then(|conn| {
        bootstrap_connection(&conn, &config.location)?;
        Ok(conn)
    }) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
    };

    info!(
        "event=db_open module=db status=ok mode={} duration_ms={}",
        mode,
        started_at.elapsed().as_millis()
    );
    Ok(Database {
        conn: Some(conn),
        location: config.location.clone(),
    })
}

/// Opens a private in-memory database with default credentials.
pub fn open_db_in_memory() -> DbResult<Database> {
    open_db(&ConnectionConfig::in_memory())
}

fn ensure_parent_dir(path: &Path) -> DbResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|source| DbError::Io {
                path: parent.to_path_buf(),
                source,
            })
        }
        _ => Ok(()),
    }
}

fn bootstrap_connection(conn: &Connection, location: &DbLocation) -> DbResult<()> {
    let configure = || -> rusqlite::Result<()> {
        conn.busy_timeout(Duration::from_secs(5))?;
        if matches!(location, DbLocation::File(_)) {
            conn.execute_batch("PRAGMA journal_mode = WAL; PRAGMA synchronous = NORMAL;")?;
        }
        Ok(())
    };

    configure().map_err(|source| DbError::Connection {
        location: location.to_string(),
        source,
    })
}

fn mode_label(location: &DbLocation) -> &'static str {
    match location {
        DbLocation::File(_) => "file",
        DbLocation::Memory => "memory",
    }
}
