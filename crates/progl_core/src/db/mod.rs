//! SQLite connection provider and schema management.
//!
//! # Responsibility
//! - Open, configure and release the single harness connection.
//! - Reset the `PROGL` working table before any data operation.
//!
//! # Invariants
//! - Location and credentials come from an explicit `ConnectionConfig`.
//! - A `Database` is released at most once; later closes are no-ops.

use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::path::PathBuf;

mod open;
pub mod schema;

pub use open::{open_db, open_db_in_memory, Database};

pub type DbResult<T> = Result<T, DbError>;

/// Default on-disk database file, relative to the working directory.
pub const DEFAULT_DB_PATH: &str = "./db/progl.sqlite3";
/// Default user name handed to the connection provider.
pub const DEFAULT_DB_USER: &str = "sa";

/// Where the embedded database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    /// Database file; created together with its parent directory if absent.
    File(PathBuf),
    /// Private in-memory database, discarded on close.
    Memory,
}

impl Display for DbLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Memory => write!(f, ":memory:"),
        }
    }
}

/// Location and credentials for the connection provider.
///
/// SQLite has no authentication, so `user` and `password` are carried for
/// interface parity only. The password never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    pub location: DbLocation,
    pub user: String,
    pub password: String,
}

impl ConnectionConfig {
    /// Config for a private in-memory database with default credentials.
    pub fn in_memory() -> Self {
        Self {
            location: DbLocation::Memory,
            ..Self::default()
        }
    }

    /// Config for a database file at `path` with default credentials.
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: DbLocation::File(path.into()),
            ..Self::default()
        }
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            location: DbLocation::File(PathBuf::from(DEFAULT_DB_PATH)),
            user: DEFAULT_DB_USER.to_string(),
            password: String::new(),
        }
    }
}

impl Debug for ConnectionConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("location", &self.location)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Connection-level failures: the store cannot be opened, used or released.
#[derive(Debug)]
pub enum DbError {
    /// The store at `location` cannot be opened or initialized.
    Connection {
        location: String,
        source: rusqlite::Error,
    },
    /// The parent directory of a database file cannot be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The handle was already released.
    Closed,
    /// Releasing the handle failed.
    Close(rusqlite::Error),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { location, source } => {
                write!(f, "cannot open database `{location}`: {source}")
            }
            Self::Io { path, source } => write!(
                f,
                "cannot create database directory `{}`: {source}",
                path.display()
            ),
            Self::Closed => write!(f, "database connection is already closed"),
            Self::Close(err) => write!(f, "failed to close database connection: {err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::Closed => None,
            Self::Close(err) => Some(err),
        }
    }
}
