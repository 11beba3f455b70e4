//! Working table definition and reset.
//!
//! # Invariants
//! - `reset_table` always leaves an empty `PROGL` table behind.
//! - Column limits mirror `model::record` validation via `CHECK` constraints.

use log::{error, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Name of the single working table.
pub const TABLE_NAME: &str = "PROGL";

const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS PROGL;";

const CREATE_TABLE_SQL: &str = "CREATE TABLE PROGL (
    id INTEGER NOT NULL,
    conceptor VARCHAR(300)
        CHECK (conceptor IS NULL OR length(conceptor) <= 300),
    language VARCHAR(50)
        CHECK (language IS NULL OR length(language) <= 50),
    creationDate DATE
        CHECK (
            creationDate IS NULL
            OR creationDate GLOB '[0-9][0-9][0-9][0-9]-[0-9][0-9]-[0-9][0-9]'
        ),
    PRIMARY KEY (id)
);";

pub type SchemaResult<T> = Result<T, SchemaError>;

/// DDL step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaStep {
    DropTable,
    CreateTable,
    Inspect,
}

impl SchemaStep {
    fn as_str(self) -> &'static str {
        match self {
            Self::DropTable => "drop_table",
            Self::CreateTable => "create_table",
            Self::Inspect => "inspect",
        }
    }
}

/// DDL failure while resetting or inspecting the working table.
#[derive(Debug)]
pub struct SchemaError {
    pub step: SchemaStep,
    pub source: rusqlite::Error,
}

impl Display for SchemaError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "schema step `{}` failed on table {TABLE_NAME}: {}",
            self.step.as_str(),
            self.source
        )
    }
}

impl Error for SchemaError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.source)
    }
}

/// Drops the working table if present and recreates it empty.
///
/// # Side effects
/// - Destroys every existing record.
/// - Each statement auto-commits.
pub fn reset_table(conn: &Connection) -> SchemaResult<()> {
    for (step, sql) in [
        (SchemaStep::DropTable, DROP_TABLE_SQL),
        (SchemaStep::CreateTable, CREATE_TABLE_SQL),
    ] {
        if let Err(source) = conn.execute_batch(sql) {
            error!(
                "event=schema_reset module=db status=error step={} error={}",
                step.as_str(),
                source
            );
            return Err(SchemaError { step, source });
        }
    }

    info!("event=schema_reset module=db status=ok table={TABLE_NAME}");
    Ok(())
}

/// Returns whether the working table currently exists.
pub fn table_exists(conn: &Connection) -> SchemaResult<bool> {
    conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [TABLE_NAME],
        |row| row.get::<_, i64>(0),
    )
    .map(|exists| exists == 1)
    .map_err(|source| SchemaError {
        step: SchemaStep::Inspect,
        source,
    })
}
