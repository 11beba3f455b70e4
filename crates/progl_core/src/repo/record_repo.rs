//! Record repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/select/update/delete APIs over the `PROGL` table.
//! - Keep SQL details and row decoding inside the persistence boundary.
//!
//! # Invariants
//! - Write paths call `Record::validate()` before issuing SQL.
//! - Every value reaches SQLite as a bound parameter.
//! - Reads use engine-default order; callers must not rely on row position.
//! - Every statement auto-commits; nothing is retried.

use crate::db::schema::{table_exists, SchemaError, TABLE_NAME};
use crate::model::record::{Record, RecordId, RecordValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Ids bound per `UPDATE ... IN (...)`; SQLite caps host parameters at 32766
/// and `?1` carries the new conceptor.
const MAX_UPDATE_IDS_PER_STATEMENT: usize = 32_000;

const RECORD_SELECT_SQL: &str = "SELECT
    id,
    conceptor,
    language,
    creationDate
FROM PROGL";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for record persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Record rejected before reaching storage.
    Validation(RecordValidationError),
    /// Storage rejected a write on a key, `NOT NULL` or `CHECK` constraint.
    ConstraintViolation {
        operation: &'static str,
        source: rusqlite::Error,
    },
    /// Any other write failure.
    Write {
        operation: &'static str,
        source: rusqlite::Error,
    },
    /// Read failure.
    Query(rusqlite::Error),
    /// The working table is missing or cannot be inspected.
    Schema(SchemaError),
    MissingTable(&'static str),
    /// Persisted row cannot be decoded into a `Record`.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::ConstraintViolation { operation, source } => {
                write!(f, "constraint violation during {operation}: {source}")
            }
            Self::Write { operation, source } => write!(f, "{operation} failed: {source}"),
            Self::Query(err) => write!(f, "query failed: {err}"),
            Self::Schema(err) => write!(f, "{err}"),
            Self::MissingTable(table) => write!(f, "record repository requires table `{table}`"),
            Self::InvalidData(message) => write!(f, "invalid persisted record data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::ConstraintViolation { source, .. } => Some(source),
            Self::Write { source, .. } => Some(source),
            Self::Query(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::MissingTable(_) => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<RecordValidationError> for RepoError {
    fn from(value: RecordValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<SchemaError> for RepoError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

/// Read-path conversion; write paths classify errors with `write_error`.
impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Query(value)
    }
}

impl RepoError {
    /// Returns whether this error reports a violated storage constraint,
    /// either detected by validation or by the engine.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            Self::ConstraintViolation { .. } | Self::Validation(_)
        )
    }
}

/// Repository interface for `PROGL` record operations.
pub trait RecordRepository {
    /// Appends one record; a duplicate id is a constraint violation.
    fn insert(&self, record: &Record) -> RepoResult<()>;
    /// Returns every current record, fully materialized.
    fn select_all(&self) -> RepoResult<Vec<Record>>;
    /// Streams every current record to `visit`; returns the number visited.
    fn for_each_record(&self, visit: &mut dyn FnMut(Record)) -> RepoResult<usize>;
    /// Sets `conceptor` on every record whose id is in `ids`; returns rows changed.
    fn update_many(&self, ids: &[RecordId], conceptor: Option<&str>) -> RepoResult<usize>;
    /// Removes the record with `id`; returns rows removed.
    fn delete_by_id(&self, id: RecordId) -> RepoResult<usize>;
    /// Removes every record; returns rows removed.
    fn delete_all(&self) -> RepoResult<usize>;
    fn count(&self) -> RepoResult<u64>;
}

impl<T: RecordRepository + ?Sized> RecordRepository for &T {
    fn insert(&self, record: &Record) -> RepoResult<()> {
        (**self).insert(record)
    }

    fn select_all(&self) -> RepoResult<Vec<Record>> {
        (**self).select_all()
    }

    fn for_each_record(&self, visit: &mut dyn FnMut(Record)) -> RepoResult<usize> {
        (**self).for_each_record(visit)
    }

    fn update_many(&self, ids: &[RecordId], conceptor: Option<&str>) -> RepoResult<usize> {
        (**self).update_many(ids, conceptor)
    }

    fn delete_by_id(&self, id: RecordId) -> RepoResult<usize> {
        (**self).delete_by_id(id)
    }

    fn delete_all(&self) -> RepoResult<usize> {
        (**self).delete_all()
    }

    fn count(&self) -> RepoResult<u64> {
        (**self).count()
    }
}

/// SQLite-backed record repository.
pub struct SqliteRecordRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteRecordRepository<'conn> {
    /// Constructs a repository over a connection whose working table exists.
    ///
    /// # Errors
    /// - `RepoError::MissingTable` when `reset_table` has not run yet.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        if !table_exists(conn)? {
            return Err(RepoError::MissingTable(TABLE_NAME));
        }
        Ok(Self { conn })
    }
}

impl RecordRepository for SqliteRecordRepository<'_> {
    fn insert(&self, record: &Record) -> RepoResult<()> {
        record.validate()?;

        self.conn
            .execute(
                "INSERT INTO PROGL (id, conceptor, language, creationDate)
                 VALUES (?1, ?2, ?3, ?4);",
                params![
                    record.id,
                    record.conceptor.as_deref(),
                    record.language.as_deref(),
                    record.creation_date.as_deref(),
                ],
            )
            .map_err(|err| write_error("insert", err))?;

        Ok(())
    }

    fn select_all(&self) -> RepoResult<Vec<Record>> {
        let mut records = Vec::new();
        self.for_each_record(&mut |record| records.push(record))?;
        Ok(records)
    }

    fn for_each_record(&self, visit: &mut dyn FnMut(Record)) -> RepoResult<usize> {
        let mut stmt = self.conn.prepare(&format!("{RECORD_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut visited = 0;

        while let Some(row) = rows.next()? {
            visit(parse_record_row(row)?);
            visited += 1;
        }

        Ok(visited)
    }

    fn update_many(&self, ids: &[RecordId], conceptor: Option<&str>) -> RepoResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        if let Some(value) = conceptor {
            // Model limits apply to the new value; the error names the first
            // targeted id.
            let candidate = Record {
                conceptor: Some(value.to_string()),
                ..Record::bare(ids[0])
            };
            candidate.validate()?;
        }

        let conceptor_value = match conceptor {
            Some(value) => Value::Text(value.to_string()),
            None => Value::Null,
        };

        // A repeated id split across two chunks would be counted twice.
        let mut unique_ids = ids.to_vec();
        unique_ids.sort_unstable();
        unique_ids.dedup();

        let mut changed = 0;
        for chunk in unique_ids.chunks(MAX_UPDATE_IDS_PER_STATEMENT) {
            let placeholders = (0..chunk.len())
                .map(|index| format!("?{}", index + 2))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!("UPDATE PROGL SET conceptor = ?1 WHERE id IN ({placeholders});");

            let mut bind_values: Vec<Value> = Vec::with_capacity(chunk.len() + 1);
            bind_values.push(conceptor_value.clone());
            bind_values.extend(chunk.iter().map(|id| Value::Integer(*id)));

            changed += self
                .conn
                .execute(&sql, params_from_iter(bind_values))
                .map_err(|err| write_error("update", err))?;
        }

        Ok(changed)
    }

    fn delete_by_id(&self, id: RecordId) -> RepoResult<usize> {
        self.conn
            .execute("DELETE FROM PROGL WHERE id = ?1;", [id])
            .map_err(|err| write_error("delete", err))
    }

    fn delete_all(&self) -> RepoResult<usize> {
        self.conn
            .execute("DELETE FROM PROGL;", [])
            .map_err(|err| write_error("delete_all", err))
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM PROGL;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn write_error(operation: &'static str, source: rusqlite::Error) -> RepoError {
    if source.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
        RepoError::ConstraintViolation { operation, source }
    } else {
        RepoError::Write { operation, source }
    }
}

fn parse_record_row(row: &Row<'_>) -> RepoResult<Record> {
    let id: RecordId = row.get("id")?;
    let creation_date = read_date_text(row, id)?;

    Ok(Record {
        id,
        conceptor: row.get("conceptor")?,
        language: row.get("language")?,
        creation_date,
    })
}

/// `DATE` has numeric affinity in SQLite; render whatever was stored as text.
fn read_date_text(row: &Row<'_>, id: RecordId) -> RepoResult<Option<String>> {
    match row.get::<_, Value>("creationDate")? {
        Value::Null => Ok(None),
        Value::Text(text) => Ok(Some(text)),
        Value::Integer(number) => Ok(Some(number.to_string())),
        Value::Real(number) => Ok(Some(number.to_string())),
        Value::Blob(_) => Err(RepoError::InvalidData(format!(
            "blob value in {TABLE_NAME}.creationDate for id {id}"
        ))),
    }
}
