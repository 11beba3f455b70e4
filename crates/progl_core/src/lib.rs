//! Data-access harness over a single SQLite table.
//!
//! Provisions the `PROGL` table, walks through insert/read/update/delete on
//! a fixed catalog of programming languages, then times single-statement
//! bulk inserts and a full delete.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::schema::{reset_table, SchemaError, SchemaResult};
pub use db::{
    open_db, open_db_in_memory, ConnectionConfig, Database, DbError, DbLocation, DbResult,
};
pub use logging::{default_log_level, init_logging, logging_status, parse_log_level, LogSettings};
pub use model::record::{Record, RecordId, RecordValidationError};
pub use model::seed::seed_records;
pub use repo::record_repo::{RecordRepository, RepoError, RepoResult, SqliteRecordRepository};
pub use service::bench_service::{
    benchmark_record, BenchConfig, BenchReport, BenchService, CycleKind, CycleReport,
};
pub use service::harness_service::{
    run_harness, HarnessConfig, HarnessError, HarnessReport, HarnessResult, HarnessState,
    ReadSnapshot,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
