//! End-to-end harness run: schema reset, CRUD walkthrough, benchmark.
//!
//! # Responsibility
//! - Sequence connection, schema, record and benchmark operations.
//! - Release the connection on every exit path.
//!
//! # Invariants
//! - Setup runs `Init -> Connected -> SchemaReady -> Seeded`.
//! - The CRUD walkthrough then alternates: each `Updating` or `Deleting`
//!   step is followed by a return to `Reading` for its snapshot.
//! - `Benchmarked` follows the last read; no CRUD state is entered after it.
//! - `Closed` is reached from any state once the connection was opened.
//! - A close failure never replaces an earlier stage failure.

use crate::db::schema::{reset_table, SchemaError};
use crate::db::{open_db, ConnectionConfig, Database, DbError, DbResult};
use crate::model::record::{Record, RecordId};
use crate::model::seed::{seed_records, DELPHI_ID};
use crate::repo::record_repo::{RecordRepository, RepoError, SqliteRecordRepository};
use crate::service::bench_service::{BenchConfig, BenchReport, BenchService};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Ids targeted by the demo update; 100 does not exist.
pub const UPDATE_IDS: [RecordId; 2] = [1, 100];
/// Conceptor written by the demo update.
pub const UPDATED_CONCEPTOR: &str = "Adin D. Falkoff";

pub type HarnessResult<T> = Result<T, HarnessError>;

/// Everything a harness run needs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HarnessConfig {
    pub db: ConnectionConfig,
    pub bench: BenchConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessState {
    Init,
    Connected,
    SchemaReady,
    Seeded,
    Reading,
    Updating,
    Deleting,
    Benchmarked,
    Closed,
}

impl HarnessState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Connected => "connected",
            Self::SchemaReady => "schema_ready",
            Self::Seeded => "seeded",
            Self::Reading => "reading",
            Self::Updating => "updating",
            Self::Deleting => "deleting",
            Self::Benchmarked => "benchmarked",
            Self::Closed => "closed",
        }
    }
}

/// Records observed by one read step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadSnapshot {
    /// `after_seed`, `after_update` or `after_delete`.
    pub stage: &'static str,
    pub records: Vec<Record>,
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessReport {
    pub snapshots: Vec<ReadSnapshot>,
    pub bench: BenchReport,
    pub final_state: HarnessState,
}

/// Failure of a harness run, tagged by the stage that raised it.
#[derive(Debug)]
pub enum HarnessError {
    /// Opening or releasing the store failed.
    Connection(DbError),
    /// Resetting the working table failed.
    Schema(SchemaError),
    /// A record or benchmark operation failed.
    Data {
        stage: &'static str,
        source: RepoError,
    },
}

impl Display for HarnessError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection(err) => write!(f, "connection error: {err}"),
            Self::Schema(err) => write!(f, "schema error: {err}"),
            Self::Data { stage, source } => write!(f, "{stage} failed: {source}"),
        }
    }
}

impl Error for HarnessError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection(err) => Some(err),
            Self::Schema(err) => Some(err),
            Self::Data { source, .. } => Some(source),
        }
    }
}

impl From<DbError> for HarnessError {
    fn from(value: DbError) -> Self {
        Self::Connection(value)
    }
}

impl From<SchemaError> for HarnessError {
    fn from(value: SchemaError) -> Self {
        Self::Schema(value)
    }
}

struct StateTracker {
    current: HarnessState,
}

impl StateTracker {
    fn new() -> Self {
        Self {
            current: HarnessState::Init,
        }
    }

    fn advance(&mut self, next: HarnessState) {
        debug!(
            "event=harness_state module=harness from={} to={}",
            self.current.as_str(),
            next.as_str()
        );
        self.current = next;
    }
}

/// Runs the full harness against the configured store.
///
/// # Side effects
/// - Drops and recreates the `PROGL` table, destroying existing rows.
/// - Leaves the table empty after the final timed delete.
///
/// # Errors
/// - `HarnessError::Connection` when the store cannot be opened, or cannot
///   be released after an otherwise successful run.
/// - `HarnessError::Schema` / `HarnessError::Data` for the first failing
///   stage; nothing is retried.
pub fn run_harness(config: &HarnessConfig) -> HarnessResult<HarnessReport> {
    let started_at = Instant::now();
    let mut tracker = StateTracker::new();
    info!("event=harness_run module=harness status=start");

    let mut db = match open_db(&config.db) {
        Ok(db) => db,
        Err(err) => {
            error!("event=harness_run module=harness status=error state=init error={err}");
            return Err(HarnessError::Connection(err));
        }
    };
    tracker.advance(HarnessState::Connected);

    let outcome = run_stages(&db, config, &mut tracker);
    let failed_state = tracker.current;
    let closed = db.close();
    tracker.advance(HarnessState::Closed);

    let result = settle(outcome, closed).map(|(snapshots, bench)| HarnessReport {
        snapshots,
        bench,
        final_state: tracker.current,
    });

    match &result {
        Ok(_) => info!(
            "event=harness_run module=harness status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=harness_run module=harness status=error state={} duration_ms={} error={}",
            failed_state.as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn run_stages(
    db: &Database,
    config: &HarnessConfig,
    tracker: &mut StateTracker,
) -> HarnessResult<(Vec<ReadSnapshot>, BenchReport)> {
    let conn = db.conn()?;

    reset_table(conn)?;
    tracker.advance(HarnessState::SchemaReady);

    let repo = SqliteRecordRepository::try_new(conn).map_err(data_error("open_repository"))?;

    for record in seed_records() {
        repo.insert(&record).map_err(data_error("seed"))?;
    }
    tracker.advance(HarnessState::Seeded);

    let mut snapshots = Vec::with_capacity(3);

    tracker.advance(HarnessState::Reading);
    snapshots.push(read_snapshot(&repo, "after_seed")?);

    tracker.advance(HarnessState::Updating);
    let updated = repo
        .update_many(&UPDATE_IDS, Some(UPDATED_CONCEPTOR))
        .map_err(data_error("update"))?;
    info!("event=harness_update module=harness status=ok rows={updated}");
    tracker.advance(HarnessState::Reading);
    snapshots.push(read_snapshot(&repo, "after_update")?);

    tracker.advance(HarnessState::Deleting);
    let deleted = repo
        .delete_by_id(DELPHI_ID)
        .map_err(data_error("delete"))?;
    info!("event=harness_delete module=harness status=ok rows={deleted}");
    tracker.advance(HarnessState::Reading);
    snapshots.push(read_snapshot(&repo, "after_delete")?);

    let bench = BenchService::new(&repo)
        .run(&config.bench)
        .map_err(data_error("benchmark"))?;
    tracker.advance(HarnessState::Benchmarked);

    Ok((snapshots, bench))
}

fn read_snapshot(
    repo: &SqliteRecordRepository<'_>,
    stage: &'static str,
) -> HarnessResult<ReadSnapshot> {
    let records = repo.select_all().map_err(data_error("read"))?;
    info!(
        "event=harness_read module=harness status=ok stage={} records={}",
        stage,
        records.len()
    );
    Ok(ReadSnapshot { stage, records })
}

fn data_error(stage: &'static str) -> impl Fn(RepoError) -> HarnessError {
    move |source| HarnessError::Data { stage, source }
}

/// Combines the stage outcome with the release outcome.
fn settle<T>(outcome: HarnessResult<T>, closed: DbResult<()>) -> HarnessResult<T> {
    match (outcome, closed) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(close_err)) => Err(HarnessError::Connection(close_err)),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            warn!(
                "event=db_close module=harness status=error masked_by_primary=true error={close_err}"
            );
            Err(err)
        }
    }
}
