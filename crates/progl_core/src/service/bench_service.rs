//! Insert/delete latency benchmark over the record repository.
//!
//! # Responsibility
//! - Time single-statement bulk inserts at increasing scales.
//! - Time one full-table delete after the insert cycles.
//!
//! # Invariants
//! - Every cycle starts from an empty table.
//! - Only the insert loop is timed, never the preceding clear.
//! - Statements are issued one by one; a failed insert aborts the run.

use crate::model::record::{Record, RecordId};
use crate::repo::record_repo::{RecordRepository, RepoResult};
use log::info;
use std::time::{Duration, Instant};

/// Default insert scales, run in this order.
pub const DEFAULT_SCALES: [u32; 3] = [1_000, 10_000, 1_000_000];

const BENCH_CONCEPTOR: &str = "Joe Armstrong, Robert Virding, Mike Williams";
const BENCH_LANGUAGE: &str = "Erlang";
const BENCH_CREATION_DATE: &str = "1986-01-01";

/// Benchmark parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchConfig {
    /// Record counts for the insert cycles.
    pub scales: Vec<u32>,
}

impl Default for BenchConfig {
    fn default() -> Self {
        Self {
            scales: DEFAULT_SCALES.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleKind {
    Insert,
    Delete,
}

/// Timing of one benchmark cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleReport {
    pub kind: CycleKind,
    /// Records inserted, or removed for a delete cycle.
    pub records: u64,
    pub elapsed: Duration,
}

impl CycleReport {
    pub fn elapsed_ms(&self) -> u128 {
        self.elapsed.as_millis()
    }

    /// Throughput in records per second; `None` for a zero-length timing.
    pub fn records_per_sec(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 {
            return None;
        }
        Some(self.records as f64 / secs)
    }
}

/// Timings of a full benchmark run, in execution order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BenchReport {
    pub cycles: Vec<CycleReport>,
}

impl BenchReport {
    pub fn inserts(&self) -> impl Iterator<Item = &CycleReport> {
        self.cycles
            .iter()
            .filter(|cycle| cycle.kind == CycleKind::Insert)
    }

    pub fn delete(&self) -> Option<&CycleReport> {
        self.cycles
            .iter()
            .find(|cycle| cycle.kind == CycleKind::Delete)
    }
}

/// Synthetic benchmark record: fixed columns, id taken from the loop index.
pub fn benchmark_record(index: u32) -> Record {
    Record::new(
        RecordId::from(index),
        BENCH_CONCEPTOR,
        BENCH_LANGUAGE,
        BENCH_CREATION_DATE,
    )
}

/// Benchmark runner over any record repository.
pub struct BenchService<R: RecordRepository> {
    repo: R,
}

impl<R: RecordRepository> BenchService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Clears the table, then inserts `factory(i)` for `i in 0..n`.
    ///
    /// Returns the wall-clock time of the insert loop only.
    pub fn run_cycle<F>(&self, n: u32, mut factory: F) -> RepoResult<Duration>
    where
        F: FnMut(u32) -> Record,
    {
        self.repo.delete_all()?;

        let started_at = Instant::now();
        for index in 0..n {
            self.repo.insert(&factory(index))?;
        }
        Ok(started_at.elapsed())
    }

    /// Removes every record and times the single delete statement.
    pub fn timed_delete_all(&self) -> RepoResult<CycleReport> {
        let started_at = Instant::now();
        let removed = self.repo.delete_all()?;
        let elapsed = started_at.elapsed();

        Ok(CycleReport {
            kind: CycleKind::Delete,
            records: removed as u64,
            elapsed,
        })
    }

    /// Runs one insert cycle per configured scale, then a timed full delete.
    ///
    /// # Errors
    /// - The first repository failure aborts the run and is returned as is.
    pub fn run(&self, config: &BenchConfig) -> RepoResult<BenchReport> {
        let mut report = BenchReport::default();

        for &scale in &config.scales {
            info!("event=bench_insert module=bench status=start records={scale}");
            let elapsed = self.run_cycle(scale, benchmark_record)?;
            info!(
                "event=bench_insert module=bench status=ok records={} duration_ms={}",
                scale,
                elapsed.as_millis()
            );
            report.cycles.push(CycleReport {
                kind: CycleKind::Insert,
                records: u64::from(scale),
                elapsed,
            });
        }

        info!("event=bench_delete module=bench status=start");
        let delete = self.timed_delete_all()?;
        info!(
            "event=bench_delete module=bench status=ok records={} duration_ms={}",
            delete.records,
            delete.elapsed_ms()
        );
        report.cycles.push(delete);

        Ok(report)
    }
}
