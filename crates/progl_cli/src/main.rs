//! `progl` entry point.
//!
//! # Responsibility
//! - Run the harness once against `./db/progl.sqlite3` with default settings.
//! - Print read snapshots and benchmark timings; logs go to `./logs`.
//! - Exit non-zero with the full error chain on failure.

use log::warn;
use progl_core::{
    core_version, init_logging, parse_log_level, run_harness, CycleKind, HarnessConfig,
    HarnessReport, LogSettings, Record,
};
use std::error::Error;
use std::process::ExitCode;

/// Overrides the build-mode log level, e.g. `PROGL_LOG=trace`.
const LOG_LEVEL_ENV: &str = "PROGL_LOG";

fn main() -> ExitCode {
    if let Err(message) = start_logging() {
        eprintln!("logging disabled: {message}");
    }

    let config = HarnessConfig::default();
    println!(
        "---- progl {} working on SQLite at {}",
        core_version(),
        config.db.location
    );

    match run_harness(&config) {
        Ok(report) => {
            print_report(&report);
            println!("Enjoy learning!");
            ExitCode::SUCCESS
        }
        Err(err) => {
            warn!("event=cli_exit module=cli status=error");
            eprintln!("error: {err}");
            let mut source = err.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn start_logging() -> Result<(), String> {
    let cwd = std::env::current_dir()
        .map_err(|err| format!("cannot resolve working directory: {err}"))?;
    let mut settings = LogSettings {
        echo_stderr: true,
        ..LogSettings::new(cwd.join("logs"))
    };
    if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
        settings.level = parse_log_level(&level)?;
    }
    init_logging(&settings)
}

fn print_report(report: &HarnessReport) {
    for snapshot in &report.snapshots {
        println!("---- Records {}", snapshot.stage.replace('_', " "));
        for record in &snapshot.records {
            println!("{}", format_record(record));
        }
    }

    for cycle in &report.bench.cycles {
        let verb = match cycle.kind {
            CycleKind::Insert => "insert",
            CycleKind::Delete => "delete",
        };
        let rate = cycle
            .records_per_sec()
            .map(|rate| format!(" ({rate:.0} records/s)"))
            .unwrap_or_default();
        println!(
            "Time to {verb} {} records (ms): {}{rate}",
            cycle.records,
            cycle.elapsed_ms()
        );
    }
}

fn format_record(record: &Record) -> String {
    format!(
        "ID: {}, Conceptor: {}, Language: {}, Creation date: {}",
        record.id,
        record.conceptor.as_deref().unwrap_or("null"),
        record.language.as_deref().unwrap_or("null"),
        record.creation_date.as_deref().unwrap_or("null"),
    )
}
