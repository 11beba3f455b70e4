//! Process logging bootstrap for harness runs.
//!
//! # Invariants
//! - One logger per process; repeating the same `LogSettings` is a no-op.
//! - A second init with different settings is rejected, never applied.
//! - The log directory is absolute and created on demand.

use flexi_logger::{
    Cleanup, Criterion, Duplicate, FileSpec, LogSpecification, Logger, LoggerHandle, Naming,
    WriteMode,
};
use log::{info, LevelFilter};
use once_cell::sync::OnceCell;
use std::path::PathBuf;

const LOG_FILE_BASENAME: &str = "progl";
const ROTATE_AT_BYTES: u64 = 10 * 1024 * 1024;
const KEEP_LOG_FILES: usize = 5;

static ACTIVE_LOGGER: OnceCell<(LogSettings, LoggerHandle)> = OnceCell::new();

/// Where and how much the harness logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    /// Absolute directory holding the rolling `progl_*.log` files.
    pub log_dir: PathBuf,
    /// Mirror `info` and above to stderr.
    pub echo_stderr: bool,
}

impl LogSettings {
    /// Settings with the build-mode default level and no stderr echo.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            level: default_log_level(),
            log_dir: log_dir.into(),
            echo_stderr: false,
        }
    }
}

/// `Debug` in debug builds, `Info` in release builds.
pub fn default_log_level() -> LevelFilter {
    if cfg!(debug_assertions) {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    }
}

/// Parses a textual level such as `info` or ` WARN `.
pub fn parse_log_level(value: &str) -> Result<LevelFilter, String> {
    value
        .trim()
        .parse::<LevelFilter>()
        .map_err(|_| format!("unsupported log level `{}`", value.trim()))
}

/// Starts the process logger.
///
/// # Errors
/// - `log_dir` is relative or cannot be created.
/// - A logger is already running with different settings.
/// - The flexi_logger backend fails to start.
pub fn init_logging(settings: &LogSettings) -> Result<(), String> {
    if !settings.log_dir.is_absolute() {
        return Err(format!(
            "log directory must be absolute, got `{}`",
            settings.log_dir.display()
        ));
    }

    let (active, _) = ACTIVE_LOGGER.get_or_try_init(|| start_logger(settings))?;
    if active != settings {
        return Err(format!(
            "logger already running with {active:?}; refusing {settings:?}"
        ));
    }
    Ok(())
}

/// Settings of the running logger, if any.
pub fn logging_status() -> Option<LogSettings> {
    ACTIVE_LOGGER.get().map(|(settings, _)| settings.clone())
}

fn start_logger(settings: &LogSettings) -> Result<(LogSettings, LoggerHandle), String> {
    std::fs::create_dir_all(&settings.log_dir).map_err(|err| {
        format!(
            "cannot create log directory `{}`: {err}",
            settings.log_dir.display()
        )
    })?;

    let echo = if settings.echo_stderr {
        Duplicate::Info
    } else {
        Duplicate::None
    };

    let handle = Logger::with(LogSpecification::builder().default(settings.level).build())
        .log_to_file(
            FileSpec::default()
                .directory(settings.log_dir.as_path())
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(ROTATE_AT_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(KEEP_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .duplicate_to_stderr(echo)
        .format_for_files(flexi_logger::detailed_format)
        .format_for_stderr(flexi_logger::default_format)
        .start()
        .map_err(|err| format!("cannot start logger: {err}"))?;

    info!(
        "event=logging_init module=logging status=ok version={} level={} log_dir={} echo_stderr={}",
        env!("CARGO_PKG_VERSION"),
        settings.level,
        settings.log_dir.display(),
        settings.echo_stderr
    );
    Ok((settings.clone(), handle))
}
