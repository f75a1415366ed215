//! Process-wide logging setup.
//!
//! [`init`] installs a `tracing` subscriber with a console layer and a file
//! layer exactly once. Components do not look loggers up by name; they are
//! handed a span from [`component`] at construction and emit inside it.

use crate::artifacts;
use crate::config::SuiteConfig;
use crate::error::ConfigResult;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Span;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static HANDLE: Mutex<Option<LogHandle>> = Mutex::new(None);

/// Handle to the installed logging setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogHandle {
    log_file: PathBuf,
}

impl LogHandle {
    /// Path of the `test_run_<timestamp>.log` file for this process.
    #[must_use]
    pub fn log_file(&self) -> &Path {
        &self.log_file
    }
}

/// Install the console and file layers.
///
/// The first call creates `<reports>/logs/`, opens the run's log file and
/// installs the subscriber. Later calls return the same handle and attach
/// nothing new.
pub fn init(config: &SuiteConfig) -> ConfigResult<LogHandle> {
    let mut guard = HANDLE
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner);
    if let Some(handle) = guard.as_ref() {
        return Ok(handle.clone());
    }

    let log_dir = config.logs_dir();
    fs::create_dir_all(&log_dir)?;
    let log_file = log_dir.join(format!("test_run_{}.log", artifacts::timestamp()));
    let file = File::create(&log_file)?;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let console = fmt::layer()
        .with_timer(ChronoLocal::new("%H:%M:%S".to_string()))
        .with_target(true);

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_file(true)
        .with_line_number(true)
        .with_target(true);

    // Another global subscriber wins; this run's log file then stays empty.
    if let Err(e) = tracing_subscriber::registry()
        .with(console)
        .with(file_layer)
        .with(filter)
        .try_init()
    {
        tracing::warn!(
            "Logging subscriber already installed, {} will not receive records: {}",
            log_file.display(),
            e
        );
    }

    let handle = LogHandle { log_file };
    tracing::info!("Logging to {}", handle.log_file.display());
    *guard = Some(handle.clone());
    Ok(handle)
}

/// Span that tags every event a component emits with its name.
#[must_use]
pub fn component(name: &str) -> Span {
    tracing::info_span!("component", name)
}
