//! This crate provides logging initialization for the dock-docs application.
//!
//! It supports two modes:
//! - CLI mode: human-readable lines on STDERR.
//! - JSON mode: one JSON object per line on STDERR, for CI log collectors.
//!
//! STDOUT is never used for logs, since rendered documentation may be printed
//! there.

use anyhow::Result;
use tracing_appender::non_blocking::{NonBlockingBuilder, WorkerGuard};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogMode {
    Cli,
    Json,
}

/// Guard that keeps background logging workers alive.
pub struct LoggingGuards {
    _guards: Vec<WorkerGuard>,
}

fn filter(verbose: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    }
}

pub fn init(mode: LogMode, verbose: bool) -> Result<Option<LoggingGuards>> {
    let filter = filter(verbose);

    match mode {
        LogMode::Cli => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .with_writer(std::io::stderr)
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;
            Ok(None)
        }
        LogMode::Json => {
            // Callers may not consume stderr. Limit the number of buffered lines
            // and drop the lines that go over the limit with lossy=true
            let (stderr_non_blocking, stderr_guard) = NonBlockingBuilder::default()
                .lossy(true)
                .buffered_lines_limit(10_000)
                .finish(std::io::stderr());

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(stderr_non_blocking)
                .with_ansi(false)
                .json()
                .try_init()
                .map_err(|e| anyhow::anyhow!("failed to initialize logging: {e}"))?;

            Ok(Some(LoggingGuards {
                _guards: vec![stderr_guard],
            }))
        }
    }
}
