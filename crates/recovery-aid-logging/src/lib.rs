//! # recovery-aid-logging
//!
//! Logging for recovery-aid intake sessions.
//!
//! ## Key Types
//!
//! - [`Logger`] - Structured event logging
//! - [`LogEvent`] - Log event types
//! - [`LogFormat`] - Output formats (Pretty, JSON, Compact)
//!
//! ## Log Formats
//!
//! - `Pretty` - Human-readable colored output
//! - `JSON` - Structured JSON lines
//! - `Compact` - Minimal text output

mod events;

use std::path::Path;

pub use events::{LogEvent, LogFormat, Logger};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing for the application.
///
/// With `log_dir`, diagnostics go to a daily-rolling file in that directory
/// instead of stderr; keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init_tracing(level: &str, format: LogFormat, log_dir: Option<&Path>) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (writer, guard) = diagnostics_writer(log_dir);

    match format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_target(false).with_writer(writer))
                .init();
        }
        LogFormat::Pretty | LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_target(false).with_writer(writer))
                .init();
        }
    }

    guard
}

/// Daily-rolling file writer under `log_dir`, or stderr. Lines written to
/// the file are only guaranteed on disk once the guard is dropped.
fn diagnostics_writer(log_dir: Option<&Path>) -> (BoxMakeWriter, Option<WorkerGuard>) {
    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "recovery-aid.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    }
}
