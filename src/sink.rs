//! Active sink configuration.
//!
//! Brings up the daily-rolling file appender over the resolved log root and
//! installs a tracing subscriber writing to it. Each line carries a local
//! timestamp with UTC offset, the level, the message, and any structured
//! fields (errors are attached as an `error` field at the call site).
//!
//! The returned [`SinkHandle`] owns the non-blocking writer's worker;
//! dropping it flushes buffered records and releases the output file.

use anyhow::{Context, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LogConfig;

/// Timestamp layout: local time with an explicit UTC offset.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f %z";

/// Owned handle to the live sink.
///
/// Dropping the handle flushes buffered records and closes the active file;
/// the lifecycle orchestrator holds it until disposal.
pub struct SinkHandle {
    _guard: WorkerGuard,
}

/// Build the daily-rolling appender for `root`.
///
/// One active file per calendar day, named
/// `<prefix>.<YYYY-MM-DD>.<suffix>`. The appender itself keeps at most
/// `retention_count` rotated files; anything older is the archival sweep's
/// business on a later startup.
pub fn build_appender(root: &Path, config: &LogConfig) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(config.file_prefix.as_str())
        .filename_suffix(config.file_suffix.as_str())
        .max_log_files(config.retention_count)
        .build(root)
        .context("Failed to configure rolling file appender")
}

/// Configure the live sink under `root` and install it as the global
/// tracing subscriber.
///
/// Log level is controlled via the `LOGKEEPER_LOG` environment variable and
/// defaults to `debug`. If a global subscriber is already installed (a
/// repeated initialization, or a test harness), the existing one is kept;
/// the returned handle still owns this appender's worker.
pub fn configure(root: &Path, config: &LogConfig) -> Result<SinkHandle> {
    let appender = build_appender(root, config)?;
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let env_filter =
        EnvFilter::try_from_env("LOGKEEPER_LOG").unwrap_or_else(|_| EnvFilter::new("debug"));

    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_writer(writer);

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .try_init();

    Ok(SinkHandle { _guard: guard })
}
