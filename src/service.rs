//! Logging lifecycle orchestration.
//!
//! [`LoggingService`] sequences startup: resolve the log root, ensure it
//! exists, fold stale daily files into monthly archives, then bring up the
//! active sink. Only a missing, uncreatable log root is fatal; archival
//! failures are reported per file and never block startup.
//!
//! The service takes `&mut self`, so exclusive access already makes the
//! state transitions race-free; wrap it in a `Mutex` to share across
//! threads, and the first caller through will perform the sequence while
//! the rest observe the initialized state.

use anyhow::{Context, Result};
use chrono::Local;
use std::path::{Path, PathBuf};

use crate::archive;
use crate::config::LogConfig;
use crate::paths;
use crate::scanner;
use crate::sink::{self, SinkHandle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Uninitialized,
    Initializing,
    Initialized,
    Disposed,
}

/// Owns the log directory lifecycle for the process.
pub struct LoggingService {
    config: LogConfig,
    state: State,
    log_directory: Option<PathBuf>,
    sink: Option<SinkHandle>,
}

impl LoggingService {
    pub fn new(config: LogConfig) -> Self {
        Self {
            config,
            state: State::Uninitialized,
            log_directory: None,
            sink: None,
        }
    }

    /// The resolved log directory.
    ///
    /// # Panics
    ///
    /// Panics if the service has not been initialized; reading the
    /// directory before `initialize()` succeeds is a programming error.
    pub fn log_directory(&self) -> &Path {
        self.log_directory
            .as_deref()
            .expect("LoggingService not initialized. Call initialize() first.")
    }

    /// Run the startup sequence.
    ///
    /// Idempotent: calling again after a successful initialization (or
    /// after disposal) is a no-op. Failure to create the log root is
    /// returned to the caller and leaves the service uninitialized, so a
    /// later retry is possible.
    pub fn initialize(&mut self) -> Result<()> {
        match self.state {
            State::Uninitialized => {}
            State::Initializing | State::Initialized | State::Disposed => return Ok(()),
        }
        self.state = State::Initializing;

        let root = paths::resolve_log_root(&self.config);

        if let Err(err) = paths::ensure_dir(&root) {
            // Without a root nothing can be logged, including errors about
            // logging; the caller has to know synchronously.
            self.state = State::Uninitialized;
            return Err(err).context("Failed to prepare log directory");
        }

        // Fold yesterday's (and older) files into monthly archives before
        // the active sink starts writing. Best-effort: failures are
        // per-file and reported on stderr.
        let today = Local::now().date_naive();
        let stale = scanner::stale_files_at(&root, &self.config, today);
        let summary = archive::archive_stale_files(&root, &stale, &self.config.file_suffix);

        let sink = match sink::configure(&root, &self.config) {
            Ok(sink) => sink,
            Err(err) => {
                self.state = State::Uninitialized;
                return Err(err);
            }
        };

        tracing::info!(
            directory = %root.display(),
            archived = summary.archived,
            skipped = summary.skipped,
            "logging initialized"
        );

        self.log_directory = Some(root);
        self.sink = Some(sink);
        self.state = State::Initialized;

        Ok(())
    }

    /// Flush and close the active sink.
    ///
    /// Idempotent: only the first call does anything.
    pub fn dispose(&mut self) {
        if self.state == State::Disposed {
            return;
        }

        // Dropping the handle flushes buffered records and releases the
        // active file.
        self.sink.take();
        self.state = State::Disposed;
    }
}

impl Drop for LoggingService {
    fn drop(&mut self) {
        self.dispose();
    }
}
