//! Log directory lifecycle management.
//!
//! Owns the lifecycle of an application's log directory: resolves where logs
//! live for the current deployment mode, folds stale daily log files into
//! compressed monthly archives at startup, then configures a daily-rolling
//! structured-logging sink over that directory.
//!
//! Typical use at process startup:
//!
//! ```no_run
//! use logkeeper::{LogConfig, LoggingService};
//!
//! let mut logging = LoggingService::new(LogConfig::default());
//! logging.initialize()?;
//! tracing::info!("application starting");
//! // ... on shutdown:
//! logging.dispose();
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod archive;
pub mod config;
pub mod paths;
pub mod scanner;
pub mod service;
pub mod sink;

pub use config::LogConfig;
pub use paths::DeployMode;
pub use service::LoggingService;
pub use sink::SinkHandle;
