//! Structured Logger
//!
//! Wraps `tracing` with console output (plain or JSON), optional daily-rotated
//! NDJSON files, and environment-based level control.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// How the process-wide subscriber is assembled at startup.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Default filter directive, used when `RUST_LOG` is unset or invalid.
    pub level: String,
    /// Emit console records as JSON instead of human-readable lines.
    pub json: bool,
    /// Directory for `peerverify.log.YYYY-MM-DD` files. `None` logs to console only.
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            log_dir: None,
        }
    }
}

/// Install the global subscriber. A second call is a no-op.
pub fn init_logger(config: &LoggerConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let json_console = config
        .json
        .then(|| fmt::layer().json().with_writer(std::io::stdout));
    let plain_console = (!config.json).then(|| {
        fmt::layer()
            .with_writer(std::io::stdout)
            .with_target(false)
            .with_ansi(true)
    });

    let file_layer = config.log_dir.as_ref().map(|dir| {
        let file_appender = RollingFileAppender::new(Rotation::DAILY, dir, "peerverify.log");
        fmt::layer()
            .json()
            .with_writer(file_appender)
            .with_ansi(false)
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_console)
        .with(plain_console)
        .with(file_layer)
        .try_init();
}
