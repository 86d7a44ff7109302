use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use peerverify_logging::LoggerConfig;
use peerverify_status::CommandStatusSource;

/// peerverify runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Mesh daemon status command line, program first
    pub status_command: String,
    /// Upper bound on a single status command run
    pub status_timeout_secs: u64,
    /// Fallback log filter, used when `RUST_LOG` is unset or invalid
    pub log_level: String,
    /// Emit console logs as JSON
    pub log_json: bool,
    /// Directory for rotated log files
    pub log_dir: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            status_command: "tailscale status --json".to_string(),
            status_timeout_secs: 10,
            log_level: "info".to_string(),
            log_json: false,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but reads variables through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            bind_address: lookup("PEERVERIFY_BIND").unwrap_or(defaults.bind_address),
            port: lookup("PEERVERIFY_PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            status_command: lookup("PEERVERIFY_STATUS_COMMAND")
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.status_command),
            status_timeout_secs: lookup("PEERVERIFY_STATUS_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .filter(|s| *s > 0)
                .unwrap_or(defaults.status_timeout_secs),
            log_level: lookup("PEERVERIFY_LOG_LEVEL")
                .filter(|l| !l.trim().is_empty())
                .unwrap_or(defaults.log_level),
            log_json: lookup("PEERVERIFY_LOG_JSON")
                .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
                .unwrap_or(defaults.log_json),
            log_dir: lookup("PEERVERIFY_LOG_DIR").filter(|d| !d.is_empty()),
        }
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.bind_address, self.port);
        addr.parse()
            .with_context(|| format!("invalid listen address {addr}"))
    }

    pub fn status_source(&self) -> Result<CommandStatusSource> {
        let Some(source) = CommandStatusSource::from_command_line(&self.status_command) else {
            bail!("status command is empty");
        };
        Ok(source.with_timeout(Duration::from_secs(self.status_timeout_secs)))
    }

    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            level: self.log_level.clone(),
            json: self.log_json,
            log_dir: self.log_dir.as_ref().map(PathBuf::from),
        }
    }
}
