//! Status Fetcher
//!
//! Runs the mesh daemon's status command once per call and parses its JSON
//! output. No process reuse, no caching, no retries.

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use peerverify_core::{StatusDocument, StatusError};

pub const DEFAULT_STATUS_TIMEOUT: Duration = Duration::from_secs(10);

/// Anything that can report the daemon's current status.
#[async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self) -> Result<StatusDocument, StatusError>;
}

/// Fetches status by spawning an external command, `tailscale status --json`
/// by default.
#[derive(Debug, Clone)]
pub struct CommandStatusSource {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl Default for CommandStatusSource {
    fn default() -> Self {
        Self {
            program: "tailscale".to_string(),
            args: vec!["status".to_string(), "--json".to_string()],
            timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }
}

impl CommandStatusSource {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            timeout: DEFAULT_STATUS_TIMEOUT,
        }
    }

    /// Build from a whitespace-separated command line such as
    /// `"tailscale --socket /run/ts.sock status --json"`. Returns `None` for a
    /// blank line.
    pub fn from_command_line(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let program = parts.next()?;
        Some(Self::new(program, parts))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn io_error(&self, stage: &'static str, source: std::io::Error) -> StatusError {
        warn!(program = %self.program, stage, error = %source, "Status command could not be run");
        StatusError::Io { program: self.program.clone(), source }
    }
}

#[async_trait]
impl StatusSource for CommandStatusSource {
    async fn fetch_status(&self) -> Result<StatusDocument, StatusError> {
        debug!(program = %self.program, args = ?self.args, "Querying mesh daemon status");

        // kill_on_drop reaps the child when the timeout fires or the caller
        // goes away mid-request.
        let child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| self.io_error("spawn", e))?;

        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|e| self.io_error("wait", e))?,
            Err(_) => {
                warn!(program = %self.program, timeout = ?self.timeout, "Status command timed out");
                return Err(StatusError::Timeout(self.timeout));
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            warn!(
                program = %self.program,
                code = ?output.status.code(),
                stderr = %stderr,
                "Status command failed"
            );
            return Err(StatusError::ExternalProcess { code: output.status.code(), stderr });
        }

        StatusDocument::from_slice(&output.stdout).map_err(|e| {
            warn!(program = %self.program, error = %e, "Status output is not valid JSON");
            StatusError::MalformedStatus(e)
        })
    }
}
