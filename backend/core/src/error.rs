use std::time::Duration;

use thiserror::Error;

/// Rejection of an inbound verify payload.
///
/// Callers never see the reason; it exists for debug logging and tests.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

/// Failure to obtain the mesh daemon's current status.
#[derive(Debug, Error)]
pub enum StatusError {
    #[error("failed to run status command `{program}`: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("status command exited with {}: {stderr}", exit_label(.code))]
    ExternalProcess { code: Option<i32>, stderr: String },

    #[error("status command timed out after {0:?}")]
    Timeout(Duration),

    #[error("status command produced malformed output: {0}")]
    MalformedStatus(#[from] serde_json::Error),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "a signal".to_string(),
    }
}
