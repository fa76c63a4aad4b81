//! Error types for the analysis crate

use std::time::Duration;
use thiserror::Error;

/// Result type alias for aggregation calls
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that abort the analysis of one image.
///
/// Tool failures never show up here; they are collected on the report.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("image tag is required")]
    EmptyImageTag,

    #[error("analysis of {image} cancelled before any tool was started")]
    Cancelled { image: String },
}

/// Errors raised by a single tool adapter.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("{tool} not found")]
    NotFound { tool: String },

    #[error("no container runtime found (docker or podman)")]
    NoContainerRuntime,

    #[error("failed to start `{command}`: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{command}` failed ({status})\nStderr: {stderr}")]
    CommandFailed {
        command: String,
        status: String,
        stderr: String,
    },

    #[error("failed to unmarshal {tool} output: {source}")]
    Parse {
        tool: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no inspect data returned for image {image}")]
    EmptyInspect { image: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("timed out after {after:?}")]
    Timeout { after: Duration },

    #[error("cancelled")]
    Cancelled,
}

impl RunnerError {
    pub(crate) fn parse(tool: &str, source: serde_json::Error) -> Self {
        RunnerError::Parse {
            tool: tool.to_string(),
            source,
        }
    }
}
