use crate::errors::RunnerError;
use crate::types::ImageStats;
use async_trait::async_trait;

/// Which time budget a tool gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerClass {
    /// Fast metadata calls (runtime inspect, manifest inspect).
    Inspect,
    /// Slow scans that read the whole image (SBOM, vulnerabilities, layers).
    Scan,
}

/// A wrapper around one external inspection tool.
///
/// Adapters own their JSON schema assumptions: output that does not match
/// must come back as an error, never as a half-filled [`ImageStats`].
#[async_trait]
pub trait ToolRunner: Send + Sync {
    fn name(&self) -> String;

    /// Checks that the binary is installed without invoking it.
    fn is_available(&self) -> bool;

    fn class(&self) -> RunnerClass;

    /// Runs the tool against `image` and returns its partial contribution.
    ///
    /// The caller enforces the time budget by dropping the future, which
    /// also kills the subprocess.
    async fn run(&self, image: &str) -> Result<ImageStats, RunnerError>;
}
