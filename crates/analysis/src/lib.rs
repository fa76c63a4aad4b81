//! Container image analysis.
//!
//! Several external inspectors (container runtime, manifest, syft, grype,
//! dive) are run concurrently against an image tag. Each one contributes a
//! partial [`ImageStats`]; the [`Analyzer`] merges the successful ones and
//! reports the failing ones as warnings.

pub mod aggregator;
pub mod config;
pub mod errors;
pub mod exec;
pub mod runner;
pub mod runners;
pub mod tools;
pub mod types;

pub use aggregator::{AnalysisReport, Analyzer, ToolFailure};
pub use config::AnalysisConfig;
pub use errors::{AnalysisError, Result, RunnerError};
pub use runner::{RunnerClass, ToolRunner};
pub use types::{ImageStats, PackageSummary, Severity, Vulnerability};
