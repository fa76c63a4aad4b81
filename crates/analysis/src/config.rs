use crate::runner::RunnerClass;
use std::time::Duration;

pub const DEFAULT_INSPECT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_SCAN_TIMEOUT: Duration = Duration::from_secs(300);

/// Time budgets handed to the tool adapters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Budget for runtime and manifest inspect calls.
    pub inspect_timeout: Duration,
    /// Budget for SBOM, vulnerability and layer scans.
    pub scan_timeout: Duration,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            inspect_timeout: DEFAULT_INSPECT_TIMEOUT,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

impl AnalysisConfig {
    pub fn budget_for(&self, class: RunnerClass) -> Duration {
        match class {
            RunnerClass::Inspect => self.inspect_timeout,
            RunnerClass::Scan => self.scan_timeout,
        }
    }
}
