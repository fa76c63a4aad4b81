//! Concurrent fan-out over the tool adapters and the merge of their results.

use crate::config::AnalysisConfig;
use crate::errors::{AnalysisError, Result, RunnerError};
use crate::runner::ToolRunner;
use crate::runners::default_runners;
use crate::tools::ToolLocator;
use crate::types::ImageStats;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// One adapter that ran and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFailure {
    pub tool: String,
    pub error: String,
}

/// Consolidated stats for one image plus what happened to each adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisReport {
    pub stats: ImageStats,
    pub failures: Vec<ToolFailure>,
    /// Adapters whose binary was not installed.
    pub skipped: Vec<String>,
    /// Adapters whose results were merged into `stats`.
    pub contributors: Vec<String>,
}

impl AnalysisReport {
    fn new(image: &str) -> Self {
        Self {
            stats: ImageStats::new(image),
            failures: Vec::new(),
            skipped: Vec::new(),
            contributors: Vec::new(),
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// True when no adapter contributed anything.
    pub fn is_empty(&self) -> bool {
        self.contributors.is_empty()
    }
}

type TaskOutcome = (String, std::result::Result<ImageStats, RunnerError>, Duration);

pub struct Analyzer {
    runners: Vec<Arc<dyn ToolRunner>>,
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(runners: Vec<Arc<dyn ToolRunner>>, config: AnalysisConfig) -> Self {
        Self { runners, config }
    }

    pub fn with_default_runners(locator: &ToolLocator, config: AnalysisConfig) -> Self {
        Self::new(default_runners(locator), config)
    }

    pub fn runners(&self) -> &[Arc<dyn ToolRunner>] {
        &self.runners
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Runs every available adapter against `image` and merges the results.
    ///
    /// Adapter failures and timeouts end up on the report; the call itself
    /// only fails for an empty tag or a token that is already cancelled.
    /// Cancelling `cancel` while adapters run stops all of them.
    pub async fn analyze_image(
        &self,
        image: &str,
        cancel: &CancellationToken,
    ) -> Result<AnalysisReport> {
        let image = image.trim();
        if image.is_empty() {
            return Err(AnalysisError::EmptyImageTag);
        }
        if cancel.is_cancelled() {
            return Err(AnalysisError::Cancelled {
                image: image.to_string(),
            });
        }

        let mut report = AnalysisReport::new(image);
        let mut tasks: JoinSet<TaskOutcome> = JoinSet::new();
        let mut names: HashMap<Id, String> = HashMap::new();

        for runner in &self.runners {
            if !runner.is_available() {
                let name = runner.name();
                info!(tool = %name, image, "skipping unavailable tool");
                report.skipped.push(name);
                continue;
            }

            let runner = Arc::clone(runner);
            let name = runner.name();
            let budget = self.config.budget_for(runner.class());
            let token = cancel.child_token();
            let image = image.to_string();
            debug!(tool = %name, image = %image, ?budget, "starting tool");

            let tool = name.clone();
            let handle = tasks.spawn(async move {
                let started = Instant::now();
                let result = tokio::select! {
                    _ = token.cancelled() => Err(RunnerError::Cancelled),
                    outcome = tokio::time::timeout(budget, runner.run(&image)) => {
                        outcome.unwrap_or(Err(RunnerError::Timeout { after: budget }))
                    }
                };
                (tool, result, started.elapsed())
            });
            names.insert(handle.id(), name);
        }

        // Single writer: partial results are folded in as tasks finish.
        while let Some(joined) = tasks.join_next_with_id().await {
            match joined {
                Ok((_, (tool, Ok(partial), elapsed))) => {
                    debug!(tool = %tool, image, ?elapsed, "tool finished");
                    report.stats.merge(partial);
                    report.contributors.push(tool);
                }
                Ok((_, (tool, Err(e), elapsed))) => {
                    warn!(tool = %tool, image, ?elapsed, error = %e, "tool failed");
                    report.failures.push(ToolFailure {
                        tool,
                        error: e.to_string(),
                    });
                }
                Err(e) => {
                    let tool = names
                        .remove(&e.id())
                        .unwrap_or_else(|| "unknown".to_string());
                    warn!(tool = %tool, image, error = %e, "tool task panicked");
                    report.failures.push(ToolFailure {
                        tool,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.stats.finalize();
        report.contributors.sort();
        report.failures.sort_by(|a, b| a.tool.cmp(&b.tool));

        info!(
            image,
            contributors = report.contributors.len(),
            failures = report.failures.len(),
            skipped = report.skipped.len(),
            "image analysis complete"
        );
        Ok(report)
    }

    /// Analyzes several images concurrently. Results keep the input order and
    /// a failure for one tag does not affect the others.
    pub async fn analyze_comparison(
        &self,
        images: &[String],
        cancel: &CancellationToken,
    ) -> Vec<(String, Result<AnalysisReport>)> {
        join_all(images.iter().map(|image| async move {
            (image.clone(), self.analyze_image(image, cancel).await)
        }))
        .await
    }
}
