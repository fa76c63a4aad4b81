use super::ResolvedBinary;
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::runner::{RunnerClass, ToolRunner};
use crate::tools::ToolLocator;
use crate::types::ImageStats;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// `docker manifest inspect <image>` for multi-arch platform lists.
pub struct ManifestRunner {
    locator: ToolLocator,
    binary: ResolvedBinary,
}

impl ManifestRunner {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            binary: ResolvedBinary::default(),
        }
    }
}

#[async_trait]
impl ToolRunner for ManifestRunner {
    fn name(&self) -> String {
        "manifest".to_string()
    }

    fn is_available(&self) -> bool {
        self.binary
            .get_or_resolve(|| self.locator.find_runtime())
            .is_some()
    }

    fn class(&self) -> RunnerClass {
        RunnerClass::Inspect
    }

    async fn run(&self, image: &str) -> Result<ImageStats, RunnerError> {
        let binary = self
            .binary
            .get_or_resolve(|| self.locator.find_runtime())
            .ok_or(RunnerError::NoContainerRuntime)?;

        let mut command = Command::new(binary);
        command
            .args(["manifest", "inspect", image])
            .env("DOCKER_CLI_EXPERIMENTAL", "enabled");
        let output = run_command(command).await?;

        parse_manifest_inspect(&output, image)
    }
}

#[derive(Deserialize)]
struct ManifestDocument {
    #[serde(default)]
    manifests: Vec<ManifestEntry>,
}

#[derive(Deserialize)]
struct ManifestEntry {
    #[serde(default)]
    platform: Platform,
}

#[derive(Deserialize, Default)]
struct Platform {
    #[serde(default)]
    architecture: String,
    #[serde(default)]
    os: String,
}

/// A manifest list yields its `os/architecture` set. A single-image manifest
/// has no `manifests` array and contributes nothing, which is not an error.
pub fn parse_manifest_inspect(output: &[u8], image: &str) -> Result<ImageStats, RunnerError> {
    let document: ManifestDocument =
        serde_json::from_slice(output).map_err(|e| RunnerError::parse("manifest inspect", e))?;

    let mut stats = ImageStats::new(image);
    stats.supported_architectures = document
        .manifests
        .into_iter()
        .filter(|m| !m.platform.os.is_empty() || !m.platform.architecture.is_empty())
        .map(|m| format!("{}/{}", m.platform.os, m.platform.architecture))
        .collect();
    Ok(stats)
}
