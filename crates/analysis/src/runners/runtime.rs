use super::{ResolvedBinary, binary_name};
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::runner::{RunnerClass, ToolRunner};
use crate::tools::ToolLocator;
use crate::types::ImageStats;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

/// `docker inspect <image>` (or `podman inspect`).
pub struct RuntimeRunner {
    locator: ToolLocator,
    binary: ResolvedBinary,
}

impl RuntimeRunner {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            binary: ResolvedBinary::default(),
        }
    }
}

#[async_trait]
impl ToolRunner for RuntimeRunner {
    fn name(&self) -> String {
        self.binary
            .resolved()
            .map(binary_name)
            .unwrap_or_else(|| "runtime".to_string())
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
        command.arg("inspect").arg(image);
        let output = run_command(command).await?;

        parse_runtime_inspect(&output, image, &binary_name(binary))
    }
}

#[derive(Deserialize)]
struct InspectEntry {
    #[serde(rename = "Architecture", default)]
    architecture: String,
    #[serde(rename = "Os", default)]
    os: String,
    #[serde(rename = "Size", default)]
    size: u64,
    #[serde(rename = "RootFS", default)]
    root_fs: RootFs,
}

#[derive(Deserialize, Default)]
struct RootFs {
    #[serde(rename = "Layers", default)]
    layers: Vec<String>,
}

/// Parses `inspect` output: a JSON array whose first object describes the
/// image.
pub fn parse_runtime_inspect(
    output: &[u8],
    image: &str,
    binary: &str,
) -> Result<ImageStats, RunnerError> {
    let entries: Vec<InspectEntry> = serde_json::from_slice(output)
        .map_err(|e| RunnerError::parse(&format!("{binary} inspect"), e))?;

    let entry = entries
        .into_iter()
        .next()
        .ok_or_else(|| RunnerError::EmptyInspect {
            image: image.to_string(),
        })?;

    Ok(ImageStats {
        image_tag: image.to_string(),
        architecture: entry.architecture,
        os: entry.os,
        size_bytes: entry.size,
        total_layers: entry.root_fs.layers.len(),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_runtime_inspect() {
        let output = br#"[{
            "Id": "sha256:abc",
            "Architecture": "amd64",
            "Os": "linux",
            "Size": 7340032,
            "RootFS": {"Type": "layers", "Layers": ["sha256:1", "sha256:2", "sha256:3"]}
        }]"#;

        let stats = parse_runtime_inspect(output, "alpine:3.20", "docker").unwrap();
        assert_eq!(stats.image_tag, "alpine:3.20");
        assert_eq!(stats.architecture, "amd64");
        assert_eq!(stats.os, "linux");
        assert_eq!(stats.size_bytes, 7_340_032);
        assert_eq!(stats.total_layers, 3);
    }

    #[test]
    fn test_parse_runtime_inspect_empty_array() {
        let err = parse_runtime_inspect(b"[]", "missing:latest", "podman").unwrap_err();
        assert!(matches!(err, RunnerError::EmptyInspect { .. }));
    }

    #[test]
    fn test_parse_runtime_inspect_malformed() {
        let err = parse_runtime_inspect(b"{not json", "x", "docker").unwrap_err();
        assert!(err.to_string().contains("docker inspect"));
    }

    #[test]
    fn test_name_before_resolution() {
        let runner = RuntimeRunner::new(ToolLocator::new(None, None));
        assert_eq!(runner.name(), "runtime");
        assert!(!runner.is_available());
    }
}
