use super::ResolvedBinary;
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::runner::{RunnerClass, ToolRunner};
use crate::tools::ToolLocator;
use crate::types::{ImageStats, PackageSummary, dedupe_packages};
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;

const TOOL: &str = "syft";

/// `syft <image> -o json`: the software bill of materials.
pub struct SyftRunner {
    locator: ToolLocator,
    binary: ResolvedBinary,
}

impl SyftRunner {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            binary: ResolvedBinary::default(),
        }
    }
}

#[async_trait]
impl ToolRunner for SyftRunner {
    fn name(&self) -> String {
        TOOL.to_string()
    }

    fn is_available(&self) -> bool {
        self.binary
            .get_or_resolve(|| self.locator.find(TOOL).map(|l| l.path))
            .is_some()
    }

    fn class(&self) -> RunnerClass {
        RunnerClass::Scan
    }

    async fn run(&self, image: &str) -> Result<ImageStats, RunnerError> {
        let binary = self
            .binary
            .get_or_resolve(|| self.locator.find(TOOL).map(|l| l.path))
            .ok_or_else(|| RunnerError::NotFound {
                tool: TOOL.to_string(),
            })?;

        let mut command = Command::new(binary);
        command.args([image, "-o", "json"]);
        let output = run_command(command).await?;

        parse_syft_output(&output)
    }
}

#[derive(Deserialize)]
struct SyftDocument {
    #[serde(default)]
    distro: Distro,
    #[serde(default)]
    artifacts: Vec<Artifact>,
}

#[derive(Deserialize, Default)]
struct Distro {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

#[derive(Deserialize)]
struct Artifact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

pub fn parse_syft_output(output: &[u8]) -> Result<ImageStats, RunnerError> {
    let document: SyftDocument =
        serde_json::from_slice(output).map_err(|e| RunnerError::parse(TOOL, e))?;

    let os_distro = match (document.distro.name.as_str(), document.distro.version.as_str()) {
        ("", _) => String::new(),
        (name, "") => name.to_string(),
        (name, version) => format!("{name} {version}"),
    };

    let mut packages: Vec<PackageSummary> = document
        .artifacts
        .into_iter()
        .map(|artifact| PackageSummary {
            name: artifact.name,
            version: artifact.version,
        })
        .collect();
    dedupe_packages(&mut packages);

    Ok(ImageStats {
        os_distro,
        total_packages: packages.len(),
        packages,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_syft_output() {
        let output = br#"{
            "distro": {"name": "alpine", "version": "3.20.1"},
            "artifacts": [
                {"name": "musl", "version": "1.2.5-r0", "type": "apk"},
                {"name": "busybox", "version": "1.36.1-r29", "type": "apk"},
                {"name": "musl", "version": "1.2.5-r0", "type": "apk"}
            ]
        }"#;

        let stats = parse_syft_output(output).unwrap();
        assert_eq!(stats.os_distro, "alpine 3.20.1");
        assert_eq!(stats.total_packages, 2);
        assert_eq!(stats.packages[0].name, "busybox");
        assert_eq!(stats.packages[1].name, "musl");
    }

    #[test]
    fn test_parse_syft_distro_without_version() {
        let stats = parse_syft_output(br#"{"distro": {"name": "wolfi"}, "artifacts": []}"#).unwrap();
        assert_eq!(stats.os_distro, "wolfi");
        assert!(stats.packages.is_empty());
    }

    #[test]
    fn test_parse_syft_malformed() {
        let err = parse_syft_output(br#"{"artifacts": "nope"}"#).unwrap_err();
        assert!(err.to_string().starts_with("failed to unmarshal syft output"));
    }
}
