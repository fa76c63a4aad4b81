use super::ResolvedBinary;
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::runner::{RunnerClass, ToolRunner};
use crate::tools::ToolLocator;
use crate::types::{ImageStats, Vulnerability, sort_vulnerabilities};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use tokio::process::Command;
use tracing::debug;

const TOOL: &str = "grype";

/// `grype <image> -o json`: vulnerability matches.
pub struct GrypeRunner {
    locator: ToolLocator,
    binary: ResolvedBinary,
}

impl GrypeRunner {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            binary: ResolvedBinary::default(),
        }
    }
}

#[async_trait]
impl ToolRunner for GrypeRunner {
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

        parse_grype_output(&output)
    }
}

#[derive(Deserialize)]
struct GrypeDocument {
    #[serde(default)]
    descriptor: Descriptor,
    #[serde(default)]
    matches: Vec<Match>,
}

#[derive(Deserialize, Default)]
struct Descriptor {
    #[serde(default)]
    timestamp: String,
}

#[derive(Deserialize)]
struct Match {
    vulnerability: MatchVulnerability,
    #[serde(default)]
    artifact: MatchArtifact,
}

#[derive(Deserialize)]
struct MatchVulnerability {
    #[serde(default)]
    id: String,
    #[serde(default)]
    severity: String,
}

#[derive(Deserialize, Default)]
struct MatchArtifact {
    #[serde(default)]
    name: String,
    #[serde(default)]
    version: String,
}

/// Parses a grype report. `vuln_summary` is keyed by the severity token as
/// grype spelled it; the scan time falls back to now when the descriptor
/// timestamp is missing or not RFC 3339.
pub fn parse_grype_output(output: &[u8]) -> Result<ImageStats, RunnerError> {
    let document: GrypeDocument =
        serde_json::from_slice(output).map_err(|e| RunnerError::parse(TOOL, e))?;

    let scan_timestamp = parse_timestamp(&document.descriptor.timestamp).unwrap_or_else(Utc::now);

    let mut vuln_summary = BTreeMap::new();
    let mut vulnerabilities = Vec::with_capacity(document.matches.len());
    for m in document.matches {
        *vuln_summary.entry(m.vulnerability.severity.clone()).or_insert(0) += 1;
        vulnerabilities.push(Vulnerability {
            id: m.vulnerability.id,
            severity: m.vulnerability.severity,
            package: m.artifact.name,
            version: m.artifact.version,
        });
    }
    sort_vulnerabilities(&mut vulnerabilities);

    Ok(ImageStats {
        vulnerabilities,
        vuln_summary,
        scan_timestamp: Some(scan_timestamp),
        ..Default::default()
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => Some(parsed.with_timezone(&Utc)),
        Err(e) => {
            debug!(timestamp = raw, error = %e, "failed to parse grype timestamp");
            None
        }
    }
}
