use super::ResolvedBinary;
use crate::errors::RunnerError;
use crate::exec::run_command;
use crate::runner::{RunnerClass, ToolRunner};
use crate::tools::ToolLocator;
use crate::types::ImageStats;
use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

const TOOL: &str = "dive";
const UNIX_SCHEME: &str = "unix://";

/// `dive <image> --json <file>`: layer efficiency.
pub struct DiveRunner {
    locator: ToolLocator,
    binary: ResolvedBinary,
}

impl DiveRunner {
    pub fn new(locator: ToolLocator) -> Self {
        Self {
            locator,
            binary: ResolvedBinary::default(),
        }
    }

    /// Dive talks to the Docker API. Without docker on `PATH` but with a
    /// podman machine running, point it at the machine socket unless the
    /// user already set `DOCKER_HOST`.
    async fn podman_docker_host(&self) -> Option<String> {
        if self.locator.find_on_path("docker").is_some()
            || std::env::var_os("DOCKER_HOST").is_some()
        {
            return None;
        }
        let podman = self.locator.find_on_path("podman")?;

        let mut command = Command::new(podman);
        command.args(["machine", "inspect"]);
        match run_command(command).await {
            Ok(output) => parse_podman_socket(&output),
            Err(e) => {
                debug!(error = %e, "podman machine inspect failed");
                None
            }
        }
    }
}

#[async_trait]
impl ToolRunner for DiveRunner {
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

        // Removed when dropped, including on timeout.
        let report_path = tempfile::Builder::new()
            .prefix("dive-output-")
            .suffix(".json")
            .tempfile()?
            .into_temp_path();

        let mut command = Command::new(binary);
        command.arg(image).arg("--json").arg(&report_path);
        if let Some(docker_host) = self.podman_docker_host().await {
            debug!(docker_host = %docker_host, "using podman machine socket for dive");
            command.env("DOCKER_HOST", docker_host);
        }

        // Dive logs progress on stdout; the report is in the file.
        run_command(command).await?;

        let content = tokio::fs::read(&report_path).await?;
        parse_dive_output(&content)
    }
}

#[derive(Deserialize)]
struct DiveReport {
    image: DiveImage,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiveImage {
    #[serde(default)]
    inefficient_bytes: u64,
    /// Fraction between 0 and 1.
    #[serde(default)]
    efficiency_score: f64,
}

pub fn parse_dive_output(content: &[u8]) -> Result<ImageStats, RunnerError> {
    let report: DiveReport =
        serde_json::from_slice(content).map_err(|e| RunnerError::parse(TOOL, e))?;

    Ok(ImageStats {
        efficiency_score: report.image.efficiency_score * 100.0,
        wasted_bytes: report.image.inefficient_bytes,
        ..Default::default()
    })
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PodmanMachine {
    #[serde(default)]
    connection_info: ConnectionInfo,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
struct ConnectionInfo {
    podman_socket: Option<PodmanSocket>,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PodmanSocket {
    #[serde(default)]
    path: String,
}

/// Extracts a `DOCKER_HOST` value from `podman machine inspect` output.
pub fn parse_podman_socket(output: &[u8]) -> Option<String> {
    let machines: Vec<PodmanMachine> = serde_json::from_slice(output).ok()?;
    let socket = machines.into_iter().next()?.connection_info.podman_socket?;
    if socket.path.is_empty() {
        return None;
    }

    if socket.path.starts_with(UNIX_SCHEME) {
        Some(socket.path)
    } else {
        Some(format!("{UNIX_SCHEME}{}", socket.path))
    }
}
