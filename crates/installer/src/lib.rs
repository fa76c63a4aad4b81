//! # Installer
//!
//! Fetches pinned releases of the scanner tools (syft, grype, dive) into the
//! dock-docs install cache, where [`analysis::tools::ToolLocator`] looks for
//! them after `PATH`. Archives are checked against the published sha256
//! listing before anything is extracted.

pub mod archive;
pub mod errors;
pub mod release;

pub use errors::{InstallError, Result};
pub use release::{Platform, RELEASES, ToolRelease};

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

pub const GITHUB_BASE_URL: &str = "https://github.com";

const HTTP_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Installed { path: PathBuf, version: String },
    AlreadyPresent { path: PathBuf },
}

pub struct Installer {
    client: reqwest::Client,
    install_dir: PathBuf,
    base_url: String,
}

impl Installer {
    pub fn new(install_dir: PathBuf) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .user_agent(concat!("dock-docs/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(InstallError::Client)?;
        Ok(Self {
            client,
            install_dir,
            base_url: GITHUB_BASE_URL.to_string(),
        })
    }

    /// Installs into the default cache, `~/.dock-docs/bin`.
    pub fn with_default_dir() -> Result<Self> {
        let dir = analysis::tools::default_install_dir().ok_or(InstallError::NoInstallDir)?;
        Self::new(dir)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn installed_path(&self, release: &ToolRelease) -> PathBuf {
        self.install_dir.join(release.name)
    }

    /// Downloads, verifies and unpacks one tool. A binary already in the
    /// cache is kept unless `force` is set.
    pub async fn install(
        &self,
        release: &ToolRelease,
        platform: Platform,
        force: bool,
    ) -> Result<InstallOutcome> {
        let target = self.installed_path(release);
        if !force && target.is_file() {
            debug!(tool = release.name, path = %target.display(), "already installed");
            return Ok(InstallOutcome::AlreadyPresent { path: target });
        }

        let archive_name = release.archive_name(platform);
        let listing = self.fetch(&release.checksums_url(&self.base_url)).await?;
        let expected = release::parse_checksums(&String::from_utf8_lossy(&listing), &archive_name)
            .ok_or_else(|| InstallError::MissingChecksum {
                file: archive_name.clone(),
            })?;

        let bytes = self
            .fetch(&release.archive_url(&self.base_url, platform))
            .await?;
        archive::verify_checksum(&bytes, &expected, &archive_name)?;

        let binary = release.name.to_string();
        let dest = self.install_dir.clone();
        let path = tokio::task::spawn_blocking(move || {
            archive::extract_binary(&bytes, &archive_name, &binary, &dest)
        })
        .await??;

        info!(tool = release.name, version = release.version, path = %path.display(), "tool installed");
        Ok(InstallOutcome::Installed {
            path,
            version: release.version.to_string(),
        })
    }

    async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        info!(url, "downloading");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|source| InstallError::Download {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(InstallError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| InstallError::Download {
                url: url.to_string(),
                source,
            })?;
        debug!(url, bytes = bytes.len(), "download finished");
        Ok(bytes.to_vec())
    }
}
