//! Pinned release coordinates of the scanner tools.

use crate::errors::{InstallError, Result};

/// One tool published as `<name>_<version>_<os>_<arch>.tar.gz` on GitHub
/// releases, next to a `<name>_<version>_checksums.txt` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolRelease {
    pub name: &'static str,
    pub repository: &'static str,
    pub version: &'static str,
}

pub const RELEASES: [ToolRelease; 3] = [
    ToolRelease {
        name: "syft",
        repository: "anchore/syft",
        version: "1.18.1",
    },
    ToolRelease {
        name: "grype",
        repository: "anchore/grype",
        version: "0.86.1",
    },
    ToolRelease {
        name: "dive",
        repository: "wagoodman/dive",
        version: "0.12.0",
    },
];

/// Release naming of an OS/architecture pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Platform {
    pub os: &'static str,
    pub arch: &'static str,
}

impl Platform {
    pub fn current() -> Result<Self> {
        Self::from_consts(std::env::consts::OS, std::env::consts::ARCH)
    }

    /// Maps Rust's `std::env::consts` names onto the release names.
    pub fn from_consts(os: &str, arch: &str) -> Result<Self> {
        let release_os = match os {
            "linux" => "linux",
            "macos" => "darwin",
            _ => return Err(unsupported(os, arch)),
        };
        let release_arch = match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            _ => return Err(unsupported(os, arch)),
        };
        Ok(Self {
            os: release_os,
            arch: release_arch,
        })
    }
}

fn unsupported(os: &str, arch: &str) -> InstallError {
    InstallError::UnsupportedPlatform {
        os: os.to_string(),
        arch: arch.to_string(),
    }
}

impl ToolRelease {
    pub fn find(name: &str) -> Option<&'static ToolRelease> {
        RELEASES.iter().find(|release| release.name == name)
    }

    pub fn archive_name(&self, platform: Platform) -> String {
        format!(
            "{}_{}_{}_{}.tar.gz",
            self.name, self.version, platform.os, platform.arch
        )
    }

    pub fn checksums_name(&self) -> String {
        format!("{}_{}_checksums.txt", self.name, self.version)
    }

    fn download_base(&self, base_url: &str) -> String {
        format!(
            "{}/{}/releases/download/v{}",
            base_url.trim_end_matches('/'),
            self.repository,
            self.version
        )
    }

    pub fn archive_url(&self, base_url: &str, platform: Platform) -> String {
        format!(
            "{}/{}",
            self.download_base(base_url),
            self.archive_name(platform)
        )
    }

    pub fn checksums_url(&self, base_url: &str) -> String {
        format!("{}/{}", self.download_base(base_url), self.checksums_name())
    }
}

/// Finds the sha256 of `file` in a `sha256sum`-style listing.
pub fn parse_checksums(listing: &str, file: &str) -> Option<String> {
    listing.lines().find_map(|line| {
        let mut fields = line.split_whitespace();
        let digest = fields.next()?;
        let name = fields.next()?.trim_start_matches('*');
        (name == file && digest.len() == 64).then(|| digest.to_ascii_lowercase())
    })
}
