//! Locating external tool binaries.
//!
//! Tools are looked up on `PATH` first and then in the dock-docs install
//! cache (`~/.dock-docs/bin`). Container runtimes are only looked up on
//! `PATH`, `docker` first and `podman` as the fallback.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

pub const CONTAINER_RUNTIMES: [&str; 2] = ["docker", "podman"];
pub const SCANNER_TOOLS: [&str; 3] = ["syft", "grype", "dive"];

const INSTALL_DIR_NAME: &str = ".dock-docs";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSource {
    SystemPath,
    InstallDir,
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolSource::SystemPath => write!(f, "PATH"),
            ToolSource::InstallDir => write!(f, "dock-docs"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolLocation {
    pub path: PathBuf,
    pub source: ToolSource,
}

/// Resolves tool names to executables. Cheap: only touches file metadata.
#[derive(Debug, Clone)]
pub struct ToolLocator {
    search_path: Option<OsString>,
    install_dir: Option<PathBuf>,
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::from_env()
    }
}

impl ToolLocator {
    pub fn from_env() -> Self {
        Self {
            search_path: std::env::var_os("PATH"),
            install_dir: default_install_dir(),
        }
    }

    pub fn new(search_path: Option<OsString>, install_dir: Option<PathBuf>) -> Self {
        Self {
            search_path,
            install_dir,
        }
    }

    pub fn install_dir(&self) -> Option<&Path> {
        self.install_dir.as_deref()
    }

    pub fn find_on_path(&self, name: &str) -> Option<PathBuf> {
        let search_path = self.search_path.as_ref()?;
        std::env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .find_map(|dir| executable_in(&dir, name))
    }

    /// Looks a tool up on `PATH`, then in the install cache.
    pub fn find(&self, name: &str) -> Option<ToolLocation> {
        if let Some(path) = self.find_on_path(name) {
            return Some(ToolLocation {
                path,
                source: ToolSource::SystemPath,
            });
        }

        self.install_dir
            .as_deref()
            .and_then(|dir| executable_in(dir, name))
            .map(|path| ToolLocation {
                path,
                source: ToolSource::InstallDir,
            })
    }

    /// First available container runtime.
    pub fn find_runtime(&self) -> Option<PathBuf> {
        CONTAINER_RUNTIMES
            .iter()
            .find_map(|runtime| self.find_on_path(runtime))
    }
}

pub fn default_install_dir() -> Option<PathBuf> {
    home::home_dir().map(|home| home.join(INSTALL_DIR_NAME).join("bin"))
}

fn executable_in(dir: &Path, name: &str) -> Option<PathBuf> {
    let candidate = dir.join(name);
    if is_executable(&candidate) {
        return Some(candidate);
    }

    if cfg!(windows) {
        let with_ext = dir.join(format!("{name}.exe"));
        if is_executable(&with_ext) {
            return Some(with_ext);
        }
    }
    None
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

/// Presence of one prerequisite, as reported by `dock-docs --check`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolStatus {
    pub name: String,
    pub location: Option<ToolLocation>,
}

pub fn tool_status(locator: &ToolLocator) -> Vec<ToolStatus> {
    let runtime = CONTAINER_RUNTIMES.iter().find_map(|name| {
        locator.find_on_path(name).map(|path| ToolStatus {
            name: name.to_string(),
            location: Some(ToolLocation {
                path,
                source: ToolSource::SystemPath,
            }),
        })
    });

    let mut statuses = vec![runtime.unwrap_or_else(|| ToolStatus {
        name: CONTAINER_RUNTIMES.join(" or "),
        location: None,
    })];

    statuses.extend(SCANNER_TOOLS.iter().map(|name| ToolStatus {
        name: name.to_string(),
        location: locator.find(name),
    }));
    statuses
}
