//! Error types for the installer crate

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InstallError>;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error("no release binaries for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("could not determine the install directory (no home directory)")]
    NoInstallDir,

    #[error("failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to download {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("download failed with status {status}: {url}")]
    Status { url: String, status: u16 },

    #[error("no checksum listed for {file}")]
    MissingChecksum { file: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("{binary} not found in {archive}")]
    BinaryNotInArchive { binary: String, archive: String },

    #[error("failed to install into {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("extraction task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
