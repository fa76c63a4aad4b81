//! Error types for the dockerfile crate

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Dockerfile operations
pub type Result<T> = std::result::Result<T, DockerfileError>;

#[derive(Error, Debug)]
pub enum DockerfileError {
    /// The Dockerfile could not be read
    #[error("failed to read Dockerfile {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
