//! # Dockerfile
//!
//! Turns a Dockerfile into an ordered list of documentation items.
//!
//! This crate provides:
//! - A lightweight instruction model for `ARG`, `ENV`, `LABEL` and `EXPOSE`
//! - Extraction of `# @tag: value` magic comments
//! - The resolver that pairs annotations with the items an instruction declares
//!
//! ## Usage
//!
//! ```rust,no_run
//! let doc = dockerfile::parse_file("Dockerfile").unwrap();
//! for item in &doc.items {
//!     println!("{} {} = {}", item.item_type, item.name, item.value);
//! }
//! ```

pub mod annotation;
pub mod errors;
pub mod instruction;
pub mod resolver;
pub mod types;
mod words;

pub use errors::{DockerfileError, Result};
pub use types::{DocItem, Documentation, ItemType};

use std::fs;
use std::path::Path;
use tracing::debug;

/// Reads and resolves a Dockerfile from disk.
///
/// A missing or unreadable file is the only failure; content that yields no
/// recognized instructions produces an empty [`Documentation`]. Bytes that
/// are not valid UTF-8 are replaced rather than rejected.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Documentation> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|source| DockerfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let doc = parse_str(&String::from_utf8_lossy(&bytes));
    debug!(
        path = %path.display(),
        items = doc.items.len(),
        "resolved Dockerfile documentation"
    );
    Ok(doc)
}

/// Resolves Dockerfile text that is already in memory.
pub fn parse_str(content: &str) -> Documentation {
    let instructions = instruction::parse_instructions(content);
    Documentation {
        items: resolver::resolve(&instructions),
    }
}
