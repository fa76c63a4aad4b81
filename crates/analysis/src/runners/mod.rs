//! Built-in tool adapters.

pub mod dive;
pub mod grype;
pub mod manifest;
pub mod runtime;
pub mod syft;

pub use dive::DiveRunner;
pub use grype::GrypeRunner;
pub use manifest::ManifestRunner;
pub use runtime::RuntimeRunner;
pub use syft::SyftRunner;

use crate::runner::ToolRunner;
use crate::tools::ToolLocator;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

/// The full adapter set, in the order they are reported.
pub fn default_runners(locator: &ToolLocator) -> Vec<Arc<dyn ToolRunner>> {
    vec![
        Arc::new(RuntimeRunner::new(locator.clone())),
        Arc::new(ManifestRunner::new(locator.clone())),
        Arc::new(SyftRunner::new(locator.clone())),
        Arc::new(GrypeRunner::new(locator.clone())),
        Arc::new(DiveRunner::new(locator.clone())),
    ]
}

/// Binary path resolved on first use and reused afterwards.
#[derive(Debug, Default)]
pub(crate) struct ResolvedBinary(OnceLock<Option<PathBuf>>);

impl ResolvedBinary {
    pub(crate) fn get_or_resolve(&self, resolve: impl FnOnce() -> Option<PathBuf>) -> Option<&Path> {
        self.0.get_or_init(resolve).as_deref()
    }

    pub(crate) fn resolved(&self) -> Option<&Path> {
        self.0.get().and_then(|binary| binary.as_deref())
    }
}

/// File name of a resolved binary, e.g. `docker` for `/usr/bin/docker`.
pub(crate) fn binary_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
