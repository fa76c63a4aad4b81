//! # Config
//!
//! Loader for `dock-docs.yaml`, which drives several documentation sections
//! into one output file:
//!
//! ```yaml
//! output: README.md
//! badgeBaseUrl: https://img.shields.io/badge
//! template: { name: default }
//! sections:
//!   - type: image
//!     marker: main
//!     source: Dockerfile
//!     tag: my-app:latest
//!   - type: comparison
//!     marker: compare
//!     images:
//!       - alpine:3.20
//!       - { tag: debian:12, label: Debian }
//! ```
//!
//! Relative paths are resolved against the directory holding the config file.

pub mod errors;

pub use errors::{ConfigError, Result};

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use strum::{Display, EnumString};
use tracing::debug;

pub const DEFAULT_CONFIG_FILE: &str = "dock-docs.yaml";
pub const DEFAULT_OUTPUT: &str = "README.md";
pub const DEFAULT_SOURCE: &str = "Dockerfile";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default)]
    pub badge_base_url: Option<String>,
    #[serde(default)]
    pub template: Option<TemplateConfig>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TemplateConfig {
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SectionType {
    Image,
    Comparison,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Section {
    /// Kept verbatim so unknown types can be reported and skipped.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub marker: String,
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub images: Vec<ImageEntry>,
    #[serde(default)]
    pub template: Option<TemplateConfig>,
}

/// An image in a comparison, either a bare tag or a tag with a display label.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ImageEntry {
    Tag(String),
    Labeled {
        tag: String,
        #[serde(default)]
        label: Option<String>,
    },
}

impl ImageEntry {
    pub fn tag(&self) -> &str {
        match self {
            ImageEntry::Tag(tag) => tag.as_str(),
            ImageEntry::Labeled { tag, .. } => tag.as_str(),
        }
    }

    /// Display label, falling back to the tag.
    pub fn label(&self) -> &str {
        match self {
            ImageEntry::Labeled {
                label: Some(label), ..
            } if !label.is_empty() => label.as_str(),
            _ => self.tag(),
        }
    }
}

impl Section {
    pub fn section_type(&self) -> Option<SectionType> {
        SectionType::from_str(self.kind.trim()).ok()
    }

    pub fn source_path(&self) -> PathBuf {
        self.source
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE))
    }

    /// The image tag to analyze, if any.
    pub fn image_tag(&self) -> Option<&str> {
        self.tag
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
    }
}

impl Config {
    /// Template name for `section`: its own setting, then the global one.
    /// `None` leaves the choice to the caller.
    pub fn template_for<'a>(&'a self, section: &'a Section) -> Option<&'a str> {
        [section.template.as_ref(), self.template.as_ref()]
            .into_iter()
            .flatten()
            .map(|template| template.name.trim())
            .find(|name| !name.is_empty())
    }

    fn resolve_paths(&mut self, base_dir: &Path) {
        self.output = resolve(base_dir, &self.output);
        for section in &mut self.sections {
            section.source = Some(resolve(base_dir, &section.source_path()));
        }
    }

    fn validate(&self) -> Result<()> {
        for (index, section) in self.sections.iter().enumerate() {
            if section.marker.contains("-->") {
                return Err(ConfigError::InvalidSection {
                    index,
                    reason: format!("marker {:?} cannot contain \"-->\"", section.marker),
                });
            }
            if let Some(entry) = section.images.iter().find(|e| e.tag().trim().is_empty()) {
                return Err(ConfigError::InvalidSection {
                    index,
                    reason: format!("comparison image with empty tag ({entry:?})"),
                });
            }
        }
        Ok(())
    }
}

fn default_output() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Parses config text without touching the filesystem. Paths stay as written.
pub fn parse_str(content: &str, path: &Path) -> Result<Config> {
    let config: Config = serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()?;
    Ok(config)
}

/// Reads, validates and path-resolves a config file.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let mut config = parse_str(&content, path)?;
    let base_dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    config.resolve_paths(&base_dir);

    debug!(
        path = %path.display(),
        output = %config.output.display(),
        sections = config.sections.len(),
        "loaded config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const FULL: &str = r#"
output: docs/README.md
badgeBaseUrl: https://img.shields.io/badge
template:
  name: minimal
sections:
  - type: image
    marker: main
    source: app/Dockerfile
    tag: my-app:latest
    template:
      name: html
  - type: comparison
    marker: compare
    images:
      - alpine:3.20
      - tag: debian:12
        label: Debian
  - type: gallery
"#;

    #[test]
    fn test_load_full_config() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dock-docs.yaml");
        fs::write(&path, FULL).unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.output, dir.path().join("docs/README.md"));
        assert_eq!(
            config.badge_base_url.as_deref(),
            Some("https://img.shields.io/badge")
        );
        assert_eq!(config.sections.len(), 3);

        let image = &config.sections[0];
        assert_eq!(image.section_type(), Some(SectionType::Image));
        assert_eq!(image.marker, "main");
        assert_eq!(image.source_path(), dir.path().join("app/Dockerfile"));
        assert_eq!(image.image_tag(), Some("my-app:latest"));
        assert_eq!(config.template_for(image), Some("html"));

        let comparison = &config.sections[1];
        assert_eq!(comparison.section_type(), Some(SectionType::Comparison));
        assert_eq!(comparison.images[0].tag(), "alpine:3.20");
        assert_eq!(comparison.images[0].label(), "alpine:3.20");
        assert_eq!(comparison.images[1].tag(), "debian:12");
        assert_eq!(comparison.images[1].label(), "Debian");
        assert_eq!(config.template_for(comparison), Some("minimal"));

        assert_eq!(config.sections[2].section_type(), None);
        assert_eq!(config.sections[2].kind, "gallery");
    }

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dock-docs.yaml");
        fs::write(&path, "sections:\n  - type: image\n").unwrap();

        let config = load(&path).unwrap();
        assert_eq!(config.output, dir.path().join(DEFAULT_OUTPUT));
        assert_eq!(config.badge_base_url, None);
        let section = &config.sections[0];
        assert_eq!(section.source_path(), dir.path().join(DEFAULT_SOURCE));
        assert_eq!(section.image_tag(), None);
        assert_eq!(config.template_for(section), None);
    }

    #[test]
    fn test_section_template_wins_over_global() {
        let config = parse_str("template:\n  name: compact\n", Path::new("c.yaml")).unwrap();
        let detached = parse_str(
            "sections:\n  - type: image\n    template:\n      name: json\n",
            Path::new("d.yaml"),
        )
        .unwrap();

        let section = &detached.sections[0];
        assert_eq!(config.template_for(section), Some("json"));

        let bare = parse_str("sections:\n  - type: image\n", Path::new("e.yaml")).unwrap();
        assert_eq!(config.template_for(&bare.sections[0]), Some("compact"));
    }

    #[test]
    fn test_parse_str_keeps_paths_as_written() {
        let config = parse_str("output: OUT.md\n", Path::new("dock-docs.yaml")).unwrap();
        assert_eq!(config.output, PathBuf::from("OUT.md"));
        assert!(config.sections.is_empty());
    }

    #[test]
    fn test_absolute_paths_are_kept() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("dock-docs.yaml");
        let abs = dir.path().join("elsewhere").join("README.md");
        fs::write(&path, format!("output: {}\n", abs.display())).unwrap();

        assert_eq!(load(&path).unwrap().output, abs);
    }

    #[test]
    fn test_blank_tag_is_no_tag() {
        let config = parse_str("sections:\n  - type: image\n    tag: '  '\n", Path::new("c.yaml")).unwrap();
        assert_eq!(config.sections[0].image_tag(), None);
    }

    #[test]
    fn test_empty_comparison_tag_is_invalid() {
        let err = parse_str(
            "sections:\n  - type: comparison\n    images: ['alpine', '']\n",
            Path::new("c.yaml"),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSection { index: 0, .. }));
    }

    #[test]
    fn test_malformed_yaml() {
        let err = parse_str("sections: [", Path::new("bad.yaml")).unwrap_err();
        assert!(err.to_string().contains("failed to parse config file"));
    }

    #[test]
    fn test_missing_file() {
        let err = load("/nonexistent/dock-docs.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
