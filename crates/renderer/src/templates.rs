use crate::errors::{RenderError, Result};
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// Output format produced by a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum OutputFormat {
    Markdown,
    Html,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Markdown => ".md",
            OutputFormat::Html => ".html",
            OutputFormat::Json => ".json",
        }
    }

    /// HTML and JSON are whole documents written to their own file; markdown
    /// is injected between markers.
    pub fn is_direct_write(&self) -> bool {
        !matches!(self, OutputFormat::Markdown)
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Display,
    EnumString,
    AsRefStr,
    IntoStaticStr,
    EnumIter,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Template {
    #[default]
    Default,
    Minimal,
    Detailed,
    Compact,
    Html,
    Json,
}

impl Template {
    /// Looks a built-in up by name. An empty name selects `default`.
    pub fn from_name(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(Template::Default);
        }
        Template::from_str(name).map_err(|_| RenderError::UnknownTemplate {
            name: name.to_string(),
        })
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Template::Html => OutputFormat::Html,
            Template::Json => OutputFormat::Json,
            _ => OutputFormat::Markdown,
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Template::Default => "Configuration tables per instruction type plus image analysis",
            Template::Minimal => "A single table of all items and a one-line image summary",
            Template::Detailed => {
                "Everything in default plus full severity breakdown, platforms and scan time"
            }
            Template::Compact => "Bullet list of items and a one-row image summary",
            Template::Html => "Standalone HTML page with styled tables",
            Template::Json => "Machine-readable JSON of items and stats",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltinTemplate {
    pub name: &'static str,
    pub format: OutputFormat,
    pub description: &'static str,
}

pub fn list_builtin() -> Vec<BuiltinTemplate> {
    Template::iter()
        .map(|template| BuiltinTemplate {
            name: template.into(),
            format: template.format(),
            description: template.description(),
        })
        .collect()
}

pub fn is_builtin(name: &str) -> bool {
    Template::from_str(name.trim()).is_ok()
}
