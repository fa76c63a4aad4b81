//! # Renderer
//!
//! Turns resolved Dockerfile documentation and image analysis into text.
//!
//! Built-in templates are listed by [`templates::list_builtin`]: four markdown
//! layouts, a standalone HTML page and JSON. Markdown output is meant to be
//! spliced into an existing file with [`injector::inject`].

pub mod badges;
pub mod errors;
pub mod html;
pub mod injector;
pub mod json;
pub mod markdown;
pub mod templates;

pub use errors::{InjectError, RenderError, Result};
pub use injector::inject;
pub use templates::{BuiltinTemplate, OutputFormat, Template, list_builtin};

use analysis::ImageStats;
use dockerfile::Documentation;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Plain text instead of emoji for severities and required flags.
    pub no_moji: bool,
    /// Shields-compatible endpoint; badges are emitted only when set.
    pub badge_base_url: Option<String>,
}

/// One column of a comparison report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparedImage {
    pub label: String,
    pub stats: ImageStats,
}

impl ComparedImage {
    pub fn new(label: impl Into<String>, stats: ImageStats) -> Self {
        let label = label.into();
        let label = if label.is_empty() {
            stats.image_tag.clone()
        } else {
            label
        };
        Self { label, stats }
    }
}

/// Renders the documentation for one Dockerfile, with the image analysis
/// when one was run.
pub fn render(
    doc: &Documentation,
    stats: Option<&ImageStats>,
    options: &RenderOptions,
    template: Template,
) -> Result<String> {
    debug!(template = %template, items = doc.items.len(), with_stats = stats.is_some(), "rendering image documentation");
    let rendered = match template.format() {
        OutputFormat::Json => json::render_image(doc, stats)?,
        OutputFormat::Html => html::render_image(doc, stats, options)?,
        OutputFormat::Markdown => markdown::render_image(doc, stats, options, template)?,
    };
    Ok(rendered)
}

/// Renders a side-by-side table of several analyzed images.
pub fn render_comparison(
    images: &[ComparedImage],
    options: &RenderOptions,
    template: Template,
) -> Result<String> {
    debug!(template = %template, images = images.len(), "rendering comparison");
    let rendered = match template.format() {
        OutputFormat::Json => json::render_comparison(images)?,
        OutputFormat::Html => html::render_comparison(images, options)?,
        OutputFormat::Markdown => markdown::render_comparison(images, options, template)?,
    };
    Ok(rendered)
}
