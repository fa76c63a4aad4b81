use analysis::{Analyzer, ImageStats};
use anyhow::{Context, Result};
use config::{Config, Section, SectionType};
use renderer::{ComparedImage, RenderOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::utils::{resolve_section_output, resolve_template, settle_analysis};

pub struct ConfigArgs {
    pub config: PathBuf,
    pub template: Option<String>,
    pub no_moji: bool,
    pub badge_base_url: Option<String>,
    pub dry_run: bool,
    pub ignore_errors: bool,
}

/// Markdown output shared by every section: read on first use, written once.
struct MarkdownTarget {
    path: PathBuf,
    content: Option<String>,
    loaded: bool,
    dirty: bool,
}

impl MarkdownTarget {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            content: None,
            loaded: false,
            dirty: false,
        }
    }

    fn content(&mut self) -> Result<Option<&mut String>> {
        if !self.loaded {
            self.loaded = true;
            if self.path.exists() {
                let content = fs::read_to_string(&self.path)
                    .with_context(|| format!("failed to read {}", self.path.display()))?;
                self.content = Some(content);
            }
        }
        Ok(self.content.as_mut())
    }

    fn inject(&mut self, marker: &str, rendered: &str) -> Result<()> {
        let path = self.path.clone();
        let Some(content) = self.content()? else {
            warn!(path = %path.display(), marker, "output file does not exist, printing to stdout");
            println!("{rendered}");
            return Ok(());
        };

        match renderer::inject(content, marker, rendered) {
            Ok(updated) => {
                *content = updated;
                self.dirty = true;
                debug!(marker, "section injected");
            }
            Err(e) => {
                warn!(path = %path.display(), marker, error = %e, "could not inject section, printing to stdout");
                println!("{rendered}");
            }
        }
        Ok(())
    }

    fn flush(self) -> Result<()> {
        if let (true, Some(content)) = (self.dirty, self.content) {
            fs::write(&self.path, content)
                .with_context(|| format!("failed to write {}", self.path.display()))?;
            info!(path = %self.path.display(), "documentation written");
        }
        Ok(())
    }
}

pub async fn run(args: ConfigArgs, analyzer: &Analyzer, cancel: &CancellationToken) -> Result<()> {
    let config = config::load(&args.config)?;
    let options = RenderOptions {
        no_moji: args.no_moji,
        badge_base_url: args
            .badge_base_url
            .clone()
            .or_else(|| config.badge_base_url.clone()),
    };
    info!(
        config = %args.config.display(),
        sections = config.sections.len(),
        "processing config"
    );

    let mut markdown = MarkdownTarget::new(config.output.clone());
    for (index, section) in config.sections.iter().enumerate() {
        let Some(kind) = section.section_type() else {
            warn!(index, kind = %section.kind, "unknown section type, skipping");
            continue;
        };

        let template = resolve_template(args.template.as_deref(), config.template_for(section))?;
        let rendered = match kind {
            SectionType::Image => {
                render_image_section(section, analyzer, cancel, &options, template, &args).await?
            }
            SectionType::Comparison => {
                if section.images.is_empty() {
                    warn!(index, marker = %section.marker, "comparison section has no images, skipping");
                    continue;
                }
                render_comparison_section(section, analyzer, cancel, &options, template, &args)
                    .await?
            }
        };

        let format = template.format();
        if format.is_direct_write() {
            let path = resolve_section_output(&config.output, &section.marker, index, format);
            write_section_file(&path, &rendered, args.dry_run)?;
        } else if args.dry_run {
            println!("--- {} ---", marker_label(&config, section, index));
            println!("{rendered}");
        } else {
            markdown.inject(&section.marker, &rendered)?;
        }
    }

    markdown.flush()
}

async fn render_image_section(
    section: &Section,
    analyzer: &Analyzer,
    cancel: &CancellationToken,
    options: &RenderOptions,
    template: renderer::Template,
    args: &ConfigArgs,
) -> Result<String> {
    let source = section.source_path();
    let doc = dockerfile::parse_file(&source)
        .with_context(|| format!("failed to parse Dockerfile {}", source.display()))?;

    let stats = match section.image_tag() {
        Some(image) => {
            info!(image, "analyzing image");
            let result = analyzer.analyze_image(image, cancel).await;
            Some(settle_analysis(image, result, args.ignore_errors)?)
        }
        None => None,
    };

    Ok(renderer::render(&doc, stats.as_ref(), options, template)?)
}

async fn render_comparison_section(
    section: &Section,
    analyzer: &Analyzer,
    cancel: &CancellationToken,
    options: &RenderOptions,
    template: renderer::Template,
    args: &ConfigArgs,
) -> Result<String> {
    let tags: Vec<String> = section
        .images
        .iter()
        .map(|entry| entry.tag().trim().to_string())
        .collect();
    info!(images = tags.len(), "analyzing images for comparison");

    let results = analyzer.analyze_comparison(&tags, cancel).await;
    let mut images = Vec::with_capacity(results.len());
    for (entry, (tag, result)) in section.images.iter().zip(results) {
        let stats = settle_analysis(&tag, result, args.ignore_errors)?;
        images.push(ComparedImage::new(entry.label(), with_tag(stats, &tag)));
    }

    Ok(renderer::render_comparison(&images, options, template)?)
}

fn with_tag(mut stats: ImageStats, tag: &str) -> ImageStats {
    if stats.image_tag.is_empty() {
        stats.image_tag = tag.to_string();
    }
    stats
}

fn write_section_file(path: &Path, rendered: &str, dry_run: bool) -> Result<()> {
    if dry_run {
        println!("--- {} ---", path.display());
        println!("{rendered}");
        return Ok(());
    }
    fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))?;
    info!(path = %path.display(), "section written");
    Ok(())
}

fn marker_label(config: &Config, section: &Section, index: usize) -> String {
    if section.marker.trim().is_empty() {
        format!("{} section {index}", config.output.display())
    } else {
        section.marker.trim().to_string()
    }
}
