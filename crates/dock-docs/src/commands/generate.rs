use analysis::Analyzer;
use anyhow::{Context, Result};
use renderer::{OutputFormat, RenderOptions, Template};
use std::fs;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::utils::{resolve_output_path, settle_analysis};

pub struct GenerateArgs {
    pub dockerfile: PathBuf,
    pub output: PathBuf,
    pub dry_run: bool,
    pub image: Option<String>,
    pub template: Template,
    pub options: RenderOptions,
    pub ignore_errors: bool,
}

pub async fn run(
    args: GenerateArgs,
    analyzer: &Analyzer,
    cancel: &CancellationToken,
) -> Result<()> {
    let doc = dockerfile::parse_file(&args.dockerfile).context("failed to parse Dockerfile")?;

    let stats = match args.image.as_deref().map(str::trim) {
        Some(image) if !image.is_empty() => {
            info!(image, "analyzing image");
            let result = analyzer.analyze_image(image, cancel).await;
            Some(settle_analysis(image, result, args.ignore_errors)?)
        }
        _ => None,
    };

    let rendered = renderer::render(&doc, stats.as_ref(), &args.options, args.template)?;
    write_output(&args, &rendered)
}

fn write_output(args: &GenerateArgs, rendered: &str) -> Result<()> {
    if args.dry_run {
        println!("{rendered}");
        return Ok(());
    }

    let format = args.template.format();
    if format.is_direct_write() {
        let path = resolve_output_path(&args.output, format);
        fs::write(&path, rendered)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), format = %format, "documentation written");
        return Ok(());
    }

    debug_assert_eq!(format, OutputFormat::Markdown);
    if !args.output.exists() {
        warn!(path = %args.output.display(), "output file does not exist, printing to stdout");
        println!("{rendered}");
        return Ok(());
    }

    let content = fs::read_to_string(&args.output)
        .with_context(|| format!("failed to read {}", args.output.display()))?;
    match renderer::inject(&content, "", rendered) {
        Ok(updated) => {
            fs::write(&args.output, updated)
                .with_context(|| format!("failed to write {}", args.output.display()))?;
            info!(path = %args.output.display(), "documentation injected");
        }
        Err(e) => {
            warn!(path = %args.output.display(), error = %e, "could not inject documentation, printing to stdout");
            println!("{rendered}");
        }
    }
    Ok(())
}
