use analysis::{AnalysisReport, ImageStats};
use anyhow::{Result, bail};
use renderer::{OutputFormat, Template};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Cancellation shared by every analysis of this run. It fires on Ctrl-C and,
/// when `timeout_secs` is set, once the deadline passes.
pub fn cancellation_token(timeout_secs: Option<u64>) -> CancellationToken {
    let token = CancellationToken::new();

    if let Some(secs) = timeout_secs {
        let deadline = token.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            warn!(timeout_secs = secs, "analysis deadline reached, cancelling tools");
            deadline.cancel();
        });
    }

    let interrupt = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling tools");
            interrupt.cancel();
        }
    });

    token
}

/// Picks the template: the command line flag wins over the configured name,
/// and nothing selected means `default`.
pub fn resolve_template(flag: Option<&str>, configured: Option<&str>) -> Result<Template> {
    let name = flag
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .or(configured)
        .unwrap_or_default();
    let template = Template::from_name(name)?;
    debug!(template = %template, format = %template.format(), "template resolved");
    Ok(template)
}

/// Where a standalone HTML/JSON document goes. The default `README.md`
/// becomes `README.html` or `README.json`; any other path is kept.
pub fn resolve_output_path(output: &Path, format: OutputFormat) -> PathBuf {
    if output != Path::new(config::DEFAULT_OUTPUT) {
        return output.to_path_buf();
    }
    output.with_extension(format.extension().trim_start_matches('.'))
}

/// Output file for a config section written in HTML/JSON:
/// `<dir>/<stem>-<marker><ext>`, or `-section<N>` when the section has no
/// marker.
pub fn resolve_section_output(
    base: &Path,
    marker: &str,
    index: usize,
    format: OutputFormat,
) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "README".to_string());
    let suffix = if marker.trim().is_empty() {
        format!("-section{index}")
    } else {
        format!("-{}", marker.trim())
    };
    let file_name = format!("{stem}{suffix}{}", format.extension());

    match base.parent() {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}

/// Applies the failure policy to one analysis result.
///
/// Without `ignore_errors` any failed tool, or an analysis where no tool
/// could run, aborts the command. With it, whatever was collected is kept.
pub fn settle_analysis(
    image: &str,
    result: analysis::Result<AnalysisReport>,
    ignore_errors: bool,
) -> Result<ImageStats> {
    let report = match result {
        Ok(report) => report,
        Err(e) => {
            warn!(image, error = %e, "analysis failed");
            if !ignore_errors {
                bail!("analysis failed for {image}: {e}");
            }
            return Ok(ImageStats::new(image));
        }
    };

    for failure in &report.failures {
        warn!(image, tool = %failure.tool, error = %failure.error, "tool failed");
    }

    let problem = if report.has_failures() {
        let tools: Vec<&str> = report.failures.iter().map(|f| f.tool.as_str()).collect();
        Some(format!("{} tool(s) failed: {}", tools.len(), tools.join(", ")))
    } else if report.is_empty() {
        Some(format!(
            "no analysis tools available (skipped: {})",
            report.skipped.join(", ")
        ))
    } else {
        None
    };

    match problem {
        Some(reason) if !ignore_errors => {
            warn!(image, reason = %reason, "analysis failed");
            bail!("analysis failed for {image}: {reason}")
        }
        Some(reason) => {
            warn!(image, reason = %reason, "analysis incomplete, continuing with partial results");
            Ok(report.stats)
        }
        None => {
            info!(image, tools = %report.contributors.join(", "), "analysis complete");
            Ok(report.stats)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis::{AnalysisError, ToolFailure};

    fn report(failures: Vec<ToolFailure>, contributors: Vec<&str>) -> AnalysisReport {
        let mut stats = ImageStats::new("app:1");
        stats.os = "linux".to_string();
        AnalysisReport {
            stats,
            failures,
            skipped: vec!["dive".to_string()],
            contributors: contributors.into_iter().map(String::from).collect(),
        }
    }

    fn failure(tool: &str) -> ToolFailure {
        ToolFailure {
            tool: tool.to_string(),
            error: "boom".to_string(),
        }
    }

    #[test]
    fn test_resolve_template_precedence() {
        assert_eq!(resolve_template(None, None).unwrap(), Template::Default);
        assert_eq!(
            resolve_template(None, Some("compact")).unwrap(),
            Template::Compact
        );
        assert_eq!(
            resolve_template(Some("json"), Some("compact")).unwrap(),
            Template::Json
        );
        assert_eq!(
            resolve_template(Some(""), Some("html")).unwrap(),
            Template::Html
        );
        assert!(resolve_template(Some("nope"), None).is_err());
    }

    #[test]
    fn test_resolve_output_path() {
        assert_eq!(
            resolve_output_path(Path::new("README.md"), OutputFormat::Html),
            PathBuf::from("README.html")
        );
        assert_eq!(
            resolve_output_path(Path::new("README.md"), OutputFormat::Json),
            PathBuf::from("README.json")
        );
        assert_eq!(
            resolve_output_path(Path::new("out/report.html"), OutputFormat::Html),
            PathBuf::from("out/report.html")
        );
    }

    #[test]
    fn test_resolve_section_output() {
        assert_eq!(
            resolve_section_output(Path::new("docs/README.md"), "main", 0, OutputFormat::Html),
            PathBuf::from("docs/README-main.html")
        );
        assert_eq!(
            resolve_section_output(Path::new("README.md"), "", 2, OutputFormat::Json),
            PathBuf::from("README-section2.json")
        );
    }

    #[test]
    fn test_settle_complete_report() {
        let stats = settle_analysis("app:1", Ok(report(vec![], vec!["docker"])), false).unwrap();
        assert_eq!(stats.os, "linux");
    }

    #[test]
    fn test_settle_failure_is_fatal_by_default() {
        let err = settle_analysis(
            "app:1",
            Ok(report(vec![failure("grype")], vec!["docker"])),
            false,
        )
        .unwrap_err();
        assert!(err.to_string().contains("analysis failed"));
        assert!(err.to_string().contains("grype"));
    }

    #[test]
    fn test_settle_failure_ignored() {
        let stats = settle_analysis(
            "app:1",
            Ok(report(vec![failure("grype")], vec!["docker"])),
            true,
        )
        .unwrap();
        assert_eq!(stats.os, "linux");
    }

    #[test]
    fn test_settle_nothing_ran() {
        let err = settle_analysis("app:1", Ok(report(vec![], vec![])), false).unwrap_err();
        assert!(err.to_string().contains("no analysis tools available"));
        assert!(settle_analysis("app:1", Ok(report(vec![], vec![])), true).is_ok());
    }

    #[test]
    fn test_settle_aggregator_error() {
        let err = settle_analysis("", Err(AnalysisError::EmptyImageTag), false).unwrap_err();
        assert!(err.to_string().contains("image tag is required"));

        let stats = settle_analysis("x", Err(AnalysisError::EmptyImageTag), true).unwrap();
        assert_eq!(stats.image_tag, "x");
    }
}
