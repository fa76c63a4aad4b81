//! The markdown built-ins: default, minimal, detailed and compact.

use crate::badges::image_badges;
use crate::templates::Template;
use crate::{ComparedImage, RenderOptions};
use analysis::{ImageStats, Severity};
use dockerfile::{DocItem, Documentation, ItemType};
use std::fmt::{self, Write};

const SUMMARY_SEVERITIES: [Severity; 4] = [
    Severity::Critical,
    Severity::High,
    Severity::Medium,
    Severity::Low,
];

pub fn render_image(
    doc: &Documentation,
    stats: Option<&ImageStats>,
    options: &RenderOptions,
    template: Template,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    match template {
        Template::Minimal => {
            items_table(&mut out, doc)?;
            if let Some(stats) = stats {
                writeln!(out)?;
                image_summary_line(&mut out, stats)?;
            }
        }
        Template::Compact => {
            items_list(&mut out, doc, options)?;
            if let Some(stats) = stats {
                writeln!(out)?;
                image_summary_row(&mut out, stats)?;
            }
        }
        Template::Detailed => {
            configuration(&mut out, doc, options)?;
            if let Some(stats) = stats {
                writeln!(out)?;
                image_analysis(&mut out, stats, options, true)?;
            }
        }
        _ => {
            configuration(&mut out, doc, options)?;
            if let Some(stats) = stats {
                writeln!(out)?;
                image_analysis(&mut out, stats, options, false)?;
            }
        }
    }
    Ok(out)
}

pub fn render_comparison(
    images: &[ComparedImage],
    options: &RenderOptions,
    template: Template,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "## Image Comparison")?;
    writeln!(out)?;
    if images.is_empty() {
        writeln!(out, "*No images to compare.*")?;
        return Ok(out);
    }

    match template {
        Template::Minimal | Template::Compact => {
            writeln!(out, "| Image | Size | Layers | Vulnerabilities |")?;
            writeln!(out, "|-------|------|--------|-----------------|")?;
            for image in images {
                writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    image_label(image),
                    image.stats.size_mb(),
                    image.stats.total_layers,
                    vulnerability_total(&image.stats),
                )?;
            }
        }
        _ => {
            write!(out, "| Image | Size | Layers | Platform | Efficiency |")?;
            for severity in SUMMARY_SEVERITIES {
                write!(out, " {} |", severity_label(&severity.to_string(), options))?;
            }
            writeln!(out, " Packages |")?;
            writeln!(
                out,
                "|-------|------|--------|----------|------------|{}----------|",
                "---|".repeat(SUMMARY_SEVERITIES.len())
            )?;
            for image in images {
                let stats = &image.stats;
                write!(
                    out,
                    "| {} | {} | {} | {} | {} |",
                    image_label(image),
                    stats.size_mb(),
                    stats.total_layers,
                    platform(stats),
                    efficiency(stats),
                )?;
                for severity in SUMMARY_SEVERITIES {
                    write!(out, " {} |", stats.severity_count(severity))?;
                }
                writeln!(out, " {} |", stats.total_packages)?;
            }

            if template == Template::Detailed {
                writeln!(out)?;
                writeln!(out, "### Supported Platforms")?;
                writeln!(out)?;
                writeln!(out, "| Image | Distro | Platforms |")?;
                writeln!(out, "|-------|--------|-----------|")?;
                for image in images {
                    writeln!(
                        out,
                        "| {} | {} | {} |",
                        image_label(image),
                        cell(&image.stats.os_distro),
                        platforms(&image.stats),
                    )?;
                }
            }
        }
    }
    Ok(out)
}

fn configuration(out: &mut String, doc: &Documentation, options: &RenderOptions) -> fmt::Result {
    writeln!(out, "## Configuration")?;
    if doc.is_empty() {
        writeln!(out)?;
        writeln!(out, "*No documented instructions found.*")?;
        return Ok(());
    }

    for item_type in ItemType::ALL {
        let items = doc.filter_by_type(item_type);
        if items.is_empty() {
            continue;
        }
        writeln!(out)?;
        writeln!(out, "### {}", item_type.heading())?;
        writeln!(out)?;
        if item_type == ItemType::Expose {
            writeln!(out, "| Port | Description |")?;
            writeln!(out, "|------|-------------|")?;
            for item in items {
                writeln!(out, "| {} | {} |", code(&item.name), cell(&item.description))?;
            }
        } else {
            writeln!(out, "| Name | Description | Default | Required |")?;
            writeln!(out, "|------|-------------|---------|----------|")?;
            for item in items {
                writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    code(&item.name),
                    cell(&item.description),
                    value(item),
                    required_mark(item.required, options),
                )?;
            }
        }
    }
    Ok(())
}

fn items_table(out: &mut String, doc: &Documentation) -> fmt::Result {
    writeln!(out, "| Name | Type | Description | Default |")?;
    writeln!(out, "|------|------|-------------|---------|")?;
    for item in &doc.items {
        writeln!(
            out,
            "| {} | {} | {} | {} |",
            code(&item.name),
            item.item_type,
            cell(&item.description),
            value(item),
        )?;
    }
    Ok(())
}

fn items_list(out: &mut String, doc: &Documentation, options: &RenderOptions) -> fmt::Result {
    if doc.is_empty() {
        return writeln!(out, "*No documented instructions found.*");
    }
    for item in &doc.items {
        write!(out, "- {} ({})", code(&item.name), item.item_type)?;
        if !item.description.is_empty() {
            write!(out, ": {}", single_line(&item.description))?;
        }
        if !item.value.is_empty() && item.item_type != ItemType::Expose {
            write!(out, " Default: {}.", code(&item.value))?;
        }
        if item.required {
            let marker = if options.no_moji { "(required)" } else { "✅" };
            write!(out, " {marker}")?;
        }
        writeln!(out)?;
    }
    Ok(())
}

fn image_summary_line(out: &mut String, stats: &ImageStats) -> fmt::Result {
    writeln!(
        out,
        "**Image:** {} | Size: {} | Layers: {} | Vulnerabilities: {}",
        code(&stats.image_tag),
        stats.size_mb(),
        stats.total_layers,
        vulnerability_total(stats),
    )
}

fn image_summary_row(out: &mut String, stats: &ImageStats) -> fmt::Result {
    writeln!(out, "| Image | Size | Layers | Efficiency | Vulnerabilities |")?;
    writeln!(out, "|-------|------|--------|------------|-----------------|")?;
    writeln!(
        out,
        "| {} | {} | {} | {} | {} |",
        code(&stats.image_tag),
        stats.size_mb(),
        stats.total_layers,
        efficiency(stats),
        vulnerability_total(stats),
    )
}

fn image_analysis(
    out: &mut String,
    stats: &ImageStats,
    options: &RenderOptions,
    detailed: bool,
) -> fmt::Result {
    writeln!(out, "## Image Analysis ({})", stats.image_tag)?;
    writeln!(out)?;

    if let Some(base_url) = options.badge_base_url.as_deref() {
        let badges: Vec<String> = image_badges(stats)
            .iter()
            .map(|badge| badge.markdown(base_url))
            .collect();
        if !badges.is_empty() {
            writeln!(out, "{}", badges.join(" "))?;
            writeln!(out)?;
        }
    }

    writeln!(out, "| Metric | Value |")?;
    writeln!(out, "|--------|-------|")?;
    writeln!(out, "| Size | {} |", stats.size_mb())?;
    writeln!(out, "| Architecture | {} |", platform(stats))?;
    if !stats.os_distro.is_empty() {
        writeln!(out, "| Distro | {} |", cell(&stats.os_distro))?;
    }
    if !stats.supported_architectures.is_empty() {
        writeln!(out, "| Platforms | {} |", platforms(stats))?;
    }
    if stats.efficiency_score > 0.0 {
        writeln!(
            out,
            "| Efficiency | {} ({} wasted) |",
            efficiency(stats),
            stats.wasted_mb()
        )?;
    }
    writeln!(out, "| Total Layers | {} |", stats.total_layers)?;
    if detailed {
        if let Some(scanned) = stats.scan_timestamp {
            writeln!(out, "| Scanned | {} |", scanned.format("%Y-%m-%d %H:%M:%S UTC"))?;
        }
    }

    writeln!(out)?;
    writeln!(out, "### Security Summary")?;
    writeln!(out)?;
    if !stats.has_vulnerability_data() {
        writeln!(out, "*Vulnerability scan not available.*")?;
    } else if detailed {
        writeln!(out, "| Severity | Count |")?;
        writeln!(out, "|----------|-------|")?;
        for (severity, count) in severity_breakdown(stats) {
            writeln!(out, "| {} | {} |", severity_label(&severity, options), count)?;
        }
    } else {
        let parts: Vec<String> = SUMMARY_SEVERITIES
            .iter()
            .map(|severity| {
                format!(
                    "{}: {}",
                    severity_label(&severity.to_string(), options),
                    stats.severity_count(*severity)
                )
            })
            .collect();
        writeln!(out, "{}", parts.join(" | "))?;
    }

    if !stats.vulnerabilities.is_empty() {
        writeln!(out)?;
        writeln!(out, "{}", if detailed { "<details open>" } else { "<details>" })?;
        writeln!(
            out,
            "<summary>Vulnerabilities ({} found)</summary>",
            stats.vulnerabilities.len()
        )?;
        writeln!(out)?;
        writeln!(out, "| ID | Severity | Package | Version |")?;
        writeln!(out, "|----|----------|---------|---------|")?;
        for vuln in &stats.vulnerabilities {
            writeln!(
                out,
                "| {} | {} | {} | {} |",
                cell(&vuln.id),
                severity_label(&vuln.severity, options),
                cell(&vuln.package),
                cell(&vuln.version),
            )?;
        }
        writeln!(out)?;
        writeln!(out, "</details>")?;
    }

    writeln!(out)?;
    if stats.packages.is_empty() {
        writeln!(out, "*No packages detected.*")?;
    } else {
        writeln!(out, "<details>")?;
        writeln!(
            out,
            "<summary>Packages ({} total)</summary>",
            stats.total_packages.max(stats.packages.len())
        )?;
        writeln!(out)?;
        writeln!(out, "| Package | Version |")?;
        writeln!(out, "|---------|---------|")?;
        for package in &stats.packages {
            writeln!(out, "| {} | {} |", cell(&package.name), cell(&package.version))?;
        }
        writeln!(out)?;
        writeln!(out, "</details>")?;
    }
    Ok(())
}

/// Severity tokens ordered by rank, then name. Tokens outside the known set
/// are listed as reported.
fn severity_breakdown(stats: &ImageStats) -> Vec<(String, usize)> {
    let mut rows: Vec<(String, usize)> = stats
        .vuln_summary
        .iter()
        .map(|(severity, count)| (severity.clone(), *count))
        .collect();
    rows.sort_by(|a, b| {
        Severity::from_token(&b.0)
            .rank()
            .cmp(&Severity::from_token(&a.0).rank())
            .then_with(|| a.0.cmp(&b.0))
    });
    rows
}

pub(crate) fn severity_emoji(severity: &str) -> &'static str {
    match Severity::from_token(severity) {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
        Severity::Unknown => "⚪",
    }
}

fn severity_label(severity: &str, options: &RenderOptions) -> String {
    if options.no_moji {
        severity.to_string()
    } else {
        format!("{} {}", severity_emoji(severity), severity)
    }
}

fn required_mark(required: bool, options: &RenderOptions) -> &'static str {
    match (required, options.no_moji) {
        (true, false) => "✅",
        (false, false) => "❌",
        (true, true) => "Yes",
        (false, true) => "No",
    }
}

fn image_label(image: &ComparedImage) -> String {
    if image.label == image.stats.image_tag || image.label.is_empty() {
        code(&image.stats.image_tag)
    } else {
        format!("{} ({})", cell(&image.label), code(&image.stats.image_tag))
    }
}

fn vulnerability_total(stats: &ImageStats) -> String {
    if !stats.has_vulnerability_data() {
        return "-".to_string();
    }
    let total: usize = stats.vuln_summary.values().sum();
    format!(
        "{} ({} critical, {} high)",
        total,
        stats.severity_count(Severity::Critical),
        stats.severity_count(Severity::High)
    )
}

fn platform(stats: &ImageStats) -> String {
    match (stats.os.as_str(), stats.architecture.as_str()) {
        ("", "") => "-".to_string(),
        (os, "") => os.to_string(),
        ("", arch) => arch.to_string(),
        (os, arch) => format!("{os}/{arch}"),
    }
}

fn platforms(stats: &ImageStats) -> String {
    if stats.supported_architectures.is_empty() {
        return "-".to_string();
    }
    stats
        .supported_architectures
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn efficiency(stats: &ImageStats) -> String {
    if stats.efficiency_score > 0.0 {
        format!("{:.1}%", stats.efficiency_score)
    } else {
        "-".to_string()
    }
}

fn value(item: &DocItem) -> String {
    if item.value.is_empty() {
        String::new()
    } else {
        code(&item.value)
    }
}

fn code(text: &str) -> String {
    format!("`{}`", cell(text))
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Makes text safe inside a table cell.
fn cell(text: &str) -> String {
    single_line(text).replace('|', "\\|")
}
