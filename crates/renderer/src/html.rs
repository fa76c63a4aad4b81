//! The `html` built-in: a standalone page.

use crate::badges::image_badges;
use crate::markdown::severity_emoji;
use crate::{ComparedImage, RenderOptions};
use analysis::{ImageStats, Severity};
use dockerfile::{Documentation, ItemType};
use std::fmt::{self, Write};

const STYLE: &str = "body{font-family:-apple-system,BlinkMacSystemFont,\"Segoe UI\",Helvetica,Arial,sans-serif;margin:2rem auto;max-width:960px;color:#1f2328;padding:0 1rem}\
table{border-collapse:collapse;width:100%;margin:1rem 0}\
th,td{border:1px solid #d0d7de;padding:6px 12px;text-align:left}\
th{background:#f6f8fa}\
code{background:#eff1f3;padding:0 4px;border-radius:4px}\
.badges img{margin-right:4px}\
.muted{color:#59636e}";

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
) -> Result<String, fmt::Error> {
    let title = match stats {
        Some(stats) => format!("Docker Image Documentation: {}", stats.image_tag),
        None => "Docker Image Documentation".to_string(),
    };

    let mut out = String::new();
    open_page(&mut out, &title)?;

    writeln!(out, "<h2>Configuration</h2>")?;
    if doc.is_empty() {
        writeln!(out, "<p class=\"muted\">No documented instructions found.</p>")?;
    }
    for item_type in ItemType::ALL {
        let items = doc.filter_by_type(item_type);
        if items.is_empty() {
            continue;
        }
        writeln!(out, "<h3>{}</h3>", item_type.heading())?;
        writeln!(out, "<table>")?;
        if item_type == ItemType::Expose {
            writeln!(out, "<tr><th>Port</th><th>Description</th></tr>")?;
            for item in items {
                writeln!(
                    out,
                    "<tr><td><code>{}</code></td><td>{}</td></tr>",
                    escape(&item.name),
                    escape(&item.description)
                )?;
            }
        } else {
            writeln!(
                out,
                "<tr><th>Name</th><th>Description</th><th>Default</th><th>Required</th></tr>"
            )?;
            for item in items {
                let value = if item.value.is_empty() {
                    String::new()
                } else {
                    format!("<code>{}</code>", escape(&item.value))
                };
                writeln!(
                    out,
                    "<tr><td><code>{}</code></td><td>{}</td><td>{}</td><td>{}</td></tr>",
                    escape(&item.name),
                    escape(&item.description),
                    value,
                    if item.required { "Yes" } else { "No" }
                )?;
            }
        }
        writeln!(out, "</table>")?;
    }

    if let Some(stats) = stats {
        image_analysis(&mut out, stats, options)?;
    }

    close_page(&mut out)?;
    Ok(out)
}

pub fn render_comparison(
    images: &[ComparedImage],
    options: &RenderOptions,
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    open_page(&mut out, "Docker Image Comparison")?;

    writeln!(out, "<table>")?;
    write!(
        out,
        "<tr><th>Image</th><th>Size</th><th>Layers</th><th>Platform</th><th>Efficiency</th>"
    )?;
    for severity in SUMMARY_SEVERITIES {
        write!(out, "<th>{}</th>", severity_heading(&severity.to_string(), options))?;
    }
    writeln!(out, "<th>Packages</th></tr>")?;

    for image in images {
        let stats = &image.stats;
        write!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td>",
            escape(if image.label.is_empty() {
                &stats.image_tag
            } else {
                &image.label
            }),
            stats.size_mb(),
            stats.total_layers,
            escape(&format!("{}/{}", stats.os, stats.architecture)),
            efficiency(stats),
        )?;
        for severity in SUMMARY_SEVERITIES {
            write!(out, "<td>{}</td>", stats.severity_count(severity))?;
        }
        writeln!(out, "<td>{}</td></tr>", stats.total_packages)?;
    }
    writeln!(out, "</table>")?;

    close_page(&mut out)?;
    Ok(out)
}

fn image_analysis(out: &mut String, stats: &ImageStats, options: &RenderOptions) -> fmt::Result {
    writeln!(
        out,
        "<h2>Image Analysis (<code>{}</code>)</h2>",
        escape(&stats.image_tag)
    )?;

    if let Some(base_url) = options.badge_base_url.as_deref() {
        let badges = image_badges(stats);
        if !badges.is_empty() {
            write!(out, "<p class=\"badges\">")?;
            for badge in badges {
                write!(
                    out,
                    "<img alt=\"{}\" src=\"{}\">",
                    escape(&badge.label),
                    escape(&badge.url(base_url))
                )?;
            }
            writeln!(out, "</p>")?;
        }
    }

    writeln!(out, "<table>")?;
    writeln!(out, "<tr><th>Metric</th><th>Value</th></tr>")?;
    metric(out, "Size", &stats.size_mb())?;
    metric(
        out,
        "Architecture",
        &format!("{}/{}", stats.os, stats.architecture),
    )?;
    if !stats.os_distro.is_empty() {
        metric(out, "Distro", &stats.os_distro)?;
    }
    if !stats.supported_architectures.is_empty() {
        let platforms: Vec<&str> = stats
            .supported_architectures
            .iter()
            .map(String::as_str)
            .collect();
        metric(out, "Platforms", &platforms.join(", "))?;
    }
    if stats.efficiency_score > 0.0 {
        metric(
            out,
            "Efficiency",
            &format!("{} ({} wasted)", efficiency(stats), stats.wasted_mb()),
        )?;
    }
    metric(out, "Total Layers", &stats.total_layers.to_string())?;
    writeln!(out, "</table>")?;

    writeln!(out, "<h3>Security Summary</h3>")?;
    if stats.has_vulnerability_data() {
        let parts: Vec<String> = SUMMARY_SEVERITIES
            .iter()
            .map(|severity| {
                format!(
                    "{}: {}",
                    severity_heading(&severity.to_string(), options),
                    stats.severity_count(*severity)
                )
            })
            .collect();
        writeln!(out, "<p>{}</p>", parts.join(" | "))?;
    } else {
        writeln!(out, "<p class=\"muted\">Vulnerability scan not available.</p>")?;
    }

    if !stats.vulnerabilities.is_empty() {
        writeln!(
            out,
            "<details><summary>Vulnerabilities ({} found)</summary>",
            stats.vulnerabilities.len()
        )?;
        writeln!(out, "<table>")?;
        writeln!(
            out,
            "<tr><th>ID</th><th>Severity</th><th>Package</th><th>Version</th></tr>"
        )?;
        for vuln in &stats.vulnerabilities {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&vuln.id),
                severity_heading(&vuln.severity, options),
                escape(&vuln.package),
                escape(&vuln.version)
            )?;
        }
        writeln!(out, "</table></details>")?;
    }

    if !stats.packages.is_empty() {
        writeln!(
            out,
            "<details><summary>Packages ({} total)</summary>",
            stats.total_packages.max(stats.packages.len())
        )?;
        writeln!(out, "<table>")?;
        writeln!(out, "<tr><th>Package</th><th>Version</th></tr>")?;
        for package in &stats.packages {
            writeln!(
                out,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape(&package.name),
                escape(&package.version)
            )?;
        }
        writeln!(out, "</table></details>")?;
    }
    Ok(())
}

fn open_page(out: &mut String, title: &str) -> fmt::Result {
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>{}</title>", escape(title))?;
    writeln!(out, "<style>{STYLE}</style>")?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>{}</h1>", escape(title))
}

fn close_page(out: &mut String) -> fmt::Result {
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

fn metric(out: &mut String, name: &str, value: &str) -> fmt::Result {
    writeln!(out, "<tr><td>{}</td><td>{}</td></tr>", name, escape(value))
}

fn severity_heading(severity: &str, options: &RenderOptions) -> String {
    if options.no_moji {
        escape(severity)
    } else {
        format!("{} {}", severity_emoji(severity), escape(severity))
    }
}

fn efficiency(stats: &ImageStats) -> String {
    if stats.efficiency_score > 0.0 {
        format!("{:.1}%", stats.efficiency_score)
    } else {
        "-".to_string()
    }
}

pub(crate) fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(
            escape("<script>alert('x') & \"y\"</script>"),
            "&lt;script&gt;alert(&#39;x&#39;) &amp; &quot;y&quot;&lt;/script&gt;"
        );
    }
}
