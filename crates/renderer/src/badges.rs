//! Shields-style badges (`<base>/<label>-<message>-<color>`).

use analysis::{ImageStats, Severity};

pub struct Badge {
    pub label: String,
    pub message: String,
    pub color: &'static str,
}

impl Badge {
    fn new(label: &str, message: impl Into<String>, color: &'static str) -> Self {
        Self {
            label: label.to_string(),
            message: message.into(),
            color,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        format!(
            "{}/{}-{}-{}",
            base_url.trim_end_matches('/'),
            escape(&self.label),
            escape(&self.message),
            self.color
        )
    }

    pub fn markdown(&self, base_url: &str) -> String {
        format!("![{}]({})", self.label, self.url(base_url))
    }
}

/// Badges for the headline numbers of an image. Metrics no tool supplied are
/// left out.
pub fn image_badges(stats: &ImageStats) -> Vec<Badge> {
    let mut badges = Vec::new();
    if stats.size_bytes > 0 {
        badges.push(Badge::new("size", stats.size_mb(), "blue"));
    }
    if stats.total_layers > 0 {
        badges.push(Badge::new("layers", stats.total_layers.to_string(), "blue"));
    }
    if stats.efficiency_score > 0.0 {
        let color = match stats.efficiency_score {
            s if s >= 90.0 => "brightgreen",
            s if s >= 70.0 => "yellow",
            _ => "red",
        };
        badges.push(Badge::new(
            "efficiency",
            format!("{:.1}%", stats.efficiency_score),
            color,
        ));
    }
    if stats.has_vulnerability_data() {
        let critical = stats.severity_count(Severity::Critical);
        let high = stats.severity_count(Severity::High);
        let (message, color) = match (critical, high) {
            (0, 0) if stats.vulnerabilities.is_empty() => ("none".to_string(), "brightgreen"),
            (0, 0) => (format!("{} found", stats.vulnerabilities.len()), "yellow"),
            (0, h) => (format!("{h} high"), "orange"),
            (c, h) => (format!("{c} critical, {h} high"), "red"),
        };
        badges.push(Badge::new("vulnerabilities", message, color));
    }
    badges
}

/// Shields path segment: dashes and underscores doubled, spaces become
/// underscores, then the segment is percent-encoded.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '-' => out.push_str("--"),
            '_' => out.push_str("__"),
            ' ' => out.push('_'),
            other => out.push(other),
        }
    }
    urlencoding::encode(&out).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_badge_url_escaping() {
        let badge = Badge::new("image size", "12.50 MB", "blue");
        assert_eq!(
            badge.url("https://img.shields.io/badge/"),
            "https://img.shields.io/badge/image_size-12.50_MB-blue"
        );

        let badge = Badge::new("os", "linux/arm-v7", "blue");
        assert_eq!(badge.url("http://b"), "http://b/os-linux%2Farm--v7-blue");
    }

    #[test]
    fn test_badge_markdown_is_link_safe() {
        let badge = Badge::new("distro", "debian (bookworm) é&x", "blue");
        assert_eq!(
            badge.markdown("https://img.shields.io/badge"),
            "![distro](https://img.shields.io/badge/distro-debian_%28bookworm%29_%C3%A9%26x-blue)"
        );

        let badge = Badge::new("tag", "v1.0_rc#2?", "blue");
        assert_eq!(badge.url("http://b"), "http://b/tag-v1.0__rc%232%3F-blue");
    }

    #[test]
    fn test_lowercase_severities_count_in_badge() {
        let stats = ImageStats {
            vuln_summary: BTreeMap::from([("critical".to_string(), 2), ("HIGH".to_string(), 1)]),
            ..Default::default()
        };
        let badges = image_badges(&stats);
        assert_eq!(badges[0].message, "2 critical, 1 high");
        assert_eq!(badges[0].color, "red");
    }

    #[test]
    fn test_image_badges() {
        let stats = ImageStats {
            size_bytes: 1024 * 1024,
            total_layers: 3,
            efficiency_score: 75.0,
            vuln_summary: BTreeMap::from([("Critical".to_string(), 1), ("High".to_string(), 2)]),
            ..Default::default()
        };

        let badges = image_badges(&stats);
        let labels: Vec<&str> = badges.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["size", "layers", "efficiency", "vulnerabilities"]);
        assert_eq!(badges[2].color, "yellow");
        assert_eq!(badges[3].message, "1 critical, 2 high");
        assert_eq!(badges[3].color, "red");
    }

    #[test]
    fn test_no_badges_without_data() {
        assert!(image_badges(&ImageStats::new("x")).is_empty());
    }
}
