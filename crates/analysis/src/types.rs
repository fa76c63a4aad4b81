use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;
use strum::{Display, EnumString};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PackageSummary {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vulnerability {
    pub id: String,
    /// Severity token exactly as reported by the scanner.
    pub severity: String,
    pub package: String,
    pub version: String,
}

impl Vulnerability {
    pub fn rank(&self) -> u8 {
        Severity::from_token(&self.severity).rank()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(ascii_case_insensitive)]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    Unknown,
}

impl Severity {
    /// Anything that is not a known severity ranks as `Unknown`.
    pub fn from_token(token: &str) -> Self {
        Severity::from_str(token.trim()).unwrap_or(Severity::Unknown)
    }

    pub fn rank(&self) -> u8 {
        match self {
            Severity::Critical => 4,
            Severity::High => 3,
            Severity::Medium => 2,
            Severity::Low => 1,
            Severity::Unknown => 0,
        }
    }
}

/// Orders vulnerabilities by severity rank (highest first), then by id.
pub fn compare_vulnerabilities(a: &Vulnerability, b: &Vulnerability) -> Ordering {
    b.rank().cmp(&a.rank()).then_with(|| a.id.cmp(&b.id))
}

pub fn sort_vulnerabilities(vulnerabilities: &mut [Vulnerability]) {
    vulnerabilities.sort_by(compare_vulnerabilities);
}

/// Sorts packages by name and drops repeated `(name, version)` pairs.
pub fn dedupe_packages(packages: &mut Vec<PackageSummary>) {
    packages.sort();
    packages.dedup();
}

/// Consolidated analysis of one image.
///
/// Each field is optional in practice: it stays zero or empty until a tool
/// supplies it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageStats {
    pub image_tag: String,
    pub architecture: String,
    pub os: String,
    pub os_distro: String,
    pub size_bytes: u64,
    pub total_layers: usize,
    pub supported_architectures: BTreeSet<String>,
    /// Layer efficiency, 0 to 100.
    pub efficiency_score: f64,
    pub wasted_bytes: u64,
    pub total_packages: usize,
    pub packages: Vec<PackageSummary>,
    pub vulnerabilities: Vec<Vulnerability>,
    pub vuln_summary: BTreeMap<String, usize>,
    pub scan_timestamp: Option<DateTime<Utc>>,
}

impl ImageStats {
    pub fn new(image_tag: impl Into<String>) -> Self {
        Self {
            image_tag: image_tag.into(),
            ..Default::default()
        }
    }

    /// Folds a partial result into `self`.
    ///
    /// Scalars are overwritten by non-empty values, collections are appended
    /// and severity counts are added per key.
    pub fn merge(&mut self, partial: ImageStats) {
        if !partial.architecture.is_empty() {
            self.architecture = partial.architecture;
        }
        if !partial.os.is_empty() {
            self.os = partial.os;
        }
        if !partial.os_distro.is_empty() {
            self.os_distro = partial.os_distro;
        }
        if partial.size_bytes != 0 {
            self.size_bytes = partial.size_bytes;
        }
        if partial.total_layers != 0 {
            self.total_layers = partial.total_layers;
        }
        if partial.efficiency_score != 0.0 {
            self.efficiency_score = partial.efficiency_score;
        }
        if partial.wasted_bytes != 0 {
            self.wasted_bytes = partial.wasted_bytes;
        }
        if partial.total_packages != 0 {
            self.total_packages = partial.total_packages;
        }
        if partial.scan_timestamp.is_some() {
            self.scan_timestamp = partial.scan_timestamp;
        }

        self.supported_architectures
            .extend(partial.supported_architectures);
        self.packages.extend(partial.packages);
        self.vulnerabilities.extend(partial.vulnerabilities);
        for (severity, count) in partial.vuln_summary {
            *self.vuln_summary.entry(severity).or_insert(0) += count;
        }
    }

    /// Applies the deterministic ordering of the derived collections.
    pub fn finalize(&mut self) {
        dedupe_packages(&mut self.packages);
        sort_vulnerabilities(&mut self.vulnerabilities);
    }

    /// Count stored under the exact scanner token.
    pub fn vuln_count(&self, severity: &str) -> usize {
        self.vuln_summary.get(severity).copied().unwrap_or(0)
    }

    /// Count for a severity class, whatever case the scanner used.
    pub fn severity_count(&self, severity: Severity) -> usize {
        self.vuln_summary
            .iter()
            .filter(|(token, _)| Severity::from_token(token) == severity)
            .map(|(_, count)| count)
            .sum()
    }

    pub fn size_mb(&self) -> String {
        format_mb(self.size_bytes)
    }

    pub fn wasted_mb(&self) -> String {
        format_mb(self.wasted_bytes)
    }

    pub fn has_vulnerability_data(&self) -> bool {
        self.scan_timestamp.is_some() || !self.vuln_summary.is_empty()
    }
}

pub fn format_mb(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / BYTES_PER_MB)
}
