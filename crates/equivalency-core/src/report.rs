//! Report schema (stable v1)
//!
//! This schema is STABLE and VERSIONED.
//! Breaking changes require a new version.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::mismatch::Mismatch;

/// Report schema version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportVersion {
    /// Major version (breaking changes)
    pub major: u32,

    /// Minor version (backward-compatible additions)
    pub minor: u32,
}

impl ReportVersion {
    /// Current report schema version
    pub const CURRENT: ReportVersion = ReportVersion { major: 1, minor: 0 };
}

impl std::fmt::Display for ReportVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

/// Summary statistics for a report
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Whether the compared graphs are equivalent
    pub equivalent: bool,

    /// Total number of mismatches
    pub total: usize,

    /// Mismatch count per code
    pub by_code: BTreeMap<String, usize>,

    /// Number of nodes the comparison visited
    pub nodes_visited: usize,
}

/// Comparison report (report.json v1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalencyReport {
    /// Schema version
    pub version: ReportVersion,

    /// Timestamp (ISO 8601)
    pub timestamp: String,

    /// Summary statistics
    pub summary: ReportSummary,

    /// All mismatches, in discovery order
    pub mismatches: Vec<Mismatch>,

    /// Metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl EquivalencyReport {
    /// Create a report from the mismatches of one comparison
    pub fn from_mismatches(mismatches: Vec<Mismatch>, nodes_visited: usize) -> Self {
        let mut by_code = BTreeMap::new();
        for mismatch in &mismatches {
            *by_code.entry(mismatch.code.as_str().to_string()).or_insert(0) += 1;
        }

        let summary = ReportSummary {
            equivalent: mismatches.is_empty(),
            total: mismatches.len(),
            by_code,
            nodes_visited,
        };

        Self {
            version: ReportVersion::CURRENT,
            timestamp: chrono::Utc::now().to_rfc3339(),
            summary,
            mismatches,
            metadata: None,
        }
    }

    /// Attach metadata
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Whether the compared graphs are equivalent
    pub fn is_equivalent(&self) -> bool {
        self.summary.equivalent
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Save to file
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let json = self.to_json()
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
        std::fs::write(path, json)
    }
}
