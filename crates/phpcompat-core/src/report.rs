//! `report.json`
//!
//! Consumers key on `schema_version`; bump it when a field changes meaning
//! or disappears. New optional fields do not need a bump.

use crate::diagnostic::{Diagnostic, Severity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const SCHEMA_VERSION: u32 = 1;

/// Counts over one run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub files_checked: usize,

    /// Files with at least one diagnostic
    pub files_with_findings: usize,

    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
}

impl ReportSummary {
    fn count(&mut self, severity: Severity) {
        let bucket = match severity {
            Severity::Error => &mut self.errors,
            Severity::Warn => &mut self.warnings,
            Severity::Info => &mut self.info,
        };
        *bucket += 1;
        self.total += 1;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub schema_version: u32,

    /// RFC 3339, UTC
    pub generated_at: String,

    /// The range string the run was checked against, when one was set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_version: Option<String>,

    pub summary: ReportSummary,

    /// In file order, then stream order within a file
    pub diagnostics: Vec<Diagnostic>,

    #[serde(skip)]
    pending_file_findings: bool,
}

impl Report {
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            generated_at: chrono::Utc::now().to_rfc3339(),
            test_version: None,
            summary: ReportSummary::default(),
            diagnostics: Vec::new(),
            pending_file_findings: false,
        }
    }

    pub fn from_diagnostics(diagnostics: impl IntoIterator<Item = Diagnostic>) -> Self {
        let mut report = Self::new();
        diagnostics.into_iter().for_each(|d| report.add_diagnostic(d));
        report
    }

    pub fn with_test_version(mut self, test_version: impl Into<String>) -> Self {
        self.test_version = Some(test_version.into());
        self
    }

    /// Add a finding for the file currently being checked
    pub fn add_diagnostic(&mut self, diagnostic: Diagnostic) {
        self.summary.count(diagnostic.severity);
        self.pending_file_findings = true;
        self.diagnostics.push(diagnostic);
    }

    /// Close the current file. Findings added since the previous call count
    /// towards it.
    pub fn record_file(&mut self) {
        self.summary.files_checked += 1;
        if std::mem::take(&mut self.pending_file_findings) {
            self.summary.files_with_findings += 1;
        }
    }

    pub fn has_errors(&self) -> bool {
        self.summary.errors > 0
    }

    /// Diagnostics grouped by file, files in path order. Diagnostics
    /// without a location are grouped under the empty path.
    pub fn by_file(&self) -> BTreeMap<&str, Vec<&Diagnostic>> {
        let mut grouped: BTreeMap<&str, Vec<&Diagnostic>> = BTreeMap::new();
        for diagnostic in &self.diagnostics {
            let file = diagnostic.location.as_ref().map_or("", |l| l.file.as_str());
            grouped.entry(file).or_default().push(diagnostic);
        }
        grouped
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn save_to_file(&self, path: &Path) -> std::io::Result<()> {
        let json = self.to_json().map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

impl Default for Report {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostic::{DiagnosticCode, Location};
    use pretty_assertions::assert_eq;

    fn finding(file: &str, code: &str, severity: Severity) -> Diagnostic {
        Diagnostic::new(DiagnosticCode::new("RemovedFunctions", code), severity, code)
            .with_location(Location::with_position(file, 1, 1))
    }

    #[test]
    fn fresh_report_is_clean() {
        let report = Report::new();
        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.summary, ReportSummary::default());
        assert!(!report.has_errors());
    }

    #[test]
    fn files_with_findings_follow_record_file() {
        let mut report = Report::new().with_test_version("5.6");

        report.add_diagnostic(finding("a.php", "eachDeprecated", Severity::Warn));
        report.add_diagnostic(finding("a.php", "eregRemoved", Severity::Error));
        report.record_file();
        report.record_file();
        report.add_diagnostic(finding("c.php", "splitRemoved", Severity::Error));
        report.record_file();

        assert_eq!(
            report.summary,
            ReportSummary {
                files_checked: 3,
                files_with_findings: 2,
                total: 3,
                errors: 2,
                warnings: 1,
                info: 0,
            }
        );
        assert!(report.has_errors());
    }

    #[test]
    fn groups_by_file_in_path_order() {
        let report = Report::from_diagnostics([
            finding("src/b.php", "eregRemoved", Severity::Error),
            finding("src/a.php", "eachDeprecated", Severity::Warn),
            finding("src/b.php", "splitRemoved", Severity::Error),
        ]);

        let grouped = report.by_file();
        let files: Vec<&str> = grouped.keys().copied().collect();
        assert_eq!(files, vec!["src/a.php", "src/b.php"]);
        assert_eq!(grouped["src/b.php"].len(), 2);
    }

    #[test]
    fn json_reads_back() {
        let mut report = Report::from_diagnostics([finding("a.php", "eregRemoved", Severity::Error)]);
        report.record_file();

        let json = report.to_json().unwrap();
        assert!(json.contains("\"schema_version\": 1"));
        assert!(!json.contains("test_version"));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert_eq!(back.summary, report.summary);
        assert_eq!(back.diagnostics, report.diagnostics);
    }
}
