//! Findings and the reporters that receive them

use phpcompat_core::{format_message, Diagnostic, DiagnosticCode, Location, Severity, SeverityThreshold};
use tracing::trace;

/// A rule's raw output: an unformatted template plus its data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Rule that emitted the finding
    pub rule: &'static str,

    /// Stream index of the offending token
    pub index: usize,

    pub line: usize,
    pub column: usize,

    /// Message template with `%s` placeholders
    pub template: String,

    pub is_error: bool,

    /// Code fragment, unique within the rule
    pub code: String,

    /// Placeholder values in template order
    pub data: Vec<String>,
}

impl Finding {
    pub fn diagnostic_code(&self) -> DiagnosticCode {
        DiagnosticCode::new(self.rule, self.code.clone())
    }

    pub fn message(&self) -> String {
        format_message(&self.template, &self.data)
    }
}

/// Receives findings as rules emit them
pub trait Reporter {
    fn report(&mut self, finding: Finding);
}

impl Reporter for Vec<Finding> {
    fn report(&mut self, finding: Finding) {
        self.push(finding);
    }
}

/// Turns findings into located diagnostics for one file
#[derive(Debug)]
pub struct Collector<'a> {
    file: String,
    severity: &'a SeverityThreshold,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Collector<'a> {
    pub fn new(file: impl Into<String>, severity: &'a SeverityThreshold) -> Self {
        Self {
            file: file.into(),
            severity,
            diagnostics: Vec::new(),
        }
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

impl Reporter for Collector<'_> {
    fn report(&mut self, finding: Finding) {
        let code = finding.diagnostic_code();
        let severity = self
            .severity
            .get_severity(&code, Severity::from_is_error(finding.is_error));
        let message = finding.message();

        trace!(code = %code, line = finding.line, column = finding.column, "{}", message);

        let diagnostic = Diagnostic::new(code, severity, message)
            .with_location(Location::with_position(&self.file, finding.line, finding.column))
            .with_data(finding.data);

        self.diagnostics.push(diagnostic);
    }
}
