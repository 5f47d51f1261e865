//! Findings as they leave the engine
//!
//! A code is the emitting rule's name joined to a code fragment derived from
//! the offending feature (see [`crate::message::error_code`]). Users regrade
//! findings by code, so fragments must stay stable across releases.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `Rule.code`, e.g. `RemovedHashAlgorithms.salsa10Removed`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DiagnosticCode {
    pub rule: String,
    pub code: String,
}

impl DiagnosticCode {
    pub fn new(rule: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            rule: rule.into(),
            code: code.into(),
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.rule, self.code)
    }
}

impl FromStr for DiagnosticCode {
    type Err = String;

    /// Splits at the first dot; fragments never contain one
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (rule, code) = value
            .split_once('.')
            .filter(|(rule, code)| !rule.is_empty() && !code.is_empty())
            .ok_or_else(|| format!("invalid diagnostic code '{value}', expected Rule.code"))?;
        Ok(Self::new(rule, code))
    }
}

impl TryFrom<String> for DiagnosticCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DiagnosticCode> for String {
    fn from(code: DiagnosticCode) -> Self {
        code.to_string()
    }
}

/// Ordered from least to most severe
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Only reachable through a config override
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn from_is_error(is_error: bool) -> Self {
        if is_error { Self::Error } else { Self::Warn }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a finding points. Line and column are 1-based; a file-level
/// problem (unreadable, untokenizable) has neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub file: String,
    pub line: Option<usize>,
    pub column: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
            column: None,
        }
    }

    pub fn with_position(file: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            line: Some(line),
            column: Some(column),
            ..Self::new(file)
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, self.column) {
            (Some(line), Some(column)) => write!(f, "{}:{line}:{column}", self.file),
            (Some(line), None) => write!(f, "{}:{line}", self.file),
            _ => f.write_str(&self.file),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,

    /// Template with every placeholder substituted
    pub message: String,

    pub location: Option<Location>,

    /// The substituted values, in placeholder order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<String>,
}

impl Diagnostic {
    pub fn new(code: DiagnosticCode, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            code,
            severity,
            message: message.into(),
            location: None,
            data: Vec::new(),
        }
    }

    pub fn with_location(self, location: Location) -> Self {
        Self {
            location: Some(location),
            ..self
        }
    }

    pub fn with_data(self, data: Vec<String>) -> Self {
        Self { data, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn code_round_trips_through_its_string_form() {
        let code: DiagnosticCode = "NewFunctions.str_containsFound".parse().unwrap();
        assert_eq!(code, DiagnosticCode::new("NewFunctions", "str_containsFound"));
        assert_eq!(code.to_string(), "NewFunctions.str_containsFound");
    }

    #[test]
    fn malformed_codes_are_rejected() {
        for raw in ["nodot", ".salsa10Removed", "RemovedHashAlgorithms."] {
            assert!(raw.parse::<DiagnosticCode>().is_err(), "{raw}");
        }
    }

    #[test]
    fn severity_orders_by_weight() {
        assert_eq!(Severity::from_is_error(true), Severity::Error);
        assert_eq!(Severity::from_is_error(false), Severity::Warn);
        assert!(Severity::Info < Severity::Warn && Severity::Warn < Severity::Error);
    }

    #[test]
    fn diagnostic_json_shape() {
        let diag = Diagnostic::new(
            DiagnosticCode::new("RemovedFunctions", "eregDeprecatedRemoved"),
            Severity::Error,
            "Function ereg() is deprecated since PHP 5.3 and removed since PHP 7.0",
        )
        .with_location(Location::with_position("src/legacy.php", 42, 5));

        let value = serde_json::to_value(&diag).unwrap();
        assert_eq!(value["code"], "RemovedFunctions.eregDeprecatedRemoved");
        assert_eq!(value["severity"], "error");
        assert_eq!(value["location"]["line"], 42);
        assert!(value.get("data").is_none());

        let back: Diagnostic = serde_json::from_value(value).unwrap();
        assert_eq!(back, diag);
    }

    #[test]
    fn location_display_drops_missing_parts() {
        assert_eq!(Location::with_position("a.php", 3, 7).to_string(), "a.php:3:7");
        assert_eq!(Location::new("a.php").to_string(), "a.php");
    }
}
