//! phpcompat core
//!
//! Versions, target ranges, diagnostics, config and the report format.
//! Never change how diagnostic codes are derived - suppressions depend on them.

pub mod config;
pub mod diagnostic;
pub mod message;
pub mod report;
pub mod version;

pub use config::{AllowlistRules, Config, ConfigError, RuleSelection, SeverityThreshold};
pub use diagnostic::{Diagnostic, DiagnosticCode, Location, Severity};
pub use message::{error_code, format_message};
pub use report::{Report, ReportSummary, SCHEMA_VERSION};
pub use version::{TargetRange, TargetRangeCache, Version, VersionError, VersionGate};
