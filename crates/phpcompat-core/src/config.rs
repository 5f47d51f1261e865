//! `phpcompat.toml` loading
//!
//! ```toml
//! test_version = "5.6-7.4"
//!
//! [severity.overrides]
//! "NewFunctions.intdivFound" = "warn"
//!
//! [rules]
//! disabled = ["NewShortArray"]
//!
//! [allowlist]
//! skip_paths = ["vendor/**", "*.tpl.php"]
//! ```

use crate::diagnostic::{DiagnosticCode, Severity};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Per-code severity regrading, keyed by `Rule.code`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SeverityThreshold {
    #[serde(default)]
    pub overrides: BTreeMap<String, Severity>,
}

impl SeverityThreshold {
    /// The configured severity for `code`, falling back to what the rule chose
    pub fn get_severity(&self, code: &DiagnosticCode, emitted: Severity) -> Severity {
        match self.overrides.get(&code.to_string()) {
            Some(&severity) => severity,
            None => emitted,
        }
    }

    pub fn set_override(&mut self, code: &DiagnosticCode, severity: Severity) {
        self.overrides.insert(code.to_string(), severity);
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RuleSelection {
    /// Rules left out of the registry
    #[serde(default)]
    pub disabled: Vec<String>,
}

impl RuleSelection {
    pub fn is_enabled(&self, rule: &str) -> bool {
        self.disabled.iter().all(|name| name != rule)
    }
}

/// Paths the scanner never opens.
///
/// Patterns are matched against `/`-separated paths. `**` spans directories,
/// `*` and `?` stay inside one segment. A pattern without wildcards matches
/// the path itself and everything beneath it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AllowlistRules {
    #[serde(default)]
    pub skip_paths: Vec<String>,
}

impl AllowlistRules {
    pub fn is_path_skipped(&self, path: &str) -> bool {
        self.skip_paths.iter().any(|pattern| glob_match(pattern, path))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// `5.6`, `5.6-7.4`, `-7.0` or `7.0-`; unset leaves every rule inert
    #[serde(default)]
    pub test_version: Option<String>,

    #[serde(default)]
    pub severity: SeverityThreshold,

    #[serde(default)]
    pub rules: RuleSelection,

    #[serde(default)]
    pub allowlist: AllowlistRules,

    /// Directory holding the config file, or the working directory
    #[serde(skip)]
    pub project_root: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            test_version: None,
            severity: SeverityThreshold::default(),
            rules: RuleSelection::default(),
            allowlist: AllowlistRules::default(),
            project_root: std::env::current_dir().unwrap_or_default(),
        }
    }
}

impl Config {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut config = Self::from_toml(&contents)?;
        config.project_root = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => config.project_root,
        };

        debug!(path = %path.display(), test_version = config.test_version(), "Loaded config");
        Ok(config)
    }

    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// The raw target string, empty when unset
    pub fn test_version(&self) -> &str {
        self.test_version.as_deref().unwrap_or_default()
    }
}

fn glob_match(pattern: &str, path: &str) -> bool {
    if !pattern.contains(['*', '?']) {
        let prefix = pattern.trim_end_matches('/');
        return path == prefix || path.strip_prefix(prefix).is_some_and(|rest| rest.starts_with('/'));
    }

    match glob_regex(pattern) {
        Ok(regex) => regex.is_match(path),
        Err(_) => false,
    }
}

fn glob_regex(pattern: &str) -> Result<Regex, regex::Error> {
    let mut source = String::from("^");
    let mut chars = pattern.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                // `**/` also matches zero directories
                if chars.peek() == Some(&'/') {
                    chars.next();
                    source.push_str("(?:.*/)?");
                } else {
                    source.push_str(".*");
                }
            }
            '*' => source.push_str("[^/]*"),
            '?' => source.push_str("[^/]"),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }

    source.push('$');
    Regex::new(&source)
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("Cannot read {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("Invalid config: {0}")]
    Parse(String),

    #[error("Invalid test version '{value}': expected X.Y, X.Y-A.B, -A.B or X.Y-")]
    InvalidTestVersion { value: String },

    #[error("Invalid test version range: minimum {min} is greater than maximum {max}")]
    InvertedRange { min: String, max: String },
}
