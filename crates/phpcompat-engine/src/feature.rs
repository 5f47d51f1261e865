//! Feature entries and feature tables
//!
//! Tables are embedded JSON objects keyed by feature name. Each entry maps
//! version strings to booleans (the checkpoints) next to a few string
//! metadata keys:
//!
//! ```json
//! { "ereg": { "5.3": false, "7.0": true, "alternative": "preg_match()" } }
//! ```
//!
//! Parameter tables nest one level deeper: function name, then 1-based
//! parameter position, then an entry whose `name` metadata is the parameter
//! name. Keys are normalised once while loading and never change afterwards.

use phpcompat_core::Version;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Errors raised while loading an embedded feature table
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TableError {
    #[error("Failed to parse feature table '{table}': {message}")]
    Parse { table: String, message: String },

    #[error("Feature '{feature}' in table '{table}' is not an object")]
    NotAnObject { table: String, feature: String },

    #[error("Feature '{feature}' in table '{table}' has key '{key}' which is neither metadata nor a version")]
    InvalidKey {
        table: String,
        feature: String,
        key: String,
    },

    #[error("Feature '{feature}' in table '{table}' has a non-boolean value for version {version}")]
    InvalidCheckpoint {
        table: String,
        feature: String,
        version: String,
    },

    #[error("Feature '{feature}' in table '{table}' has non-string metadata '{key}'")]
    InvalidMetadata {
        table: String,
        feature: String,
        key: String,
    },

    #[error("Function '{feature}' in table '{table}' has parameter position '{position}', expected a positive integer")]
    InvalidPosition {
        table: String,
        feature: String,
        position: String,
    },
}

/// How feature names are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCase {
    /// Symbol names (functions, classes, INI directives, algorithms)
    Insensitive,

    /// Variable names
    Sensitive,
}

impl KeyCase {
    fn normalise(self, key: &str) -> String {
        match self {
            KeyCase::Insensitive => key.to_ascii_lowercase(),
            KeyCase::Sensitive => key.to_string(),
        }
    }
}

/// One feature: ordered version checkpoints plus metadata
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeatureEntry {
    /// Name as written in the table
    pub name: String,

    /// Version checkpoints, ascending
    checkpoints: Vec<(Version, bool)>,

    metadata: BTreeMap<String, String>,
}

impl FeatureEntry {
    /// Build an entry by hand; checkpoints are sorted ascending.
    pub fn new(name: impl Into<String>, checkpoints: impl IntoIterator<Item = (Version, bool)>) -> Self {
        let mut checkpoints: Vec<_> = checkpoints.into_iter().collect();
        checkpoints.sort_by_key(|(version, _)| *version);
        Self {
            name: name.into(),
            checkpoints,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn checkpoints(&self) -> &[(Version, bool)] {
        &self.checkpoints
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Suggested replacement, if any
    pub fn alternative(&self) -> Option<&str> {
        self.metadata("alternative").filter(|alt| !alt.is_empty())
    }

    /// Metadata `name`, falling back to the table key
    pub fn display_name(&self) -> &str {
        self.metadata("name").unwrap_or(&self.name)
    }

    fn from_json(table: &str, feature: &str, value: &Value, metadata_keys: &[&str]) -> Result<Self, TableError> {
        let object = value.as_object().ok_or_else(|| TableError::NotAnObject {
            table: table.to_string(),
            feature: feature.to_string(),
        })?;

        let mut entry = FeatureEntry::new(feature, std::iter::empty());

        for (key, value) in object {
            if metadata_keys.contains(&key.as_str()) {
                let text = value.as_str().ok_or_else(|| TableError::InvalidMetadata {
                    table: table.to_string(),
                    feature: feature.to_string(),
                    key: key.clone(),
                })?;
                entry.metadata.insert(key.clone(), text.to_string());
                continue;
            }

            let version: Version = key.parse().map_err(|_| TableError::InvalidKey {
                table: table.to_string(),
                feature: feature.to_string(),
                key: key.clone(),
            })?;
            let flag = value.as_bool().ok_or_else(|| TableError::InvalidCheckpoint {
                table: table.to_string(),
                feature: feature.to_string(),
                version: key.clone(),
            })?;
            entry.checkpoints.push((version, flag));
        }

        entry.checkpoints.sort_by_key(|(version, _)| *version);
        Ok(entry)
    }
}

/// Metadata keys every table accepts
pub const METADATA_KEYS: &[&str] = &["alternative", "name", "description", "message"];

fn parse_object(table: &str, json: &str) -> Result<Map<String, Value>, TableError> {
    let value: Value = serde_json::from_str(json).map_err(|e| TableError::Parse {
        table: table.to_string(),
        message: e.to_string(),
    })?;

    match value {
        Value::Object(map) => Ok(map),
        _ => Err(TableError::Parse {
            table: table.to_string(),
            message: "top level must be an object".to_string(),
        }),
    }
}

/// Immutable name → entry lookup
#[derive(Debug, Clone)]
pub struct FeatureTable {
    name: &'static str,
    case: KeyCase,
    entries: HashMap<String, FeatureEntry>,
}

impl FeatureTable {
    /// Load a flat table from JSON
    pub fn from_json(name: &'static str, json: &str, case: KeyCase) -> Result<Self, TableError> {
        Self::from_json_with_metadata(name, json, case, METADATA_KEYS)
    }

    /// Load a flat table, treating `metadata_keys` as non-version keys
    pub fn from_json_with_metadata(
        name: &'static str,
        json: &str,
        case: KeyCase,
        metadata_keys: &[&str],
    ) -> Result<Self, TableError> {
        let mut entries = HashMap::new();
        for (feature, value) in parse_object(name, json)? {
            let entry = FeatureEntry::from_json(name, &feature, &value, metadata_keys)?;
            entries.insert(case.normalise(&feature), entry);
        }

        Ok(Self { name, case, entries })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn get(&self, feature: &str) -> Option<&FeatureEntry> {
        self.entries.get(&self.case.normalise(feature))
    }

    pub fn contains(&self, feature: &str) -> bool {
        self.get(feature).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeatureEntry> {
        self.entries.values()
    }
}

/// Function name → parameter position → entry
#[derive(Debug, Clone)]
pub struct ParameterTable {
    name: &'static str,
    functions: HashMap<String, BTreeMap<usize, FeatureEntry>>,
}

impl ParameterTable {
    pub fn from_json(name: &'static str, json: &str) -> Result<Self, TableError> {
        let mut functions = HashMap::new();

        for (function, positions) in parse_object(name, json)? {
            let positions = positions.as_object().ok_or_else(|| TableError::NotAnObject {
                table: name.to_string(),
                feature: function.clone(),
            })?;

            let mut parameters = BTreeMap::new();
            for (position, value) in positions {
                let index = position
                    .parse::<usize>()
                    .ok()
                    .filter(|&p| p > 0)
                    .ok_or_else(|| TableError::InvalidPosition {
                        table: name.to_string(),
                        feature: function.clone(),
                        position: position.clone(),
                    })?;
                let entry = FeatureEntry::from_json(name, &function, value, METADATA_KEYS)?;
                parameters.insert(index, entry);
            }

            functions.insert(function.to_ascii_lowercase(), parameters);
        }

        Ok(Self { name, functions })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Parameters of `function` (case-insensitive), ordered by position
    pub fn get(&self, function: &str) -> Option<&BTreeMap<usize, FeatureEntry>> {
        self.functions.get(&function.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}
