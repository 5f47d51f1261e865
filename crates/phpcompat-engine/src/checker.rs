//! Runs the registered rules over a token stream

use crate::emit::{Collector, Reporter};
use crate::feature::TableError;
use crate::registry::Registry;
use crate::rule::RuleContext;
use phpcompat_core::{Config, ConfigError, Diagnostic, SeverityThreshold, TargetRangeCache, VersionGate};
use phpcompat_tokens::{LexError, Lexer, TokenStream};
use tracing::debug;

/// Errors raised while setting up or running a check
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("Failed to tokenize {file}: {source}")]
    Lex {
        file: String,
        #[source]
        source: LexError,
    },

    #[error(transparent)]
    Table(#[from] TableError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Walks every token once, dispatching to the rules registered for its kind
#[derive(Debug)]
pub struct Checker {
    registry: Registry,
    severity: SeverityThreshold,
    ranges: TargetRangeCache,
}

impl Checker {
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            severity: SeverityThreshold::default(),
            ranges: TargetRangeCache::new(),
        }
    }

    /// Registry and severity overrides from a loaded configuration
    pub fn from_config(config: &Config) -> Result<Self, CheckError> {
        let registry = Registry::new(&config.rules)?;
        Ok(Self::new(registry).with_severity(config.severity.clone()))
    }

    pub fn with_severity(mut self, severity: SeverityThreshold) -> Self {
        self.severity = severity;
        self
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Gate for a raw target-version string, parsed once per distinct string
    pub fn gate(&self, test_version: &str) -> Result<VersionGate, ConfigError> {
        self.ranges.resolve(test_version).map(VersionGate::new)
    }

    pub fn ranges(&self) -> &TargetRangeCache {
        &self.ranges
    }

    /// Check one file's stream, producing located diagnostics
    pub fn check(&self, stream: &TokenStream, file: &str, gate: &VersionGate) -> Vec<Diagnostic> {
        let mut collector = Collector::new(file, &self.severity);
        self.run(stream, gate, &mut collector);

        let diagnostics = collector.into_diagnostics();
        debug!(file, tokens = stream.len(), findings = diagnostics.len(), "Checked file");
        diagnostics
    }

    /// Tokenize `source` and check it
    pub fn check_source(&self, source: &str, file: &str, gate: &VersionGate) -> Result<Vec<Diagnostic>, CheckError> {
        let stream = Lexer::new(source).tokenize().map_err(|source| CheckError::Lex {
            file: file.to_string(),
            source,
        })?;
        Ok(self.check(&stream, file, gate))
    }

    /// Feed raw findings to `reporter`
    pub fn run(&self, stream: &TokenStream, gate: &VersionGate, reporter: &mut dyn Reporter) {
        for (index, token) in stream.iter().enumerate() {
            for rule in self.registry.rules_for(token.kind) {
                let mut ctx = RuleContext::new(rule.name(), stream, gate, &mut *reporter);
                rule.check(&mut ctx, index);
            }
        }
    }
}
