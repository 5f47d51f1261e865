//! The rule trait and the per-token context rules run in

use crate::emit::{Finding, Reporter};
use crate::feature::TableError;
use phpcompat_core::VersionGate;
use phpcompat_tokens::{NumericEvaluator, TokenKind, TokenStream};

/// Which side of the target range a rule cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Features missing from older versions
    NewFeature,

    /// Features deprecated or removed in newer versions
    Removed,

    /// Single-version behaviour changes
    VersionSpecific,
}

impl Family {
    pub fn as_str(self) -> &'static str {
        match self {
            Family::NewFeature => "new feature",
            Family::Removed => "deprecated/removed",
            Family::VersionSpecific => "version specific",
        }
    }
}

/// Static description of a rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMeta {
    /// Stable name, used as the first part of every diagnostic code
    pub name: &'static str,
    pub description: &'static str,
    pub family: Family,
}

/// A compatibility check over the token stream.
///
/// Rules are built once (loading their tables) and then invoked for every
/// token whose kind is listed in [`Rule::targets`].
pub trait Rule {
    fn meta() -> &'static RuleMeta;

    fn targets() -> &'static [TokenKind];

    fn build() -> Result<Self, TableError>
    where
        Self: Sized;

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize);
}

/// What a rule sees while checking one token
pub struct RuleContext<'a> {
    rule: &'static str,
    stream: &'a TokenStream,
    gate: &'a VersionGate,
    reporter: &'a mut dyn Reporter,
}

impl<'a> RuleContext<'a> {
    pub fn new(
        rule: &'static str,
        stream: &'a TokenStream,
        gate: &'a VersionGate,
        reporter: &'a mut dyn Reporter,
    ) -> Self {
        Self {
            rule,
            stream,
            gate,
            reporter,
        }
    }

    pub fn rule(&self) -> &'static str {
        self.rule
    }

    pub fn stream(&self) -> &'a TokenStream {
        self.stream
    }

    pub fn gate(&self) -> &'a VersionGate {
        self.gate
    }

    pub fn evaluator(&self) -> NumericEvaluator<'a> {
        NumericEvaluator::new(self.stream, self.gate)
    }

    /// Hand a finding for the token at `index` to the reporter.
    ///
    /// `data` must line up with the `%s` placeholders of `template`.
    pub fn emit(
        &mut self,
        template: impl Into<String>,
        index: usize,
        is_error: bool,
        code: impl Into<String>,
        data: Vec<String>,
    ) {
        let (line, column) = self
            .stream
            .get(index)
            .map(|token| (token.line, token.column))
            .unwrap_or((0, 0));

        self.reporter.report(Finding {
            rule: self.rule,
            index,
            line,
            column,
            template: template.into(),
            is_error,
            code: code.into(),
            data,
        });
    }
}
