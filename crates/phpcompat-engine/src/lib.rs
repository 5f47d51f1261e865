//! phpcompat engine - version compatibility rules
//!
//! This crate holds everything that decides whether code is compatible with
//! a target PHP version range:
//! - Feature tables loaded from embedded JSON
//! - The shared version engine used by table-driven rules
//! - The rule catalogue and its token-kind dispatch table
//! - The checker that walks a token stream once

pub mod checker;
pub mod emit;
pub mod feature;
pub mod registry;
pub mod rule;
pub mod rules;
pub mod versioned;

pub use checker::{CheckError, Checker};
pub use emit::{Collector, Finding, Reporter};
pub use feature::{FeatureEntry, FeatureTable, KeyCase, ParameterTable, TableError};
pub use registry::{AnyRule, Registry};
pub use rule::{Family, Rule, RuleContext, RuleMeta};
pub use versioned::{assess, check_feature, Checkpoints, Item, Verdict, VersionedFeature};

#[cfg(test)]
pub(crate) mod test_support {
    use crate::emit::Finding;
    use crate::rule::{Rule, RuleContext};
    use phpcompat_core::{TargetRange, Version, VersionGate};
    use phpcompat_tokens::{Lexer, TokenStream};

    fn gate(range: &str) -> VersionGate {
        if range.is_empty() {
            VersionGate::default()
        } else {
            VersionGate::new(TargetRange::parse(range).unwrap())
        }
    }

    fn run<R: Rule>(stream: &TokenStream, range: &str) -> Vec<Finding> {
        let rule = R::build().unwrap();
        let gate = gate(range);
        let mut findings: Vec<Finding> = Vec::new();

        for (index, token) in stream.iter().enumerate() {
            if R::targets().contains(&token.kind) {
                let mut ctx = RuleContext::new(R::meta().name, stream, &gate, &mut findings);
                rule.check(&mut ctx, index);
            }
        }

        findings
    }

    /// Run a single rule over `source` with the target range `range`
    pub fn findings_for<R: Rule>(source: &str, range: &str) -> Vec<Finding> {
        run::<R>(&Lexer::new(source).tokenize().unwrap(), range)
    }

    /// Same, tokenizing as an older parser would
    pub fn findings_with_parser<R: Rule>(source: &str, range: &str, parser: Version) -> Vec<Finding> {
        let stream = Lexer::new(source).with_parser_version(parser).tokenize().unwrap();
        run::<R>(&stream, range)
    }
}
