use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::{legacy_keyword, TokenKind, TokenStream};

const TABLE: &str = include_str!("../../../data/new_keywords.json");

/// Keywords, magic constants and syntax introduced in later versions.
///
/// Table keys are token names. Identifiers are translated through the legacy
/// keyword table first, so streams from older tokenizers are covered too.
#[derive(Debug)]
pub struct NewKeywords {
    table: FeatureTable,
}

impl NewKeywords {
    fn keyword_at(stream: &TokenStream, index: usize) -> Option<TokenKind> {
        let kind = stream.kind(index)?;
        if kind == TokenKind::Identifier {
            return legacy_keyword(stream, index);
        }
        Some(kind)
    }

    /// Whether the keyword at `index` is used in the role that was new
    fn applies(stream: &TokenStream, index: usize, kind: TokenKind) -> bool {
        match kind {
            // Class constants predate namespaced ones
            TokenKind::Const => !stream.is_in_oo_body(index),
            // Only the quoted form was new
            TokenKind::StartHeredoc => stream[index].text.contains('"'),
            _ => true,
        }
    }
}

impl Rule for NewKeywords {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewKeywords",
            description: "Detects keywords and magic constants that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[
            TokenKind::HaltCompiler,
            TokenKind::Const,
            TokenKind::Callable,
            TokenKind::Dir,
            TokenKind::Goto,
            TokenKind::Insteadof,
            TokenKind::Namespace,
            TokenKind::NsC,
            TokenKind::Use,
            TokenKind::StartNowdoc,
            TokenKind::StartHeredoc,
            TokenKind::Trait,
            TokenKind::TraitC,
            TokenKind::Yield,
            TokenKind::Finally,
            TokenKind::YieldFrom,
            TokenKind::Fn,
            TokenKind::Match,
            TokenKind::Enum,
            TokenKind::Readonly,
            TokenKind::Identifier,
        ]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_keywords", TABLE, KeyCase::Sensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        let Some(kind) = Self::keyword_at(stream, index) else {
            return;
        };
        let Some(entry) = self.table.get(kind.name()) else {
            return;
        };
        if !Self::applies(stream, index, kind) {
            return;
        }

        let description = entry.metadata("description").unwrap_or(kind.name());
        let code_base = kind.name().trim_start_matches("T_");
        let item = Item::new(vec![description.to_string()], code_base);
        check_feature(self, ctx, index, entry, &item);
    }
}

impl VersionedFeature for NewKeywords {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "%s is not present in PHP version %s or earlier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{findings_for, findings_with_parser};
    use phpcompat_core::Version;
    use pretty_assertions::assert_eq;

    fn codes(source: &str, range: &str) -> Vec<String> {
        findings_for::<NewKeywords>(source, range)
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    #[test]
    fn keyword_messages() {
        let findings = findings_for::<NewKeywords>("<?php trait Loggable {}", "5.3");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "traitFound");
        assert_eq!(findings[0].message(), "\"trait\" keyword is not present in PHP version 5.3 or earlier");
    }

    #[test]
    fn class_constants_are_not_new() {
        let source = "<?php const A = 1; class B { const C = 2; }";
        assert_eq!(codes(source, "5.2"), vec!["constFound"]);
    }

    #[test]
    fn only_quoted_heredoc_is_new() {
        let source = "<?php $a = <<<EOT\nx\nEOT;\n$b = <<<\"EOT\"\ny\nEOT;\n";
        assert_eq!(codes(source, "5.2"), vec!["start_heredocFound"]);
    }

    #[test]
    fn generators_and_magic_constants() {
        let source = "<?php function g() { yield from h(); yield 1; } echo __DIR__;";
        assert_eq!(codes(source, "5.2"), vec!["yield_fromFound", "yieldFound", "dirFound"]);
    }

    #[test]
    fn legacy_tokenizer_identifiers_are_translated() {
        let source = "<?php trait T {} try {} finally {} $o->trait; function finally() {}";
        let findings = findings_with_parser::<NewKeywords>(source, "5.3", Version::new(5, 2));
        let codes: Vec<_> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["traitFound", "finallyFound"]);
    }

    #[test]
    fn arrow_functions_and_match() {
        let source = "<?php $f = fn($x) => match($x) { 1 => 'a', default => 'b' };";
        assert_eq!(codes(source, "7.3"), vec!["fnFound", "matchFound"]);
        assert!(codes(source, "8.0").is_empty());
    }
}
