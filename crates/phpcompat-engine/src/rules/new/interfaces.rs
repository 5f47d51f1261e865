use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::global_class_name;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::{Scan, TokenKind};

const TABLE: &str = include_str!("../../../data/new_interfaces.json");

/// Built-in interfaces implemented (or extended) by user code
#[derive(Debug)]
pub struct NewInterfaces {
    table: FeatureTable,
}

impl Rule for NewInterfaces {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewInterfaces",
            description: "Detects implementing built-in interfaces that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Class, TokenKind::AnonClass, TokenKind::Enum, TokenKind::Interface]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_interfaces", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        let Some(opener) = stream[index].scope_opener else {
            return;
        };

        let clause_kind = match stream[index].kind {
            TokenKind::Interface => TokenKind::Extends,
            _ => TokenKind::Implements,
        };
        let Some(clause) = stream.find_next(&[clause_kind], index + 1, Some(opener), Scan::SkipNested) else {
            return;
        };

        let mut from = clause;
        while let Some(start) = stream.next_non_empty(from).filter(|&s| s < opener) {
            if let Some((name_index, name)) = global_class_name(stream, start) {
                if let Some(entry) = self.table.get(&name) {
                    check_feature(self, ctx, name_index, entry, &Item::named(&name));
                }
            }

            match stream.find_next(&[TokenKind::Comma], start, Some(opener), Scan::Flat) {
                Some(comma) => from = comma,
                None => break,
            }
        }
    }
}

impl VersionedFeature for NewInterfaces {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The built-in interface %s is not present in PHP version %s or earlier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn implements_lists() {
        let source = "<?php class Money implements JsonSerializable, Countable, \\Stringable {}";
        let findings = findings_for::<NewInterfaces>(source, "5.3-");

        let codes: Vec<_> = findings.iter().map(|f| f.code.as_str()).collect();
        assert_eq!(codes, vec!["jsonserializableFound", "stringableFound"]);
        assert_eq!(
            findings[0].message(),
            "The built-in interface JsonSerializable is not present in PHP version 5.3 or earlier"
        );
    }

    #[test]
    fn anonymous_classes_and_interfaces() {
        let source = "<?php $x = new class($a) implements Throwable {}; interface Shape extends Stringable {}";
        assert_eq!(findings_for::<NewInterfaces>(source, "5.6").len(), 2);
    }

    #[test]
    fn plain_classes_are_ignored() {
        assert!(findings_for::<NewInterfaces>("<?php class A extends B {}", "5.0").is_empty());
    }
}
