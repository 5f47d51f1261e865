use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::hash_algorithm;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_hash_algorithms.json");

#[derive(Debug)]
pub struct NewHashAlgorithms {
    table: FeatureTable,
}

impl Rule for NewHashAlgorithms {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewHashAlgorithms",
            description: "Detects hash algorithms that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_hash_algorithms", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let Some((_, argument, algorithm)) = hash_algorithm(ctx.stream(), index) else {
            return;
        };
        if let Some(entry) = self.table.get(&algorithm) {
            check_feature(self, ctx, argument.start, entry, &Item::named(&algorithm));
        }
    }
}

impl VersionedFeature for NewHashAlgorithms {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The %s hash algorithm is not present in PHP version %s or earlier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn literal_algorithms() {
        let findings = findings_for::<NewHashAlgorithms>("<?php hash_hmac('SHA3-256', $data, $key);", "7.0");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "sha3_256Found");
        assert_eq!(
            findings[0].message(),
            "The sha3-256 hash algorithm is not present in PHP version 7.0 or earlier"
        );
    }

    #[test]
    fn other_functions_are_ignored() {
        assert!(findings_for::<NewHashAlgorithms>("<?php md5('sha3-256');", "7.0").is_empty());
    }
}
