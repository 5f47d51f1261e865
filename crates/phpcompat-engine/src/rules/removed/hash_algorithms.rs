use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::hash_algorithm;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/removed_hash_algorithms.json");

#[derive(Debug)]
pub struct RemovedHashAlgorithms {
    table: FeatureTable,
}

impl Rule for RemovedHashAlgorithms {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedHashAlgorithms",
            description: "Detects hash algorithms that are removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("removed_hash_algorithms", TABLE, KeyCase::Insensitive)?,
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

impl VersionedFeature for RemovedHashAlgorithms {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "The %s hash algorithm is "
    }
}
