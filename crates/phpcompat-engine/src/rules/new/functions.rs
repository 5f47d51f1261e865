use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_functions.json");

/// Calls to global functions that older versions lack
#[derive(Debug)]
pub struct NewFunctions {
    table: FeatureTable,
}

impl Rule for NewFunctions {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewFunctions",
            description: "Detects calls to functions that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_functions", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        if called_function(stream, index).is_none() {
            return;
        }

        let name = &stream[index].text;
        if let Some(entry) = self.table.get(name) {
            check_feature(self, ctx, index, entry, &Item::named(name));
        }
    }
}

impl VersionedFeature for NewFunctions {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The function %s() is not present in PHP version %s or earlier"
    }
}
