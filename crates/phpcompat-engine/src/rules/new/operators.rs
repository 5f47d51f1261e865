use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_operators.json");

#[derive(Debug)]
pub struct NewOperators {
    table: FeatureTable,
}

impl Rule for NewOperators {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewOperators",
            description: "Detects operators that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[
            TokenKind::Pow,
            TokenKind::PowEqual,
            TokenKind::Ellipsis,
            TokenKind::Spaceship,
            TokenKind::Coalesce,
            TokenKind::CoalesceEqual,
            TokenKind::NullsafeObjectOperator,
        ]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_operators", TABLE, KeyCase::Sensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let kind = ctx.stream()[index].kind;
        let Some(entry) = self.table.get(kind.name()) else {
            return;
        };

        let description = entry.metadata("description").unwrap_or(kind.name());
        let item = Item::new(vec![description.to_string()], kind.name());
        check_feature(self, ctx, index, entry, &item);
    }
}

impl VersionedFeature for NewOperators {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "%s is not present in PHP version %s or earlier"
    }
}
