use crate::feature::{FeatureEntry, FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{
    check_feature, with_alternative_data, with_alternative_message, Checkpoints, Item, VersionedFeature,
};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/removed_type_casts.json");

/// The `(unset)` and `(real)` casts
#[derive(Debug)]
pub struct RemovedTypeCasts {
    table: FeatureTable,
}

impl Rule for RemovedTypeCasts {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedTypeCasts",
            description: "Detects type casts that are deprecated or removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::UnsetCast, TokenKind::DoubleCast]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("removed_type_casts", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let token = &ctx.stream()[index];
        let cast = token
            .text
            .trim_matches(|c: char| c == '(' || c == ')' || c.is_ascii_whitespace())
            .to_ascii_lowercase();

        let key = match (token.kind, cast.as_str()) {
            (TokenKind::UnsetCast, _) => "unset",
            (TokenKind::DoubleCast, "real") => "real",
            _ => return,
        };

        if let Some(entry) = self.table.get(key) {
            let description = entry.metadata("description").unwrap_or(key);
            let item = Item::new(vec![description.to_string()], key);
            check_feature(self, ctx, index, entry, &item);
        }
    }
}

impl VersionedFeature for RemovedTypeCasts {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "%s is "
    }

    fn filter_message(&self, message: String, entry: &FeatureEntry, _item: &Item) -> String {
        with_alternative_message(message, entry)
    }

    fn filter_data(&self, data: Vec<String>, entry: &FeatureEntry, _item: &Item) -> Vec<String> {
        with_alternative_data(data, entry)
    }
}
