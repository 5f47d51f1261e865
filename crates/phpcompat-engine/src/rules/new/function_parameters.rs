use crate::feature::{ParameterTable, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_function_parameters.json");

/// Arguments passed for parameters that older versions do not accept
#[derive(Debug)]
pub struct NewFunctionParameters {
    table: ParameterTable,
}

impl Rule for NewFunctionParameters {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewFunctionParameters",
            description: "Detects function calls passing parameters that were added in later PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: ParameterTable::from_json("new_function_parameters", TABLE)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        let Some(function) = called_function(stream, index) else {
            return;
        };
        let Some(parameters) = self.table.get(&function) else {
            return;
        };

        let supplied = stream.argument_count(index);
        for (_, entry) in parameters.range(..=supplied) {
            let name = entry.display_name();
            let item = Item::new(
                vec![stream[index].text.clone(), name.to_string()],
                &format!("{function}_{name}"),
            );
            check_feature(self, ctx, index, entry, &item);
        }
    }
}

impl VersionedFeature for NewFunctionParameters {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The function %s() does not have a parameter \"%s\" in PHP version %s or earlier"
    }
}
