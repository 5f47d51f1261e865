use crate::feature::{ParameterTable, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{check_feature, Checkpoints, Item, Verdict, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/optional_to_required_parameters.json");

/// Calls omitting a parameter that stopped being optional.
///
/// Reuses the withdrawn checkpoints: `false` marks the version in which
/// leaving the argument out was deprecated, `true` the one where it became
/// mandatory.
#[derive(Debug)]
pub struct OptionalToRequiredFunctionParameters {
    table: ParameterTable,
}

impl Rule for OptionalToRequiredFunctionParameters {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "OptionalToRequiredFunctionParameters",
            description: "Detects function calls omitting parameters that are required in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: ParameterTable::from_json("optional_to_required_parameters", TABLE)?,
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

        let arguments = stream.call_arguments(index);
        if arguments
            .iter()
            .any(|argument| stream[argument.start].kind == TokenKind::Ellipsis)
        {
            return;
        }

        for (_, entry) in parameters.range(arguments.len() + 1..) {
            let name = entry.display_name();
            let item = Item::new(
                vec![name.to_string(), stream[index].text.clone()],
                &format!("{function}_{name}"),
            );
            check_feature(self, ctx, index, entry, &item);
        }
    }
}

impl VersionedFeature for OptionalToRequiredFunctionParameters {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "The \"%s\" parameter for function %s() is missing. Passing this parameter is no longer optional. The optional nature of the parameter is "
    }

    fn code(&self, verdict: &Verdict, item: &Item) -> String {
        let hard = matches!(verdict, Verdict::Withdrawn { removed: Some(_), .. });
        if hard {
            format!("{}HardRequired", item.code)
        } else {
            format!("{}SoftRequired", item.code)
        }
    }
}
