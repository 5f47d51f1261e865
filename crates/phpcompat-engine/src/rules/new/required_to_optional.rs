use crate::feature::{ParameterTable, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/required_to_optional_parameters.json");

/// Omitted arguments for parameters that used to be required.
///
/// The last required checkpoint inside the range is reported, so the
/// message names the newest version that still needs the argument.
#[derive(Debug)]
pub struct RequiredToOptionalFunctionParameters {
    table: ParameterTable,
}

impl Rule for RequiredToOptionalFunctionParameters {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RequiredToOptionalFunctionParameters",
            description: "Detects missing arguments for parameters that are required in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: ParameterTable::from_json("required_to_optional_parameters", TABLE)?,
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

        // foo(...$args) may supply anything
        let arguments = stream.call_arguments(index);
        if arguments.iter().any(|a| stream[a.start].kind == TokenKind::Ellipsis) {
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

impl VersionedFeature for RequiredToOptionalFunctionParameters {
    const CHECKPOINTS: Checkpoints = Checkpoints::RequiredUntil;

    fn template(&self) -> &'static str {
        "The \"%s\" parameter for function %s() is missing, but was required for PHP version %s and lower"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_argument_cites_last_required_version() {
        let findings = findings_for::<RequiredToOptionalFunctionParameters>("<?php array_push($stack);", "7.0-");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "array_push_valuesMissing");
        assert_eq!(
            findings[0].message(),
            "The \"values\" parameter for function array_push() is missing, but was required for PHP version 7.2 and lower"
        );
    }

    #[test]
    fn supplied_or_unpacked_arguments_are_fine() {
        let source = "<?php array_push($stack, 1); array_merge(...$lists);";
        assert!(findings_for::<RequiredToOptionalFunctionParameters>(source, "5.6").is_empty());
    }

    #[test]
    fn silent_once_optional() {
        assert!(findings_for::<RequiredToOptionalFunctionParameters>("<?php array_merge();", "7.4").is_empty());
        assert_eq!(findings_for::<RequiredToOptionalFunctionParameters>("<?php array_merge();", "7.3").len(), 1);
    }
}
