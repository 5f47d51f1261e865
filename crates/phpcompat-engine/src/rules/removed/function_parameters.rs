use crate::feature::{ParameterTable, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/removed_function_parameters.json");

/// Arguments passed for parameters that were deprecated or dropped
#[derive(Debug)]
pub struct RemovedFunctionParameters {
    table: ParameterTable,
}

impl Rule for RemovedFunctionParameters {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedFunctionParameters",
            description: "Detects function calls passing parameters that are deprecated or removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: ParameterTable::from_json("removed_function_parameters", TABLE)?,
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
                vec![name.to_string(), stream[index].text.clone()],
                &format!("{function}_{name}"),
            );
            check_feature(self, ctx, index, entry, &item);
        }
    }
}

impl VersionedFeature for RemovedFunctionParameters {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "The \"%s\" parameter for function %s() is "
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn passing_a_removed_parameter() {
        let findings = findings_for::<RemovedFunctionParameters>("<?php mktime(0, 0, 0, 1, 1, 2000, 1);", "5.0-7.0");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "mktime_is_dstDeprecatedRemoved");
        assert_eq!(
            findings[0].message(),
            "The \"is_dst\" parameter for function mktime() is deprecated since PHP 5.1 and removed since PHP 7.0"
        );
        assert!(findings[0].is_error);
    }

    #[test]
    fn omitted_parameters_are_fine() {
        assert!(findings_for::<RemovedFunctionParameters>("<?php mktime(0, 0, 0, 1, 1, 2000);", "7.0").is_empty());
        assert!(findings_for::<RemovedFunctionParameters>("<?php define('A', 1);", "8.0").is_empty());
    }

    #[test]
    fn deprecated_parameter_warns() {
        let findings = findings_for::<RemovedFunctionParameters>("<?php define('A', 1, true);", "7.3");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "define_case_insensitiveDeprecated");
        assert!(!findings[0].is_error);
    }
}
