use crate::feature::{FeatureEntry, FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::called_function;
use crate::versioned::{
    check_feature, with_alternative_data, with_alternative_message, Checkpoints, Item, VersionedFeature,
};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/removed_functions.json");

/// Calls to global functions that were deprecated or removed
#[derive(Debug)]
pub struct RemovedFunctions {
    table: FeatureTable,
}

impl Rule for RemovedFunctions {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedFunctions",
            description: "Detects calls to functions that are deprecated or removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("removed_functions", TABLE, KeyCase::Insensitive)?,
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

impl VersionedFeature for RemovedFunctions {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "Function %s() is "
    }

    fn filter_message(&self, message: String, entry: &FeatureEntry, _item: &Item) -> String {
        with_alternative_message(message, entry)
    }

    fn filter_data(&self, data: Vec<String>, entry: &FeatureEntry, _item: &Item) -> Vec<String> {
        with_alternative_data(data, entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn deprecated_and_removed_with_alternative() {
        let findings = findings_for::<RemovedFunctions>("<?php if (ereg('^a', $s)) {}", "5.3-7.0");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "eregDeprecatedRemoved");
        assert!(findings[0].is_error);
        assert_eq!(
            findings[0].message(),
            "Function ereg() is deprecated since PHP 5.3 and removed since PHP 7.0; Use preg_match() instead"
        );
    }

    #[test]
    fn deprecation_only_warns() {
        let findings = findings_for::<RemovedFunctions>("<?php $s = utf8_encode($s);", "7.4-8.2");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "utf8_encodeDeprecated");
        assert!(!findings[0].is_error);
    }

    #[test]
    fn removal_without_deprecation() {
        let findings = findings_for::<RemovedFunctions>("<?php echo php_logo_guid();", "5.4-");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "php_logo_guidRemoved");
        assert_eq!(findings[0].message(), "Function php_logo_guid() is removed since PHP 5.5");
    }

    #[test]
    fn ranges_below_the_deprecation_are_silent() {
        assert!(findings_for::<RemovedFunctions>("<?php each($list);", "5.6-7.1").is_empty());
    }

    #[test]
    fn methods_and_declarations_are_ignored() {
        let source = "<?php $db->mysql_connect(); Legacy::split('a'); function each() {}";
        assert!(findings_for::<RemovedFunctions>(source, "7.0").is_empty());
    }
}
