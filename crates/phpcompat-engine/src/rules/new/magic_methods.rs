use crate::feature::{FeatureEntry, FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{check_feature, Checkpoints, Item, Verdict, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_magic_methods.json");

/// Methods declared with names that only became magic later
#[derive(Debug)]
pub struct NewMagicMethods {
    table: FeatureTable,
}

impl Rule for NewMagicMethods {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewMagicMethods",
            description: "Detects magic methods whose magic behaviour is missing in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Function]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_magic_methods", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        if !stream.is_in_oo_body(index) {
            return;
        }
        let Some(name_index) = stream.declaration_name(index) else {
            return;
        };

        let name = &stream[name_index].text;
        if let Some(entry) = self.table.get(name) {
            let item = Item::new(vec![name.clone()], &format!("{name}Method"));
            check_feature(self, ctx, name_index, entry, &item);
        }
    }
}

impl VersionedFeature for NewMagicMethods {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The method %s() was not magical in PHP version %s and earlier. The associated magic functionality will not be invoked."
    }

    fn filter_message(&self, message: String, entry: &FeatureEntry, _item: &Item) -> String {
        entry.metadata("message").map(str::to_string).unwrap_or(message)
    }

    fn is_error(&self, _verdict: &Verdict, _item: &Item) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn methods_warn() {
        let findings = findings_for::<NewMagicMethods>("<?php class A { public function __invoke() {} }", "5.2");
        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_error);
        assert_eq!(findings[0].code, "__invokemethodFound");
        assert_eq!(
            findings[0].message(),
            "The method __invoke() was not magical in PHP version 5.2 and earlier. The associated magic functionality will not be invoked."
        );
    }

    #[test]
    fn per_entry_message_override() {
        let findings = findings_for::<NewMagicMethods>("<?php class A { function __toString() {} }", "5.1");
        assert!(findings[0].message().starts_with("The method __toString() was not truly magical in PHP version 5.1"));
    }

    #[test]
    fn global_functions_are_ignored() {
        assert!(findings_for::<NewMagicMethods>("<?php function __invoke() {}", "5.0").is_empty());
    }
}
