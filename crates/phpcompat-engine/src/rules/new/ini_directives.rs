use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::{called_function, literal_argument, INI_FUNCTIONS};
use crate::versioned::{check_feature, Checkpoints, Item, Verdict, VersionedFeature};
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/new_ini_directives.json");

/// INI directives read or written before they existed
#[derive(Debug)]
pub struct NewIniDirectives {
    table: FeatureTable,
}

/// One `ini_get()`/`ini_set()` call; reading an unknown directive only
/// returns `false`, so it warns
struct IniCall {
    getter: bool,
}

impl VersionedFeature for IniCall {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "INI directive '%s' is not present in PHP version %s or earlier"
    }

    fn is_error(&self, _verdict: &Verdict, _item: &Item) -> bool {
        !self.getter
    }
}

impl Rule for NewIniDirectives {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewIniDirectives",
            description: "Detects INI directives that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Identifier]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_ini_directives", TABLE, KeyCase::Insensitive)?,
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
        if !INI_FUNCTIONS.contains(&function.as_str()) {
            return;
        }

        let Some((argument, directive)) = literal_argument(stream, index, 1) else {
            return;
        };
        if let Some(entry) = self.table.get(&directive) {
            let call = IniCall {
                getter: function == "ini_get",
            };
            check_feature(&call, ctx, argument.start, entry, &Item::named(&directive));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    #[test]
    fn setting_is_an_error_reading_warns() {
        let source = "<?php ini_set('zend.assertions', 1); $x = ini_get('zend.assertions');";
        let findings = findings_for::<NewIniDirectives>(source, "5.6");

        assert_eq!(findings.len(), 2);
        assert!(findings[0].is_error);
        assert!(!findings[1].is_error);
        assert_eq!(findings[0].code, "zend_assertionsFound");
        assert_eq!(
            findings[0].message(),
            "INI directive 'zend.assertions' is not present in PHP version 5.6 or earlier"
        );
    }

    #[test]
    fn dynamic_names_are_skipped() {
        assert!(findings_for::<NewIniDirectives>("<?php ini_set($name, 1);", "5.0").is_empty());
    }
}
