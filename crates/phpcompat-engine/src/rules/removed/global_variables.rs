use crate::feature::{FeatureEntry, FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{
    check_feature, with_alternative_data, with_alternative_message, Checkpoints, Item, VersionedFeature,
};
use phpcompat_tokens::{TokenKind, TokenStream};

const TABLE: &str = include_str!("../../../data/removed_global_variables.json");

/// Superglobals and magic variables that were retired.
///
/// Variable names are case-sensitive, so `$http_raw_post_data` is an
/// ordinary local.
#[derive(Debug)]
pub struct RemovedGlobalVariables {
    table: FeatureTable,
}

impl RemovedGlobalVariables {
    /// The variable name used at `index` and the token to report on
    fn variable_at(stream: &TokenStream, index: usize) -> Option<(usize, String)> {
        let text = &stream[index].text;
        let name = text.strip_prefix('$')?;

        if stream.prev_non_empty_kind(index) == Some(TokenKind::DoubleColon) {
            return None;
        }
        // Property declarations
        if stream.is_in_oo_body(index) {
            return None;
        }

        if name != "GLOBALS" {
            return Some((index, name.to_string()));
        }

        // $GLOBALS['NAME']
        let open = stream.next_non_empty(index)?;
        if stream[open].kind != TokenKind::OpenSquareBracket {
            return None;
        }
        let key = stream.next_non_empty(open)?;
        if stream.next_non_empty_kind(key) != Some(TokenKind::CloseSquareBracket) {
            return None;
        }
        let name = stream.string_literal(key, key)?;
        Some((key, name))
    }
}

impl Rule for RemovedGlobalVariables {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "RemovedGlobalVariables",
            description: "Detects global variables that are deprecated or removed in newer PHP versions.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Variable]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("removed_global_variables", TABLE, KeyCase::Sensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let Some((at, name)) = Self::variable_at(ctx.stream(), index) else {
            return;
        };
        if let Some(entry) = self.table.get(&name) {
            check_feature(self, ctx, at, entry, &Item::named(&name));
        }
    }
}

impl VersionedFeature for RemovedGlobalVariables {
    const CHECKPOINTS: Checkpoints = Checkpoints::Withdrawn;

    fn template(&self) -> &'static str {
        "Global variable '$%s' is "
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

    fn run(source: &str, range: &str) -> Vec<crate::emit::Finding> {
        findings_for::<RemovedGlobalVariables>(source, range)
    }

    #[test]
    fn raw_post_data() {
        let findings = run("<?php echo $HTTP_RAW_POST_DATA;", "5.6-7.0");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "http_raw_post_dataDeprecatedRemoved");
        assert_eq!(
            findings[0].message(),
            "Global variable '$HTTP_RAW_POST_DATA' is deprecated since PHP 5.6 and removed since PHP 7.0; Use php://input instead"
        );
    }

    #[test]
    fn names_are_case_sensitive() {
        assert!(run("<?php echo $http_raw_post_data;", "7.0").is_empty());
    }

    #[test]
    fn globals_array_access() {
        let findings = run("<?php $v = $GLOBALS['HTTP_POST_VARS']['a']; $w = $GLOBALS[$k];", "5.4");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "http_post_varsDeprecatedRemoved");
        assert_eq!(findings[0].data[0], "HTTP_POST_VARS");
    }

    #[test]
    fn properties_are_not_globals() {
        let source = "<?php class A { public $php_errormsg; function f() { return self::$php_errormsg; } }";
        assert!(run(source, "8.0").is_empty());
    }

    #[test]
    fn locals_inside_functions_count() {
        let findings = run("<?php function f() { echo $php_errormsg; }", "7.2");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "php_errormsgDeprecated");
        assert!(!findings[0].is_error);
    }
}
