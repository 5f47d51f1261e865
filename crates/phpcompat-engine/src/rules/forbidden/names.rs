use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::{called_function, declared_name, literal_argument, namespace_segments};
use crate::versioned::{assess, Checkpoints, Verdict};
use phpcompat_core::{error_code, Version};
use phpcompat_tokens::{TokenKind, TokenStream};

const TABLE: &str = include_str!("../../../data/forbidden_names.json");

/// Reserved keywords used as the name of a function, class, namespace or
/// constant.
///
/// Each table entry holds the version the word became reserved. Words that
/// were always reserved are listed at the version floor with `since: all`.
#[derive(Debug)]
pub struct ForbiddenNames {
    table: FeatureTable,
}

impl ForbiddenNames {
    /// Name tokens declared at `index`
    fn declared_names(ctx: &RuleContext<'_>, index: usize) -> Vec<usize> {
        let stream = ctx.stream();

        match stream[index].kind {
            TokenKind::Namespace => namespace_segments(stream, index),

            TokenKind::Identifier => match called_function(stream, index).as_deref() {
                Some("define") => literal_argument(stream, index, 1)
                    .map(|(argument, _)| vec![argument.start])
                    .unwrap_or_default(),
                _ => Vec::new(),
            },

            TokenKind::Function | TokenKind::Const => {
                if stream.prev_non_empty_kind(index) == Some(TokenKind::Use) {
                    return Vec::new();
                }
                // Methods and class constants may use reserved words since 7.0
                if stream.is_in_oo_body(index) && !ctx.gate().includes_at_or_below(Version::new(5, 6)) {
                    return Vec::new();
                }
                declared_name(stream, index).into_iter().collect()
            }

            _ => declared_name(stream, index).into_iter().collect(),
        }
    }

    fn name_text(stream: &TokenStream, name: usize) -> String {
        let token = &stream[name];
        match token.kind {
            TokenKind::ConstantString => stream.string_literal(name, name).unwrap_or_default(),
            _ => token.text.clone(),
        }
    }
}

impl Rule for ForbiddenNames {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "ForbiddenNames",
            description: "Detects reserved keywords used as function, class, namespace or constant names.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[
            TokenKind::Function,
            TokenKind::Class,
            TokenKind::Interface,
            TokenKind::Trait,
            TokenKind::Enum,
            TokenKind::Const,
            TokenKind::Namespace,
            TokenKind::Identifier,
        ]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json_with_metadata("forbidden_names", TABLE, KeyCase::Insensitive, &["since"])?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        for name in Self::declared_names(ctx, index) {
            let text = Self::name_text(ctx.stream(), name).to_ascii_lowercase();
            let Some(entry) = self.table.get(&text) else {
                continue;
            };
            let Some(Verdict::Withdrawn { removed: Some(version), .. }) =
                assess(Checkpoints::Withdrawn, entry, ctx.gate())
            else {
                continue;
            };

            let since = entry
                .metadata("since")
                .map(str::to_string)
                .unwrap_or_else(|| version.to_string());
            ctx.emit(
                "Function name, class name, namespace name or constant name can not be reserved keyword '%s' (since version %s)",
                name,
                true,
                format!("{}Found", error_code(&text)),
                vec![text, since],
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    fn codes(source: &str, range: &str) -> Vec<String> {
        findings_for::<ForbiddenNames>(source, range)
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    #[test]
    fn always_reserved_words() {
        let findings = findings_for::<ForbiddenNames>("<?php function list() {}", "5.6");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "listFound");
        assert!(findings[0].is_error);
        assert_eq!(
            findings[0].message(),
            "Function name, class name, namespace name or constant name can not be reserved keyword 'list' (since version all)"
        );
    }

    #[test]
    fn words_reserved_later() {
        assert_eq!(codes("<?php class Trait {}", "5.3-5.4"), vec!["traitFound"]);
        assert!(codes("<?php class Trait {}", "5.2-5.3").is_empty());
    }

    #[test]
    fn namespace_segments_and_define() {
        let source = "<?php namespace Vendor\\Callable; define('goto', 1); define($name, 1);";
        assert_eq!(codes(source, "8.0"), vec!["callableFound", "gotoFound"]);
    }

    #[test]
    fn methods_only_before_seven() {
        let source = "<?php class A { function list() {} const NEW = 1; }";
        assert_eq!(codes(source, "5.6-7.0"), vec!["listFound", "newFound"]);
        assert!(codes(source, "7.0").is_empty());
    }

    #[test]
    fn ordinary_names_and_imports() {
        assert!(codes("<?php function lister() {} use function Foo\\bar; class Listing {}", "5.6").is_empty());
    }
}
