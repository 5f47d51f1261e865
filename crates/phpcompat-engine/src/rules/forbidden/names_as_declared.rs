use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::{declared_name, namespace_segments};
use crate::versioned::{assess, Checkpoints, Verdict};
use phpcompat_core::error_code;
use phpcompat_tokens::TokenKind;

const TABLE: &str = include_str!("../../../data/forbidden_names_as_declared.json");

/// Type names that became reserved for class-like declarations.
///
/// A `false` checkpoint marks the version the word became soft reserved,
/// `true` the version it became a hard reserved keyword. Both tiers can fall
/// in one range and are then reported together.
#[derive(Debug)]
pub struct ForbiddenNamesAsDeclared {
    table: FeatureTable,
}

impl Rule for ForbiddenNamesAsDeclared {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "ForbiddenNamesAsDeclared",
            description: "Detects reserved type names used to name a class, interface, trait or namespace.",
            family: Family::Removed,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[
            TokenKind::Class,
            TokenKind::Interface,
            TokenKind::Trait,
            TokenKind::Enum,
            TokenKind::Namespace,
        ]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("forbidden_names_as_declared", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        let kind = stream[index].kind;
        let names = match kind {
            TokenKind::Namespace => namespace_segments(stream, index),
            _ => declared_name(stream, index).into_iter().collect(),
        };

        for name in names {
            let text = stream[name].text_lowercase();
            let Some(entry) = self.table.get(&text) else {
                continue;
            };
            let Some(Verdict::Withdrawn { deprecated: soft, removed: hard }) =
                assess(Checkpoints::Withdrawn, entry, ctx.gate())
            else {
                continue;
            };

            let mut tiers = Vec::new();
            let mut data = vec![stream[name].text.clone()];
            if let Some(version) = hard {
                tiers.push("a reserved keyword as of PHP version %s");
                data.push(version.to_string());
            }
            if let Some(version) = soft {
                tiers.push("a soft reserved keyword as of PHP version %s");
                data.push(version.to_string());
            }
            data.push(kind.name().to_string());

            let template = format!(
                "'%s' is {} and should not be used to name a class, interface or trait or as part of a namespace (%s)",
                tiers.join(" and ")
            );
            ctx.emit(template, name, hard.is_some(), format!("{}Found", error_code(&text)), data);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    fn run(source: &str, range: &str) -> Vec<crate::emit::Finding> {
        findings_for::<ForbiddenNamesAsDeclared>(source, range)
    }

    #[test]
    fn hard_reserved_type_name() {
        let findings = run("<?php class String {}", "5.6-7.0");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "stringFound");
        assert!(findings[0].is_error);
        assert_eq!(
            findings[0].message(),
            "'String' is a reserved keyword as of PHP version 7.0 and should not be used to name a class, \
             interface or trait or as part of a namespace (T_CLASS)"
        );
    }

    #[test]
    fn soft_reserved_warns() {
        let findings = run("<?php interface Resource {}", "7.0");

        assert_eq!(findings.len(), 1);
        assert!(!findings[0].is_error);
        assert_eq!(
            findings[0].message(),
            "'Resource' is a soft reserved keyword as of PHP version 7.0 and should not be used to name a class, \
             interface or trait or as part of a namespace (T_INTERFACE)"
        );
    }

    #[test]
    fn both_tiers_in_one_message() {
        let findings = run("<?php class Object {}", "7.0-7.2");

        assert_eq!(findings.len(), 1);
        assert!(findings[0].is_error);
        assert_eq!(
            findings[0].message(),
            "'Object' is a reserved keyword as of PHP version 7.2 and a soft reserved keyword as of PHP version 7.0 \
             and should not be used to name a class, interface or trait or as part of a namespace (T_CLASS)"
        );
    }

    #[test]
    fn namespace_segments_count() {
        let findings = run("<?php namespace App\\Mixed\\Types;", "8.0");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "mixedFound");
    }

    #[test]
    fn older_ranges_are_silent() {
        assert!(run("<?php class Object {}", "5.6").is_empty());
    }
}
