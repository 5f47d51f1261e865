use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::rules::support::global_class_name;
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_tokens::{Scan, TokenKind, TokenStream};

const TABLE: &str = include_str!("../../../data/new_classes.json");

/// Uses of built-in classes that older versions lack
#[derive(Debug)]
pub struct NewClasses {
    table: FeatureTable,
}

impl NewClasses {
    /// Tokens where a class name may start, for the keyword at `index`
    fn name_starts(stream: &TokenStream, index: usize) -> Vec<usize> {
        match stream[index].kind {
            TokenKind::New | TokenKind::Extends | TokenKind::Instanceof => {
                stream.next_non_empty(index).into_iter().collect()
            }
            TokenKind::DoubleColon => {
                let Some(name) = stream.prev_non_empty(index) else {
                    return Vec::new();
                };
                match stream.prev_non_empty(name) {
                    Some(separator) if stream[separator].kind == TokenKind::NsSeparator => vec![separator],
                    _ => vec![name],
                }
            }
            TokenKind::Catch => {
                let Some(opener) = stream.next_non_empty(index) else {
                    return Vec::new();
                };
                let Some(closer) = stream.closer_of(opener) else {
                    return Vec::new();
                };

                // catch (A | \B $e)
                let mut starts = Vec::new();
                let mut from = opener;
                while let Some(start) = stream.next_non_empty(from).filter(|&s| s < closer) {
                    starts.push(start);
                    match stream.find_next(&[TokenKind::BitwiseOr], start, Some(closer), Scan::Flat) {
                        Some(pipe) => from = pipe,
                        None => break,
                    }
                }
                starts
            }
            _ => Vec::new(),
        }
    }
}

impl Rule for NewClasses {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewClasses",
            description: "Detects usage of built-in classes that are not present in older PHP versions.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[
            TokenKind::New,
            TokenKind::DoubleColon,
            TokenKind::Extends,
            TokenKind::Instanceof,
            TokenKind::Catch,
        ]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_classes", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        for start in Self::name_starts(stream, index) {
            let Some((name_index, name)) = global_class_name(stream, start) else {
                continue;
            };
            if let Some(entry) = self.table.get(&name) {
                check_feature(self, ctx, name_index, entry, &Item::named(&name));
            }
        }
    }
}

impl VersionedFeature for NewClasses {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "The built-in class %s is not present in PHP version %s or earlier"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    fn codes(source: &str, range: &str) -> Vec<String> {
        findings_for::<NewClasses>(source, range)
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    #[test]
    fn every_usage_position() {
        let source = r#"<?php
$a = new DateTime();
$b = DateTimeImmutable::createFromMutable($a);
class Broken extends Error {}
if ($e instanceof TypeError) {}
try {} catch (ParseError | \ArithmeticError $e) {}
"#;
        assert_eq!(
            codes(source, "5.1"),
            vec!["datetimeFound", "datetimeimmutableFound", "errorFound", "typeerrorFound", "parseerrorFound", "arithmeticerrorFound"]
        );
    }

    #[test]
    fn message_cites_the_boundary() {
        let findings = findings_for::<NewClasses>("<?php new WeakMap();", "7.0-8.0");
        assert_eq!(
            findings[0].message(),
            "The built-in class WeakMap is not present in PHP version 7.4 or earlier"
        );
    }

    #[test]
    fn namespaced_names_are_ignored() {
        let source = "<?php namespace App; new DateTime(); new Lib\\Closure(); new \\Closure();";
        assert_eq!(codes(source, "5.2"), vec!["closureFound"]);
    }

    #[test]
    fn user_classes_are_ignored() {
        assert!(codes("<?php new Foo(); Foo::bar(); self::x();", "5.0").is_empty());
    }
}
