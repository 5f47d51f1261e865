use crate::feature::{FeatureTable, KeyCase, TableError};
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use crate::versioned::{check_feature, Checkpoints, Item, VersionedFeature};
use phpcompat_core::error_code;
use phpcompat_tokens::{NumericValue, TokenKind};

const TABLE: &str = include_str!("../../../data/new_execution_directives.json");

/// `declare()` directives, plus a sanity check of their values
#[derive(Debug)]
pub struct NewExecutionDirectives {
    table: FeatureTable,
}

impl NewExecutionDirectives {
    /// `None` when the value cannot be judged from the tokens alone
    fn is_valid_value(ctx: &RuleContext<'_>, directive: &str, start: usize, end: usize) -> Option<bool> {
        let stream = ctx.stream();
        match directive {
            "ticks" => match ctx.evaluator().evaluate(start, end, true) {
                NumericValue::Number(value) => Some(value >= 0.0 && value.fract() == 0.0),
                NumericValue::Undetermined => None,
            },
            "strict_types" => Some(start == end && stream[start].kind == TokenKind::LNumber && matches!(stream[start].text.as_str(), "0" | "1")),
            "encoding" => Some(stream.string_literal(start, end).is_some_and(|value| !value.is_empty())),
            _ => None,
        }
    }
}

impl Rule for NewExecutionDirectives {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewExecutionDirectives",
            description: "Detects declare() directives that are not present in older PHP versions, and invalid directive values.",
            family: Family::NewFeature,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Declare]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self {
            table: FeatureTable::from_json("new_execution_directives", TABLE, KeyCase::Insensitive)?,
        })
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if ctx.gate().is_inert() {
            return;
        }

        let stream = ctx.stream();
        for argument in stream.call_arguments(index) {
            let name = argument.start;
            if stream[name].kind != TokenKind::Identifier {
                continue;
            }
            let Some(equals) = stream.next_non_empty(name).filter(|&eq| stream[eq].kind == TokenKind::Equal) else {
                continue;
            };
            let Some(value) = stream.next_non_empty(equals).filter(|&v| v <= argument.end) else {
                continue;
            };

            let directive = stream[name].text_lowercase();
            let Some(entry) = self.table.get(&directive) else {
                continue;
            };

            check_feature(self, ctx, name, entry, &Item::named(&directive));

            if Self::is_valid_value(ctx, &directive, value, argument.end) == Some(false) {
                ctx.emit(
                    "The execution directive %s does not seem to have a valid value. Please review. Found: %s",
                    value,
                    false,
                    format!("{}InvalidValueFound", error_code(&directive)),
                    vec![directive.clone(), stream.text_between(value, argument.end)],
                );
            }
        }
    }
}

impl VersionedFeature for NewExecutionDirectives {
    const CHECKPOINTS: Checkpoints = Checkpoints::Introduced;

    fn template(&self) -> &'static str {
        "Directive %s is not present in PHP version %s or earlier"
    }
}
