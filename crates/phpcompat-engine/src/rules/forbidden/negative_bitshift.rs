use crate::feature::TableError;
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use phpcompat_core::Version;
use phpcompat_tokens::{Scan, TokenKind};

/// Tokens that end the right-hand operand of a shift
const OPERAND_END: &[TokenKind] = &[
    TokenKind::Semicolon,
    TokenKind::Comma,
    TokenKind::CloseParen,
    TokenKind::CloseSquareBracket,
    TokenKind::CloseShortArray,
    TokenKind::CloseCurly,
    TokenKind::CloseTag,
    TokenKind::DoubleArrow,
    TokenKind::InlineThen,
    TokenKind::Colon,
    TokenKind::Coalesce,
    TokenKind::BooleanAnd,
    TokenKind::BooleanOr,
    TokenKind::LogicalAnd,
    TokenKind::LogicalOr,
    TokenKind::LogicalXor,
    TokenKind::BitwiseAnd,
    TokenKind::BitwiseOr,
    TokenKind::BitwiseXor,
    TokenKind::IsEqual,
    TokenKind::IsNotEqual,
    TokenKind::IsIdentical,
    TokenKind::IsNotIdentical,
    TokenKind::LessThan,
    TokenKind::GreaterThan,
    TokenKind::IsSmallerOrEqual,
    TokenKind::IsGreaterOrEqual,
    TokenKind::Spaceship,
    TokenKind::Sl,
    TokenKind::Sr,
];

/// Shifts by a negative literal, which throw since PHP 7.0
#[derive(Debug)]
pub struct ForbiddenNegativeBitshift;

impl Rule for ForbiddenNegativeBitshift {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "ForbiddenNegativeBitshift",
            description: "Detects bitwise shifts by a negative number, which throw an ArithmeticError since PHP 7.0.",
            family: Family::VersionSpecific,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Sl, TokenKind::Sr, TokenKind::SlEqual, TokenKind::SrEqual]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self)
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if !ctx.gate().includes_at_or_above(Version::new(7, 0)) {
            return;
        }

        let stream = ctx.stream();
        let Some(start) = stream.next_non_empty(index) else {
            return;
        };
        let end = match stream.find_next(OPERAND_END, start, None, Scan::SkipNested) {
            Some(terminator) => match stream.prev_non_empty(terminator) {
                Some(end) => end,
                None => return,
            },
            None => stream.len() - 1,
        };
        if end < start {
            return;
        }

        // The shift width is cast to int first, so -0.5 shifts by 0
        let Some(width) = ctx.evaluator().evaluate(start, end, true).as_number() else {
            return;
        };
        if width.trunc() >= 0.0 {
            return;
        }

        ctx.emit(
            "Bitwise shifts by negative number will throw an ArithmeticError in PHP 7.0. Found: %s",
            index,
            true,
            "Found",
            vec![stream.text_between_without_comments(start, end).trim().to_string()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    fn run(source: &str, range: &str) -> Vec<crate::emit::Finding> {
        findings_for::<ForbiddenNegativeBitshift>(source, range)
    }

    #[test]
    fn negative_literal_shift() {
        let findings = run("<?php $a = 1 << -1;", "5.6-7.0");

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "Found");
        assert_eq!(
            findings[0].message(),
            "Bitwise shifts by negative number will throw an ArithmeticError in PHP 7.0. Found: -1"
        );
    }

    #[test]
    fn compound_assignment_and_nested_operands() {
        assert_eq!(run("<?php $a >>= -2;", "7.0").len(), 1);
        assert_eq!(run("<?php f($a << -(3), $b);", "7.0").len(), 0);
        assert_eq!(run("<?php $x = ($a << - 3) | 1;", "7.0").len(), 1);
    }

    #[test]
    fn positive_or_unknown_operands_are_fine() {
        assert!(run("<?php $a = 1 << 2; $b = 1 >> $n; $c = 1 << -$n;", "7.0").is_empty());
    }

    #[test]
    fn float_widths_truncate_toward_zero() {
        assert!(run("<?php $x = 1 << -0.5;", "7.0").is_empty());
        assert!(run("<?php $x = 1 >> '-0.9';", "7.0").is_empty());

        let findings = run("<?php $x = 1 << -1.5;", "7.0");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].data, vec!["-1.5".to_string()]);
    }

    #[test]
    fn silent_before_seven() {
        assert!(run("<?php $a = 1 << -1;", "5.6").is_empty());
        assert!(run("<?php $a = 1 << -1;", "").is_empty());
    }
}
