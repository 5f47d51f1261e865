use crate::feature::TableError;
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use phpcompat_core::Version;
use phpcompat_tokens::{NumericValue, Scan, TokenKind};

/// Tokens that make a `break`/`continue` argument non-literal
const VARIABLE_ARGUMENT: &[TokenKind] = &[
    TokenKind::Variable,
    TokenKind::Identifier,
    TokenKind::Function,
    TokenKind::Closure,
    TokenKind::Fn,
];

/// `break 0;`, `continue $n;` and friends
#[derive(Debug)]
pub struct ForbiddenBreakContinueVariableArguments;

impl Rule for ForbiddenBreakContinueVariableArguments {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "ForbiddenBreakContinueVariableArguments",
            description: "Detects break and continue with a zero or non-literal argument, forbidden since PHP 5.4.",
            family: Family::VersionSpecific,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Break, TokenKind::Continue]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self)
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if !ctx.gate().includes_at_or_above(Version::new(5, 4)) {
            return;
        }

        let stream = ctx.stream();
        let Some(start) = stream.next_non_empty(index) else {
            return;
        };
        if matches!(stream[start].kind, TokenKind::Semicolon | TokenKind::CloseTag) {
            return;
        }
        let Some(terminator) = stream.find_next(&[TokenKind::Semicolon, TokenKind::CloseTag], start, None, Scan::SkipNested)
        else {
            return;
        };
        let Some(end) = stream.prev_non_empty(terminator) else {
            return;
        };

        let (kind, code) = if ctx.evaluator().evaluate(start, end, true) == NumericValue::Number(0.0) {
            ("0 as argument", "zeroArgumentFound")
        } else if (start..=end).any(|i| VARIABLE_ARGUMENT.contains(&stream[i].kind)) {
            ("a variable argument", "variableArgumentFound")
        } else {
            return;
        };

        ctx.emit(
            "Using %s on break or continue is forbidden since PHP 5.4",
            index,
            true,
            code,
            vec![kind.to_string()],
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::findings_for;
    use pretty_assertions::assert_eq;

    fn codes(source: &str, range: &str) -> Vec<String> {
        findings_for::<ForbiddenBreakContinueVariableArguments>(source, range)
            .into_iter()
            .map(|f| f.code)
            .collect()
    }

    #[test]
    fn zero_argument() {
        let findings = findings_for::<ForbiddenBreakContinueVariableArguments>(
            "<?php while (true) { break 0; }",
            "5.3-5.4",
        );

        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].code, "zeroArgumentFound");
        assert_eq!(findings[0].message(), "Using 0 as argument on break or continue is forbidden since PHP 5.4");
    }

    #[test]
    fn variable_arguments() {
        let source = "<?php foreach ($a as $b) { continue $depth; break (LEVEL); break 2; continue; }";
        assert_eq!(codes(source, "5.4"), vec!["variableArgumentFound", "variableArgumentFound"]);
    }

    #[test]
    fn older_ranges_are_silent() {
        assert!(codes("<?php while (1) { break $n; }", "5.3").is_empty());
    }
}
