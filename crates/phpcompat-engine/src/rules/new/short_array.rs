use crate::feature::TableError;
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use phpcompat_core::Version;
use phpcompat_tokens::TokenKind;

/// `[...]` array literals, which need PHP 5.4
#[derive(Debug, Default)]
pub struct NewShortArray;

impl Rule for NewShortArray {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "NewShortArray",
            description: "Detects short array syntax, which is not available before PHP 5.4.",
            family: Family::VersionSpecific,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::OpenShortArray, TokenKind::CloseShortArray]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self)
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if !ctx.gate().includes_at_or_below(Version::new(5, 3)) {
            return;
        }

        let side = match ctx.stream()[index].kind {
            TokenKind::OpenShortArray => "open",
            _ => "close",
        };
        ctx.emit(
            "Short array syntax (%s) is available since 5.4",
            index,
            true,
            "Found",
            vec![side.to_string()],
        );
    }
}
