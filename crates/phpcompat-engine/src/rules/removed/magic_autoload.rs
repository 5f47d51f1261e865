use crate::feature::TableError;
use crate::rule::{Family, Rule, RuleContext, RuleMeta};
use phpcompat_core::Version;
use phpcompat_tokens::TokenKind;

/// Global `function __autoload()` declarations
#[derive(Debug)]
pub struct DeprecatedMagicAutoload;

impl Rule for DeprecatedMagicAutoload {
    fn meta() -> &'static RuleMeta {
        const META: RuleMeta = RuleMeta {
            name: "DeprecatedMagicAutoload",
            description: "Detects declarations of the __autoload() function, deprecated since PHP 7.2.",
            family: Family::VersionSpecific,
        };
        &META
    }

    fn targets() -> &'static [TokenKind] {
        &[TokenKind::Function]
    }

    fn build() -> Result<Self, TableError> {
        Ok(Self)
    }

    fn check(&self, ctx: &mut RuleContext<'_>, index: usize) {
        if !ctx.gate().includes_at_or_above(Version::new(7, 2)) {
            return;
        }

        let stream = ctx.stream();
        let Some(name) = stream.declaration_name(index) else {
            return;
        };
        if !stream[name].text.eq_ignore_ascii_case("__autoload") {
            return;
        }
        if stream.enclosing_oo_scope(index).is_some() || !stream.namespace_of(index).is_empty() {
            return;
        }

        ctx.emit("Use of __autoload() function is deprecated since PHP 7.2", name, false, "Found", Vec::new());
    }
}
