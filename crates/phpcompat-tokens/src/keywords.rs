//! Legacy keyword translation table
//!
//! Tokenizers running on an older PHP than the code they read emit newer
//! keywords as plain `T_STRING` identifiers. This table maps such identifier
//! text back to the kind a current tokenizer would produce. It is consulted
//! only when the primary kind is absent (the token is an identifier), and only
//! where the identifier cannot be a member, method or constant name.

use crate::stream::TokenStream;
use crate::token::TokenKind;
use phpcompat_core::Version;

/// One keyword that older tokenizers did not know
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyKeyword {
    /// Lowercase keyword text
    pub text: &'static str,

    /// Kind a current tokenizer emits
    pub kind: TokenKind,

    /// PHP version whose tokenizer first knew the keyword
    pub since: Version,

    /// Kinds the next non-empty token must have for the identifier to be
    /// read as the keyword; empty means no constraint
    pub followed_by: &'static [TokenKind],
}

pub static LEGACY_KEYWORDS: &[LegacyKeyword] = &[
    LegacyKeyword { text: "goto", kind: TokenKind::Goto, since: Version::new(5, 3), followed_by: &[TokenKind::Identifier] },
    LegacyKeyword { text: "namespace", kind: TokenKind::Namespace, since: Version::new(5, 3), followed_by: &[] },
    LegacyKeyword { text: "__dir__", kind: TokenKind::Dir, since: Version::new(5, 3), followed_by: &[] },
    LegacyKeyword { text: "__namespace__", kind: TokenKind::NsC, since: Version::new(5, 3), followed_by: &[] },
    LegacyKeyword { text: "trait", kind: TokenKind::Trait, since: Version::new(5, 4), followed_by: &[TokenKind::Identifier] },
    LegacyKeyword { text: "insteadof", kind: TokenKind::Insteadof, since: Version::new(5, 4), followed_by: &[] },
    LegacyKeyword { text: "callable", kind: TokenKind::Callable, since: Version::new(5, 4), followed_by: &[] },
    LegacyKeyword { text: "__trait__", kind: TokenKind::TraitC, since: Version::new(5, 4), followed_by: &[] },
    LegacyKeyword { text: "yield", kind: TokenKind::Yield, since: Version::new(5, 5), followed_by: &[] },
    LegacyKeyword { text: "finally", kind: TokenKind::Finally, since: Version::new(5, 5), followed_by: &[TokenKind::OpenCurly] },
    LegacyKeyword { text: "fn", kind: TokenKind::Fn, since: Version::new(7, 4), followed_by: &[TokenKind::OpenParen, TokenKind::BitwiseAnd] },
    LegacyKeyword { text: "match", kind: TokenKind::Match, since: Version::new(8, 0), followed_by: &[TokenKind::OpenParen] },
    LegacyKeyword { text: "enum", kind: TokenKind::Enum, since: Version::new(8, 1), followed_by: &[TokenKind::Identifier] },
    LegacyKeyword { text: "readonly", kind: TokenKind::Readonly, since: Version::new(8, 1), followed_by: &[] },
];

/// Look a keyword up by its (case-insensitive) text
pub fn lookup(text: &str) -> Option<&'static LegacyKeyword> {
    LEGACY_KEYWORDS
        .iter()
        .find(|keyword| keyword.text.eq_ignore_ascii_case(text))
}

/// Kind the identifier at `index` stands in for, if it is a legacy keyword
/// used in keyword position.
pub fn legacy_keyword(stream: &TokenStream, index: usize) -> Option<TokenKind> {
    let token = stream.get(index)?;
    if token.kind != TokenKind::Identifier {
        return None;
    }

    let keyword = lookup(&token.text)?;

    // $obj->match, Foo::enum, function yield(), const FINALLY
    if let Some(prev) = stream.prev_non_empty_kind(index) {
        if prev.is_member_access()
            || matches!(prev, TokenKind::Function | TokenKind::Const | TokenKind::NsSeparator)
        {
            return None;
        }
    }

    if !keyword.followed_by.is_empty() {
        let next = stream.next_non_empty_kind(index)?;
        if !keyword.followed_by.contains(&next) {
            return None;
        }
    }

    Some(keyword.kind)
}
