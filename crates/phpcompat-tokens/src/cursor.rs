//! Token cursor utilities
//!
//! Linear lookups over a [`TokenStream`]. Every query returns `None` when
//! nothing matches, so callers can chain them with `?`.

use crate::stream::TokenStream;
use crate::token::TokenKind;

/// How a scan treats nested bracket pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Scan {
    /// Visit every token
    #[default]
    Flat,

    /// Jump over a whole `( )`, `[ ]` or `{ }` pair in one step once its
    /// opener (or closer, scanning backwards) is reached
    SkipNested,
}

impl TokenStream {
    /// First index in `[from, to)` whose kind is in `kinds`.
    ///
    /// `to` defaults to the end of the stream.
    pub fn find_next(
        &self,
        kinds: &[TokenKind],
        from: usize,
        to: Option<usize>,
        scan: Scan,
    ) -> Option<usize> {
        let end = to.unwrap_or(self.len()).min(self.len());
        let mut index = from;

        while index < end {
            let kind = self[index].kind;
            if kinds.contains(&kind) {
                return Some(index);
            }

            if scan == Scan::SkipNested {
                if let Some(closer) = self.closer_of(index) {
                    index = closer + 1;
                    continue;
                }
            }

            index += 1;
        }

        None
    }

    /// First index in `[from, to)` whose kind is NOT in `skip`
    pub fn find_next_except(&self, skip: &[TokenKind], from: usize, to: Option<usize>) -> Option<usize> {
        let end = to.unwrap_or(self.len()).min(self.len());
        (from..end).find(|&index| !skip.contains(&self[index].kind))
    }

    /// Last index in `[to, from]` whose kind is in `kinds`, scanning backwards.
    ///
    /// `to` defaults to the start of the stream.
    pub fn find_previous(
        &self,
        kinds: &[TokenKind],
        from: usize,
        to: Option<usize>,
        scan: Scan,
    ) -> Option<usize> {
        if self.is_empty() {
            return None;
        }

        let start = to.unwrap_or(0);
        let mut index = from.min(self.len() - 1);

        loop {
            if index < start {
                return None;
            }

            let kind = self[index].kind;
            if kinds.contains(&kind) {
                return Some(index);
            }

            if scan == Scan::SkipNested {
                if let Some(opener) = self.opener_of(index) {
                    index = opener;
                }
            }

            index = index.checked_sub(1)?;
        }
    }

    /// Last index in `[to, from]` whose kind is NOT in `skip`
    pub fn find_previous_except(&self, skip: &[TokenKind], from: usize, to: Option<usize>) -> Option<usize> {
        if self.is_empty() {
            return None;
        }
        let start = to.unwrap_or(0);
        let from = from.min(self.len() - 1);
        if from < start {
            return None;
        }
        (start..=from).rev().find(|&index| !skip.contains(&self[index].kind))
    }

    /// Next token after `index` that is not whitespace or a comment
    pub fn next_non_empty(&self, index: usize) -> Option<usize> {
        self.find_next_except(TokenKind::EMPTY, index + 1, None)
    }

    /// Previous token before `index` that is not whitespace or a comment
    pub fn prev_non_empty(&self, index: usize) -> Option<usize> {
        let from = index.checked_sub(1)?;
        self.find_previous_except(TokenKind::EMPTY, from, None)
    }

    /// Kind of the next non-empty token after `index`
    pub fn next_non_empty_kind(&self, index: usize) -> Option<TokenKind> {
        self.next_non_empty(index).map(|i| self[i].kind)
    }

    /// Kind of the previous non-empty token before `index`
    pub fn prev_non_empty_kind(&self, index: usize) -> Option<TokenKind> {
        self.prev_non_empty(index).map(|i| self[i].kind)
    }

    /// Concatenated source text of `[start, end]`
    pub fn text_between(&self, start: usize, end: usize) -> String {
        if start >= self.len() || end < start {
            return String::new();
        }
        let end = end.min(self.len() - 1);
        self.tokens()[start..=end].iter().map(|t| t.text.as_str()).collect()
    }

    /// Concatenated source text of `[start, end]` without comments
    pub fn text_between_without_comments(&self, start: usize, end: usize) -> String {
        if start >= self.len() || end < start {
            return String::new();
        }
        let end = end.min(self.len() - 1);
        self.tokens()[start..=end]
            .iter()
            .filter(|t| !matches!(t.kind, TokenKind::Comment | TokenKind::DocComment))
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Name token of a declaration keyword (`function`, `class`, `const`, ...).
    ///
    /// Skips a by-reference `&` after `function`. Returns `None` for closures,
    /// anonymous classes and anything whose name is not a plain identifier.
    pub fn declaration_name(&self, keyword: usize) -> Option<usize> {
        match self.kind(keyword)? {
            TokenKind::Function
            | TokenKind::Class
            | TokenKind::Interface
            | TokenKind::Trait
            | TokenKind::Enum
            | TokenKind::Const
            | TokenKind::Namespace => {}
            _ => return None,
        }

        let mut name = self.next_non_empty(keyword)?;
        if self[name].kind == TokenKind::BitwiseAnd {
            name = self.next_non_empty(name)?;
        }

        // `const int FOO = 1;` (typed class constants)
        if self[keyword].kind == TokenKind::Const {
            let after = self.next_non_empty(name)?;
            if self[after].kind == TokenKind::Identifier {
                name = after;
            }
        }

        if self[name].kind != TokenKind::Identifier {
            return None;
        }

        Some(name)
    }

    /// Full namespace name declared by the `namespace` keyword at `keyword`
    pub fn namespace_name(&self, keyword: usize) -> Option<String> {
        if self.kind(keyword)? != TokenKind::Namespace {
            return None;
        }

        let mut name = String::new();
        let mut index = self.next_non_empty(keyword)?;
        while matches!(self[index].kind, TokenKind::Identifier | TokenKind::NsSeparator) {
            name.push_str(&self[index].text);
            index = match self.next_non_empty(index) {
                Some(next) => next,
                None => break,
            };
        }

        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }

    /// Namespace in effect at `index`, empty for the global namespace.
    ///
    /// Handles both the braced `namespace Foo { }` and the statement
    /// `namespace Foo;` forms.
    pub fn namespace_of(&self, index: usize) -> String {
        let Some(token) = self.get(index) else {
            return String::new();
        };

        if let Some(&owner) = token
            .enclosing_scopes
            .iter()
            .find(|&&owner| self[owner].kind == TokenKind::Namespace)
        {
            return self.namespace_name(owner).unwrap_or_default();
        }

        let mut from = index;
        while let Some(keyword) = self.find_previous(&[TokenKind::Namespace], from, None, Scan::Flat) {
            let is_statement = self[keyword].scope_opener.is_none()
                && self[keyword].enclosing_scopes.is_empty()
                && self.next_non_empty_kind(keyword) != Some(TokenKind::NsSeparator);
            if is_statement {
                return self.namespace_name(keyword).unwrap_or_default();
            }
            if keyword == 0 {
                break;
            }
            from = keyword - 1;
        }

        String::new()
    }

    /// Unquoted value of a span that is exactly one plain string literal
    pub fn string_literal(&self, start: usize, end: usize) -> Option<String> {
        if start != end || self.kind(start)? != TokenKind::ConstantString {
            return None;
        }
        crate::numeric::unquote(&self[start].text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;

    fn stream(source: &str) -> TokenStream {
        Lexer::new(source).tokenize().unwrap()
    }

    #[test]
    fn find_next_flat_and_nested() {
        let s = stream("<?php foo(1, [2, 3], bar(4, 5), 6);");
        let open = s.find_next(&[TokenKind::OpenParen], 0, None, Scan::Flat).unwrap();
        let close = s[open].matching_paren.unwrap();

        let flat = s.find_next(&[TokenKind::Comma], open + 1, Some(close), Scan::Flat);
        let mut commas = Vec::new();
        let mut from = open + 1;
        while let Some(comma) = s.find_next(&[TokenKind::Comma], from, Some(close), Scan::SkipNested) {
            commas.push(comma);
            from = comma + 1;
        }

        assert!(flat.is_some());
        assert_eq!(commas.len(), 3);
    }

    #[test]
    fn find_next_respects_upper_bound() {
        let s = stream("<?php $a; $b;");
        let first_semicolon = s.find_next(&[TokenKind::Semicolon], 0, None, Scan::Flat).unwrap();
        assert_eq!(
            s.find_next(&[TokenKind::Variable], first_semicolon, Some(first_semicolon + 1), Scan::Flat),
            None
        );
    }

    #[test]
    fn find_previous_skips_nested() {
        let s = stream("<?php $a = foo($b, $c);");
        let semicolon = s.find_next(&[TokenKind::Semicolon], 0, None, Scan::Flat).unwrap();

        let flat = s.find_previous(&[TokenKind::Variable], semicolon, None, Scan::Flat).unwrap();
        assert_eq!(s[flat].text, "$c");

        let nested = s.find_previous(&[TokenKind::Variable], semicolon, None, Scan::SkipNested).unwrap();
        assert_eq!(s[nested].text, "$a");
    }

    #[test]
    fn non_empty_neighbours() {
        let s = stream("<?php foo /* note */ ( );");
        let name = s.find_next(&[TokenKind::Identifier], 0, None, Scan::Flat).unwrap();
        assert_eq!(s.next_non_empty_kind(name), Some(TokenKind::OpenParen));

        let open = s.next_non_empty(name).unwrap();
        assert_eq!(s.prev_non_empty(open), Some(name));
        assert_eq!(s.prev_non_empty(0), None);
    }

    #[test]
    fn declaration_names() {
        let s = stream("<?php function &make() {} class Box {} $f = function() {};");
        let function = s.find_next(&[TokenKind::Function], 0, None, Scan::Flat).unwrap();
        let class = s.find_next(&[TokenKind::Class], 0, None, Scan::Flat).unwrap();
        let closure = s.find_next(&[TokenKind::Closure], 0, None, Scan::Flat).unwrap();

        assert_eq!(s[s.declaration_name(function).unwrap()].text, "make");
        assert_eq!(s[s.declaration_name(class).unwrap()].text, "Box");
        assert_eq!(s.declaration_name(closure), None);
    }

    #[test]
    fn namespace_names() {
        let s = stream("<?php namespace Vendor\\Package;");
        let keyword = s.find_next(&[TokenKind::Namespace], 0, None, Scan::Flat).unwrap();
        assert_eq!(s.namespace_name(keyword).as_deref(), Some("Vendor\\Package"));
    }

    #[test]
    fn text_between_joins_tokens() {
        let s = stream("<?php $a + /* x */ 1;");
        let var = s.find_next(&[TokenKind::Variable], 0, None, Scan::Flat).unwrap();
        let num = s.find_next(&[TokenKind::LNumber], 0, None, Scan::Flat).unwrap();
        assert_eq!(s.text_between(var, num), "$a + /* x */ 1");
        assert_eq!(s.text_between_without_comments(var, num), "$a +  1");
        assert_eq!(s.text_between(num, var), "");
    }

    #[test]
    fn namespace_in_effect() {
        let s = stream("<?php foo(); namespace App\\Http; bar(); namespace Other { baz(); }");
        let at = |name: &str| s.iter().position(|t| t.text == name).unwrap();

        assert_eq!(s.namespace_of(at("foo")), "");
        assert_eq!(s.namespace_of(at("bar")), "App\\Http");
        assert_eq!(s.namespace_of(at("baz")), "Other");
    }

    #[test]
    fn plain_string_literals() {
        let s = stream("<?php f('md5', \"sha$x\", 'a' . 'b');");
        let call = s.find_next(&[TokenKind::Identifier], 0, None, Scan::Flat).unwrap();
        let args = s.call_arguments(call);

        assert_eq!(s.string_literal(args[0].start, args[0].end).as_deref(), Some("md5"));
        assert_eq!(s.string_literal(args[1].start, args[1].end), None);
        assert_eq!(s.string_literal(args[2].start, args[2].end), None);
    }
}
