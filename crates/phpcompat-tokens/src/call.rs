//! Call-site detection and argument extraction

use crate::cursor::Scan;
use crate::stream::TokenStream;
use crate::token::TokenKind;

/// Kinds that can name an invocation
const CALLABLE: &[TokenKind] = &[
    TokenKind::Identifier,
    TokenKind::Isset,
    TokenKind::Empty,
    TokenKind::Unset,
    TokenKind::Eval,
    TokenKind::Exit,
];

/// Preceding kinds that turn a name into something other than a global call
const NOT_A_CALL_AFTER: &[TokenKind] = &[
    TokenKind::DoubleColon,
    TokenKind::ObjectOperator,
    TokenKind::NullsafeObjectOperator,
    TokenKind::Function,
    TokenKind::Const,
    TokenKind::Use,
    TokenKind::New,
    TokenKind::Attribute,
];

/// One top-level argument of a call or array literal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Argument {
    /// 1-based position
    pub position: usize,

    /// First non-empty token of the argument
    pub start: usize,

    /// Last non-empty token of the argument (inclusive)
    pub end: usize,

    /// Source text of `[start, end]`
    pub raw: String,
}

impl TokenStream {
    /// Whether the token at `index` is a genuine invocation of a global
    /// function (or call-like language construct).
    ///
    /// Method and static calls, declarations, `new Foo()` and names inside a
    /// namespace (`Foo\bar()`) are not call sites.
    pub fn is_call_site(&self, index: usize) -> bool {
        let Some(kind) = self.kind(index) else {
            return false;
        };
        if !CALLABLE.contains(&kind) {
            return false;
        }

        if self.next_non_empty_kind(index) != Some(TokenKind::OpenParen) {
            return false;
        }

        let Some(prev) = self.prev_non_empty(index) else {
            return true;
        };
        let prev_kind = self[prev].kind;

        if NOT_A_CALL_AFTER.contains(&prev_kind) {
            return false;
        }

        // function &foo()
        if prev_kind == TokenKind::BitwiseAnd
            && self.prev_non_empty_kind(prev) == Some(TokenKind::Function)
        {
            return false;
        }

        // Foo\bar() and namespace\bar() are namespaced; \bar() is global
        if prev_kind == TokenKind::NsSeparator {
            if let Some(before) = self.prev_non_empty_kind(prev) {
                if matches!(before, TokenKind::Identifier | TokenKind::Namespace) {
                    return false;
                }
            }
        }

        true
    }

    /// Top-level arguments of the call or array literal at `index`.
    ///
    /// `index` may be the function name, an `array` keyword, or the opening
    /// `(`, `[` of the list itself. Commas inside nested arrays, closures and
    /// calls are skipped. A trailing comma does not produce an empty final
    /// argument. Unresolvable parentheses yield no arguments.
    pub fn call_arguments(&self, index: usize) -> Vec<Argument> {
        let Some(opener) = self.argument_list_opener(index) else {
            return Vec::new();
        };
        let Some(closer) = self.closer_of(opener) else {
            return Vec::new();
        };

        let mut arguments = Vec::new();
        let mut from = opener + 1;

        loop {
            let comma = self.find_next(&[TokenKind::Comma], from, Some(closer), Scan::SkipNested);
            let segment_end = comma.unwrap_or(closer);

            let first = self.find_next_except(TokenKind::EMPTY, from, Some(segment_end));
            let Some(first) = first else {
                break;
            };
            let last = self
                .find_previous_except(TokenKind::EMPTY, segment_end - 1, Some(first))
                .unwrap_or(first);

            arguments.push(Argument {
                position: arguments.len() + 1,
                start: first,
                end: last,
                raw: self.text_between(first, last).trim().to_string(),
            });

            match comma {
                Some(comma) => from = comma + 1,
                None => break,
            }
        }

        arguments
    }

    /// Number of top-level arguments of the call at `index`
    pub fn argument_count(&self, index: usize) -> usize {
        self.call_arguments(index).len()
    }

    /// The argument at 1-based `position`
    pub fn argument_at(&self, index: usize, position: usize) -> Option<Argument> {
        self.call_arguments(index)
            .into_iter()
            .find(|argument| argument.position == position)
    }

    fn argument_list_opener(&self, index: usize) -> Option<usize> {
        match self.kind(index)? {
            TokenKind::OpenParen | TokenKind::OpenShortArray | TokenKind::OpenSquareBracket => Some(index),
            _ => {
                let next = self.next_non_empty(index)?;
                (self[next].kind == TokenKind::OpenParen).then_some(next)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lexer;
    use pretty_assertions::assert_eq;

    fn stream(source: &str) -> TokenStream {
        Lexer::new(source).tokenize().unwrap()
    }

    fn first_named(stream: &TokenStream, name: &str) -> usize {
        stream.iter().position(|t| t.text == name).unwrap()
    }

    #[test]
    fn recognises_global_calls() {
        let s = stream("<?php foo(); \\bar(); isset($a); exit(1);");
        assert!(s.is_call_site(first_named(&s, "foo")));
        assert!(s.is_call_site(first_named(&s, "bar")));
        assert!(s.is_call_site(first_named(&s, "isset")));
        assert!(s.is_call_site(first_named(&s, "exit")));
    }

    #[test]
    fn rejects_non_calls() {
        let s = stream(
            "<?php $o->foo(); A::bar(); function baz() {} function &qux() {} new Quux(); Ns\\corge(); FOO;",
        );
        for name in ["foo", "bar", "baz", "qux", "Quux", "corge", "FOO"] {
            assert!(!s.is_call_site(first_named(&s, name)), "{name} is not a call site");
        }
    }

    #[test]
    fn namespace_relative_calls_are_not_global() {
        let s = stream("<?php namespace\\foo();");
        assert!(!s.is_call_site(first_named(&s, "foo")));
    }

    #[test]
    fn splits_top_level_arguments() {
        let s = stream("<?php foo($a, [1,2,3], bar(1,2), $c,);");
        let args = s.call_arguments(first_named(&s, "foo"));

        assert_eq!(args.len(), 4);
        assert_eq!(args[1].raw, "[1,2,3]");
        assert_eq!(args[2].raw, "bar(1,2)");
        assert_eq!(
            args.iter().map(|a| a.position).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[test]
    fn empty_and_unresolved_calls() {
        let s = stream("<?php foo( ); bar(1, 2");
        assert_eq!(s.argument_count(first_named(&s, "foo")), 0);
        assert_eq!(s.argument_count(first_named(&s, "bar")), 0);
    }

    #[test]
    fn closures_inside_arguments() {
        let s = stream("<?php usort($list, function ($a, $b) { return $a <=> $b; });");
        let args = s.call_arguments(first_named(&s, "usort"));
        assert_eq!(args.len(), 2);
        assert!(args[1].raw.starts_with("function ($a, $b)"));
    }

    #[test]
    fn argument_at_position() {
        let s = stream("<?php hash( 'md5' , /* data */ $data );");
        let index = first_named(&s, "hash");
        assert_eq!(s.argument_at(index, 1).map(|a| a.raw), Some("'md5'".to_string()));
        assert_eq!(s.argument_at(index, 2).map(|a| a.raw), Some("$data".to_string()));
        assert_eq!(s.argument_at(index, 3), None);
    }

    #[test]
    fn array_literal_mode() {
        let s = stream("<?php $x = ['a' => 1, 'b' => [2, 3]];");
        let opener = s.iter().position(|t| t.kind == TokenKind::OpenShortArray).unwrap();
        let items = s.call_arguments(opener);
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].raw, "'b' => [2, 3]");
    }
}
