//! Context helpers shared by several rules

use phpcompat_tokens::{Argument, TokenKind, TokenStream};

/// Functions taking a hash algorithm name as their first argument
pub const HASH_FUNCTIONS: &[&str] = &["hash", "hash_file", "hash_hmac", "hash_hmac_file", "hash_init", "hash_pbkdf2"];

/// Functions taking an INI directive name as their first argument
pub const INI_FUNCTIONS: &[&str] = &["ini_get", "ini_set"];

/// Lowercased name of the global function called at `index`
pub fn called_function(stream: &TokenStream, index: usize) -> Option<String> {
    if stream.kind(index)? != TokenKind::Identifier || !stream.is_call_site(index) {
        return None;
    }
    Some(stream[index].text_lowercase())
}

/// Argument at `position` when it is a single plain string literal, with
/// its unquoted value
pub fn literal_argument(stream: &TokenStream, call: usize, position: usize) -> Option<(Argument, String)> {
    let argument = stream.argument_at(call, position)?;
    let value = stream.string_literal(argument.start, argument.end)?;
    Some((argument, value))
}

/// Hash algorithm passed to one of [`HASH_FUNCTIONS`] at `index`
pub fn hash_algorithm(stream: &TokenStream, index: usize) -> Option<(String, Argument, String)> {
    let function = called_function(stream, index)?;
    if !HASH_FUNCTIONS.contains(&function.as_str()) {
        return None;
    }
    let (argument, algorithm) = literal_argument(stream, index, 1)?;
    Some((function, argument, algorithm.to_ascii_lowercase()))
}

/// A class name starting at `index` that can only refer to a global class.
///
/// Accepts `Foo` outside any namespace and `\Foo` anywhere. Qualified names
/// (`Foo\Bar`) and unqualified names inside a namespace resolve elsewhere.
pub fn global_class_name(stream: &TokenStream, index: usize) -> Option<(usize, String)> {
    let mut name = index;
    let qualified = stream.kind(index)? == TokenKind::NsSeparator;
    if qualified {
        name = stream.next_non_empty(index)?;
    }

    if stream[name].kind != TokenKind::Identifier {
        return None;
    }
    if stream.next_non_empty_kind(name) == Some(TokenKind::NsSeparator) {
        return None;
    }

    if qualified {
        // Foo\Bar: the leading separator continues a name
        if let Some(prev) = stream.prev_non_empty_kind(index) {
            if matches!(prev, TokenKind::Identifier | TokenKind::Namespace) {
                return None;
            }
        }
    } else {
        if stream.prev_non_empty_kind(name) == Some(TokenKind::NsSeparator) {
            return None;
        }
        if !stream.namespace_of(index).is_empty() {
            return None;
        }
    }

    let text = &stream[name].text;
    if ["self", "static", "parent"].iter().any(|kw| text.eq_ignore_ascii_case(kw)) {
        return None;
    }

    Some((name, text.clone()))
}

/// Name token declared by the keyword at `keyword`, keywords included.
///
/// Unlike [`TokenStream::declaration_name`] this accepts reserved words
/// (`class List`), which is exactly what the naming rules look for.
pub fn declared_name(stream: &TokenStream, keyword: usize) -> Option<usize> {
    let mut name = stream.next_non_empty(keyword)?;
    if stream[name].kind == TokenKind::BitwiseAnd {
        name = stream.next_non_empty(name)?;
    }

    // const int FOO = 1;
    if stream[keyword].kind == TokenKind::Const {
        let after = stream.next_non_empty(name)?;
        if stream[after].kind != TokenKind::Equal && is_word(&stream[after].text) {
            name = after;
        }
    }

    is_word(&stream[name].text).then_some(name)
}

/// Name segments of a `namespace Foo\Bar` declaration.
///
/// Empty for the relative `namespace\foo()` form and for unnamed blocks.
pub fn namespace_segments(stream: &TokenStream, keyword: usize) -> Vec<usize> {
    let mut segments = Vec::new();
    let Some(mut index) = stream.next_non_empty(keyword) else {
        return segments;
    };
    if stream[index].kind == TokenKind::NsSeparator {
        return segments;
    }

    loop {
        let token = &stream[index];
        if token.kind != TokenKind::NsSeparator {
            if !is_word(&token.text) {
                break;
            }
            segments.push(index);
        }
        match stream.next_non_empty(index) {
            Some(next) => index = next,
            None => break,
        }
    }

    segments
}

fn is_word(text: &str) -> bool {
    let mut chars = text.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
