//! Loose numeric evaluation of token spans
//!
//! Mirrors PHP's loose string-to-number coercion closely enough to tell a
//! literal `0` or a negative literal apart from anything computed at runtime.
//! Spans that cannot be decided statically evaluate to
//! [`NumericValue::Undetermined`]; callers must stay silent on those.

use crate::stream::TokenStream;
use crate::token::TokenKind;
use phpcompat_core::{Version, VersionGate};
use regex::Regex;
use std::sync::LazyLock;

static INT_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([+-]?[0-9]+)").expect("int prefix pattern is valid"));

static FLOAT_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([+-]?(?:[0-9]+\.[0-9]*|\.[0-9]+|[0-9]+)(?:[eE][+-]?[0-9]+)?)")
        .expect("float prefix pattern is valid")
});

static HEX_STRING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*0[xX]([0-9a-fA-F]+)").expect("hex string pattern is valid"));

static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(^|[^\\])(\$[A-Za-z_\x7f-\x{ff}{]|\{\$)").expect("interpolation pattern is valid")
});

/// Result of evaluating a token span
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NumericValue {
    Number(f64),
    /// The span is not a literal PHP could coerce without running the code
    Undetermined,
}

impl NumericValue {
    pub fn as_number(self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(value),
            Self::Undetermined => None,
        }
    }

    pub fn is_determined(self) -> bool {
        matches!(self, Self::Number(_))
    }
}

/// Evaluates literal token spans against one stream
pub struct NumericEvaluator<'a> {
    stream: &'a TokenStream,
    gate: &'a VersionGate,
}

impl<'a> NumericEvaluator<'a> {
    pub fn new(stream: &'a TokenStream, gate: &'a VersionGate) -> Self {
        Self { stream, gate }
    }

    /// Evaluate `[start, end]`.
    ///
    /// Accepts any number of leading unary `+`/`-`, then a single literal
    /// (integer, float when `allow_floats`, `true`/`false`/`null`, or a
    /// string). Without `allow_floats` the result is truncated to an integer.
    pub fn evaluate(&self, start: usize, end: usize, allow_floats: bool) -> NumericValue {
        let stream = self.stream;
        if end >= stream.len() || start > end {
            return NumericValue::Undetermined;
        }
        let bound = Some(end + 1);

        let Some(mut index) = stream.find_next_except(TokenKind::EMPTY, start, bound) else {
            return NumericValue::Undetermined;
        };

        let mut negative = false;
        while matches!(stream[index].kind, TokenKind::Plus | TokenKind::Minus) {
            if stream[index].kind == TokenKind::Minus {
                negative = !negative;
            }
            index = match stream.find_next_except(TokenKind::EMPTY, index + 1, bound) {
                Some(next) => next,
                None => return NumericValue::Undetermined,
            };
        }

        let Some((value, last)) = self.literal(index, end, allow_floats) else {
            return NumericValue::Undetermined;
        };

        // Anything after the literal makes it an expression
        if stream.find_next_except(TokenKind::EMPTY, last + 1, bound).is_some() {
            return NumericValue::Undetermined;
        }

        let value = if negative { -value } else { value };
        let value = if allow_floats { value } else { value.trunc() };
        NumericValue::Number(value)
    }

    /// `Some(true)` when the span is a positive number, `None` when undetermined
    pub fn is_positive(&self, start: usize, end: usize, allow_floats: bool) -> Option<bool> {
        self.evaluate(start, end, allow_floats)
            .as_number()
            .map(|value| value > 0.0)
    }

    /// `Some(true)` when the span is a negative number, `None` when undetermined
    pub fn is_negative(&self, start: usize, end: usize, allow_floats: bool) -> Option<bool> {
        self.evaluate(start, end, allow_floats)
            .as_number()
            .map(|value| value < 0.0)
    }

    /// Whether `[start, end]` is arithmetic over literals only, e.g. `1 + 2 * 3`
    pub fn is_numeric_calculation(&self, start: usize, end: usize) -> bool {
        let stream = self.stream;
        if end >= stream.len() || start > end {
            return false;
        }

        let mut operand_seen = false;
        let mut operator_seen = false;

        for index in start..=end {
            let kind = stream[index].kind;
            match kind {
                k if k.is_empty() => {}
                TokenKind::LNumber | TokenKind::DNumber | TokenKind::True | TokenKind::False | TokenKind::Null => {
                    operand_seen = true
                }
                TokenKind::OpenParen | TokenKind::CloseParen => {}
                k if TokenKind::ARITHMETIC.contains(&k) => {
                    // Leading signs are unary, not a calculation
                    if operand_seen {
                        operator_seen = true;
                    }
                }
                _ => return false,
            }
        }

        operand_seen && operator_seen
    }

    /// Value of the literal starting at `index` and the index of its last token
    fn literal(&self, index: usize, end: usize, allow_floats: bool) -> Option<(f64, usize)> {
        let stream = self.stream;
        let token = &stream[index];

        match token.kind {
            TokenKind::LNumber => Some((parse_int_literal(&token.text)?, index)),
            TokenKind::DNumber if allow_floats => {
                let text: String = token.text.chars().filter(|c| *c != '_').collect();
                Some((text.parse().ok()?, index))
            }
            TokenKind::True => Some((1.0, index)),
            TokenKind::False | TokenKind::Null => Some((0.0, index)),
            TokenKind::ConstantString => {
                let mut last = index;
                let mut text = token.text.clone();
                while last < end && stream[last + 1].kind == TokenKind::ConstantString {
                    last += 1;
                    text.push_str(&stream[last].text);
                }
                let content = unquote(&text)?;
                Some((self.coerce(&content, allow_floats)?, last))
            }
            TokenKind::StartHeredoc | TokenKind::StartNowdoc => {
                let (body, close) = if token.kind == TokenKind::StartHeredoc {
                    (TokenKind::Heredoc, TokenKind::EndHeredoc)
                } else {
                    (TokenKind::Nowdoc, TokenKind::EndNowdoc)
                };

                let mut content = String::new();
                let mut last = index + 1;
                while last <= end && stream[last].kind == body {
                    content.push_str(&stream[last].text);
                    last += 1;
                }
                if last > end || stream[last].kind != close {
                    return None;
                }
                if body == TokenKind::Heredoc && INTERPOLATION.is_match(&content) {
                    return None;
                }

                // The newline before the closing label is not part of the string
                let content = content.strip_suffix('\n').unwrap_or(&content);
                let content = content.strip_suffix('\r').unwrap_or(content);
                Some((self.coerce(content, allow_floats)?, last))
            }
            _ => None,
        }
    }

    /// PHP loose string-to-number coercion
    fn coerce(&self, content: &str, allow_floats: bool) -> Option<f64> {
        // Hex strings were numeric before PHP 7
        if let Some(hex) = HEX_STRING.captures(content) {
            if self.gate.includes_at_or_below(Version::new(5, 6)) {
                let digits = hex.get(1)?.as_str();
                return i64::from_str_radix(digits, 16).ok().map(|value| value as f64);
            }
        }

        if allow_floats {
            return Some(match FLOAT_PREFIX.captures(content) {
                Some(number) => number.get(1)?.as_str().parse().ok()?,
                None => 0.0,
            });
        }

        if let Some(number) = FLOAT_PREFIX.captures(content) {
            let text = number.get(1)?.as_str();
            if text.contains(['.', 'e', 'E']) {
                return None;
            }
        }

        Some(match INT_PREFIX.captures(content) {
            Some(number) => number.get(1)?.as_str().parse::<f64>().ok()?,
            None => 0.0,
        })
    }
}

/// Parse an integer literal in any PHP notation
fn parse_int_literal(text: &str) -> Option<f64> {
    let digits: String = text.chars().filter(|c| *c != '_').collect();
    let lower = digits.to_ascii_lowercase();

    let parsed = if let Some(hex) = lower.strip_prefix("0x") {
        i64::from_str_radix(hex, 16)
    } else if let Some(binary) = lower.strip_prefix("0b") {
        i64::from_str_radix(binary, 2)
    } else if let Some(octal) = lower.strip_prefix("0o") {
        i64::from_str_radix(octal, 8)
    } else if lower.len() > 1 && lower.starts_with('0') {
        i64::from_str_radix(&lower[1..], 8)
    } else {
        lower.parse::<i64>()
    };

    parsed.ok().map(|value| value as f64)
}

/// Strip the quotes (and a binary `b` prefix) from a string literal
pub(crate) fn unquote(text: &str) -> Option<String> {
    let text = text.strip_prefix(['b', 'B']).unwrap_or(text);
    let quote = text.chars().next()?;
    if !matches!(quote, '\'' | '"') || text.len() < 2 || !text.ends_with(quote) {
        return None;
    }
    Some(text[1..text.len() - 1].to_string())
}
