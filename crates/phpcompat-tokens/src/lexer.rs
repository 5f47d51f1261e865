//! Reference PHP lexer
//!
//! Produces the flat token list consumed by the rules. Multi-line string
//! literals, comments, inline HTML and heredoc/nowdoc bodies are split into
//! one token per line. A parser version can be set to reproduce older
//! tokenizers that emit newer keywords as plain identifiers.

use crate::keywords;
use crate::stream::TokenStream;
use crate::token::{Token, TokenKind};
use phpcompat_core::Version;
use regex::Regex;
use std::sync::LazyLock;

static CAST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^\([ \t]*(int|integer|bool|boolean|float|double|real|string|binary|array|object|unset)[ \t]*\)",
    )
    .expect("cast pattern is valid")
});

static HEREDOC_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^<<<[ \t]*(["']?)([A-Za-z_][A-Za-z0-9_]*)(["']?)\r?\n"#)
        .expect("heredoc pattern is valid")
});

/// Operators, longest first
const OPERATORS: &[(&str, TokenKind)] = &[
    ("===", TokenKind::IsIdentical),
    ("!==", TokenKind::IsNotIdentical),
    ("<=>", TokenKind::Spaceship),
    ("**=", TokenKind::PowEqual),
    ("...", TokenKind::Ellipsis),
    ("<<=", TokenKind::SlEqual),
    (">>=", TokenKind::SrEqual),
    ("??=", TokenKind::CoalesceEqual),
    ("?->", TokenKind::NullsafeObjectOperator),
    ("==", TokenKind::IsEqual),
    ("!=", TokenKind::IsNotEqual),
    ("<>", TokenKind::IsNotEqual),
    ("<=", TokenKind::IsSmallerOrEqual),
    (">=", TokenKind::IsGreaterOrEqual),
    ("&&", TokenKind::BooleanAnd),
    ("||", TokenKind::BooleanOr),
    ("++", TokenKind::Inc),
    ("--", TokenKind::Dec),
    ("+=", TokenKind::PlusEqual),
    ("-=", TokenKind::MinusEqual),
    ("*=", TokenKind::MulEqual),
    ("/=", TokenKind::DivEqual),
    (".=", TokenKind::ConcatEqual),
    ("%=", TokenKind::ModEqual),
    ("&=", TokenKind::AndEqual),
    ("|=", TokenKind::OrEqual),
    ("^=", TokenKind::XorEqual),
    ("<<", TokenKind::Sl),
    (">>", TokenKind::Sr),
    ("??", TokenKind::Coalesce),
    ("->", TokenKind::ObjectOperator),
    ("=>", TokenKind::DoubleArrow),
    ("::", TokenKind::DoubleColon),
    ("**", TokenKind::Pow),
    (";", TokenKind::Semicolon),
    (",", TokenKind::Comma),
    ("(", TokenKind::OpenParen),
    (")", TokenKind::CloseParen),
    ("[", TokenKind::OpenSquareBracket),
    ("]", TokenKind::CloseSquareBracket),
    ("{", TokenKind::OpenCurly),
    ("}", TokenKind::CloseCurly),
    ("=", TokenKind::Equal),
    ("+", TokenKind::Plus),
    ("-", TokenKind::Minus),
    ("*", TokenKind::Multiply),
    ("/", TokenKind::Divide),
    ("%", TokenKind::Modulus),
    (".", TokenKind::StringConcat),
    ("!", TokenKind::BooleanNot),
    ("&", TokenKind::BitwiseAnd),
    ("|", TokenKind::BitwiseOr),
    ("^", TokenKind::BitwiseXor),
    ("~", TokenKind::BitwiseNot),
    ("<", TokenKind::LessThan),
    (">", TokenKind::GreaterThan),
    ("?", TokenKind::InlineThen),
    (":", TokenKind::Colon),
    ("@", TokenKind::Asperand),
    ("\\", TokenKind::NsSeparator),
];

/// Lexer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("Unterminated {what} starting at line {line}, column {column}")]
    Unterminated {
        what: &'static str,
        line: usize,
        column: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Inline HTML outside `<?php ... ?>`
    Html,
    /// Inside PHP code
    Script,
}

/// PHP lexer
pub struct Lexer<'src> {
    /// Source code being tokenized
    source: &'src str,
    /// Current byte position
    pos: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column (1-indexed, byte offset within line)
    column: usize,
    state: State,
    /// Emulated tokenizer version; `None` knows every keyword
    parser_version: Option<Version>,
    tokens: Vec<Token>,
    /// `__halt_compiler` seen; the rest of the file is data
    halted: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            source,
            pos: 0,
            line: 1,
            column: 1,
            state: State::Html,
            parser_version: None,
            tokens: Vec::new(),
            halted: false,
        }
    }

    /// Emulate the tokenizer shipped with `version`
    pub fn with_parser_version(mut self, version: Version) -> Self {
        self.parser_version = Some(version);
        self
    }

    /// Tokenize and annotate the whole source
    pub fn tokenize(self) -> Result<TokenStream, LexError> {
        Ok(TokenStream::new(self.lex()?))
    }

    /// Tokenize without computing side tables
    pub fn lex(mut self) -> Result<Vec<Token>, LexError> {
        while self.pos < self.source.len() {
            match self.state {
                State::Html => self.lex_html(),
                State::Script => self.lex_script()?,
            }

            if self.halted
                && self
                    .tokens
                    .last()
                    .is_some_and(|t| matches!(t.kind, TokenKind::Semicolon | TokenKind::CloseTag))
            {
                let rest = self.source.len() - self.pos;
                if rest > 0 {
                    self.push(TokenKind::InlineHtml, rest);
                }
                break;
            }
        }

        let mut tokens = self.tokens;
        classify(&mut tokens);
        tracing::trace!(tokens = tokens.len(), "Tokenized source");
        Ok(tokens)
    }

    fn rest(&self) -> &'src str {
        &self.source[self.pos..]
    }

    fn knows(&self, since: Version) -> bool {
        self.parser_version.map_or(true, |version| version >= since)
    }

    /// Emit `len` bytes as one token and advance past them
    fn push(&mut self, kind: TokenKind, len: usize) {
        let text = &self.source[self.pos..self.pos + len];
        self.tokens.push(Token::new(kind, text, self.line, self.column));
        self.advance(len);
    }

    /// Emit `len` bytes as one token per line
    fn push_lines(&mut self, kind: TokenKind, len: usize) {
        let text = &self.source[self.pos..self.pos + len];
        for piece in text.split_inclusive('\n') {
            self.push(kind, piece.len());
        }
    }

    fn advance(&mut self, len: usize) {
        for byte in self.source[self.pos..self.pos + len].bytes() {
            if byte == b'\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.pos += len;
    }

    fn unterminated(&self, what: &'static str) -> LexError {
        LexError::Unterminated {
            what,
            line: self.line,
            column: self.column,
        }
    }

    fn lex_html(&mut self) {
        let rest = self.rest();
        let bytes = rest.as_bytes();

        let open = rest.match_indices("<?").find_map(|(at, _)| {
            let tail = &bytes[at..];
            if tail.len() >= 5
                && tail[..5].eq_ignore_ascii_case(b"<?php")
                && tail.get(5).map_or(true, |b| b.is_ascii_whitespace())
            {
                Some((at, TokenKind::OpenTag, 5))
            } else if tail.starts_with(b"<?=") {
                Some((at, TokenKind::OpenTagWithEcho, 3))
            } else {
                None
            }
        });

        let Some((at, kind, mut len)) = open else {
            self.push_lines(TokenKind::InlineHtml, rest.len());
            return;
        };

        if at > 0 {
            self.push_lines(TokenKind::InlineHtml, at);
        }

        // `<?php` swallows a single trailing newline or space
        if kind == TokenKind::OpenTag {
            let after = &bytes[at + len..];
            if after.starts_with(b"\r\n") {
                len += 2;
            } else if after.first().is_some_and(|b| b.is_ascii_whitespace()) {
                len += 1;
            }
        }

        self.push(kind, len);
        self.state = State::Script;
    }

    fn lex_script(&mut self) -> Result<(), LexError> {
        let rest = self.rest();
        let bytes = rest.as_bytes();
        let first = bytes[0];

        if first.is_ascii_whitespace() {
            let len = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
            self.push(TokenKind::Whitespace, len);
            return Ok(());
        }

        if rest.starts_with("?>") {
            let len = if rest[2..].starts_with("\r\n") {
                4
            } else if rest[2..].starts_with('\n') {
                3
            } else {
                2
            };
            self.push(TokenKind::CloseTag, len);
            self.state = State::Html;
            return Ok(());
        }

        if rest.starts_with("#[") && self.knows(Version::new(8, 0)) {
            self.push(TokenKind::Attribute, 2);
            return Ok(());
        }

        if first == b'#' || rest.starts_with("//") {
            let newline = rest.find('\n').unwrap_or(rest.len());
            let close_tag = rest.find("?>").unwrap_or(rest.len());
            let len = newline.min(close_tag);
            let len = if rest[..len].ends_with('\r') { len - 1 } else { len };
            self.push(TokenKind::Comment, len);
            return Ok(());
        }

        if rest.starts_with("/*") {
            let end = rest[2..].find("*/").ok_or_else(|| self.unterminated("comment"))?;
            let len = end + 4;
            let kind = if rest.starts_with("/**") && bytes.get(3).is_some_and(|b| b.is_ascii_whitespace()) {
                TokenKind::DocComment
            } else {
                TokenKind::Comment
            };
            self.push_lines(kind, len);
            return Ok(());
        }

        if first == b'$' {
            let name = ident_len(&bytes[1..]);
            if name > 0 {
                self.push(TokenKind::Variable, 1 + name);
            } else {
                self.push(TokenKind::Dollar, 1);
            }
            return Ok(());
        }

        // b"..." / b'...'
        if matches!(first, b'b' | b'B') && matches!(bytes.get(1), Some(b'\'' | b'"')) {
            return self.lex_string(1);
        }

        if is_ident_start(first) {
            self.lex_word(ident_len(bytes));
            return Ok(());
        }

        if first.is_ascii_digit() || (first == b'.' && bytes.get(1).is_some_and(u8::is_ascii_digit)) {
            self.lex_number();
            return Ok(());
        }

        match first {
            b'\'' | b'"' => return self.lex_string(0),
            b'`' => return self.lex_backtick(),
            _ => {}
        }

        if rest.starts_with("<<<") {
            if let Some(captures) = HEREDOC_START.captures(rest) {
                let open_quote = captures.get(1).map_or("", |m| m.as_str());
                let close_quote = captures.get(3).map_or("", |m| m.as_str());
                if open_quote == close_quote {
                    let label = captures.get(2).map_or("", |m| m.as_str()).to_string();
                    let header = captures.get(0).map_or(0, |m| m.len());
                    return self.lex_heredoc(header, &label, open_quote == "'");
                }
            }
        }

        if first == b'(' {
            if let Some(cast) = CAST.captures(rest) {
                let len = cast.get(0).map_or(0, |m| m.len());
                let kind = match cast.get(1).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
                    Some("int" | "integer") => TokenKind::IntCast,
                    Some("bool" | "boolean") => TokenKind::BoolCast,
                    Some("float" | "double" | "real") => TokenKind::DoubleCast,
                    Some("string") => TokenKind::StringCast,
                    Some("binary") => TokenKind::BinaryCast,
                    Some("array") => TokenKind::ArrayCast,
                    Some("object") => TokenKind::ObjectCast,
                    _ => TokenKind::UnsetCast,
                };
                self.push(kind, len);
                return Ok(());
            }
        }

        if let Some((op, kind)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) {
            self.push(*kind, op.len());
            return Ok(());
        }

        let len = rest.chars().next().map_or(1, char::len_utf8);
        self.push(TokenKind::BadCharacter, len);
        Ok(())
    }

    fn lex_word(&mut self, len: usize) {
        let rest = self.rest();
        let lower = rest[..len].to_ascii_lowercase();
        let kind = self.word_kind(&lower, len);

        if kind == TokenKind::Yield && self.knows(Version::new(7, 0)) {
            let after = &rest.as_bytes()[len..];
            let gap = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
            let from = &after[gap..];
            if gap > 0
                && from.len() >= 4
                && from[..4].eq_ignore_ascii_case(b"from")
                && !from.get(4).copied().is_some_and(is_ident_byte)
            {
                self.push(TokenKind::YieldFrom, len + gap + 4);
                return;
            }
        }

        if kind == TokenKind::HaltCompiler {
            self.halted = true;
        }

        self.push(kind, len);
    }

    fn word_kind(&self, lower: &str, len: usize) -> TokenKind {
        let prev = last_significant(&self.tokens);

        // $obj->list, Foo::class
        if prev.is_some_and(|(_, kind)| kind.is_member_access()) {
            return TokenKind::Identifier;
        }

        let Some(kind) = keyword_kind(lower) else {
            return TokenKind::Identifier;
        };

        if matches!(kind, TokenKind::True | TokenKind::False | TokenKind::Null) {
            return kind;
        }

        // function list(), function &print(), const FINAL
        if let Some((at, prev)) = prev {
            let declared = match prev {
                TokenKind::Function | TokenKind::Const => true,
                TokenKind::BitwiseAnd => last_significant(&self.tokens[..at])
                    .is_some_and(|(_, kind)| kind == TokenKind::Function),
                _ => false,
            };
            if declared {
                return TokenKind::Identifier;
            }
        }

        if let Some(legacy) = keywords::lookup(lower) {
            if !self.knows(legacy.since) {
                return TokenKind::Identifier;
            }
        }

        // `enum` is only a keyword when a name follows
        if kind == TokenKind::Enum {
            let after = &self.rest().as_bytes()[len..];
            let gap = after.iter().take_while(|b| b.is_ascii_whitespace()).count();
            if gap == 0 || !after.get(gap).copied().is_some_and(is_ident_start) {
                return TokenKind::Identifier;
            }
        }

        kind
    }

    fn lex_number(&mut self) {
        let bytes = self.rest().as_bytes();

        if bytes[0] == b'0' {
            let radix = match bytes.get(1) {
                Some(b'x' | b'X') => Some(16),
                Some(b'b' | b'B') => Some(2),
                Some(b'o' | b'O') => Some(8),
                _ => None,
            };
            if let Some(radix) = radix {
                let digits = bytes[2..]
                    .iter()
                    .take_while(|b| **b == b'_' || char::from(**b).is_digit(radix))
                    .count();
                if digits > 0 {
                    self.push(TokenKind::LNumber, 2 + digits);
                    return;
                }
            }
        }

        let decimal = |from: usize| {
            bytes[from..]
                .iter()
                .take_while(|b| b.is_ascii_digit() || **b == b'_')
                .count()
        };

        let mut len = decimal(0);
        let mut float = false;

        if bytes.get(len) == Some(&b'.') && bytes.get(len + 1) != Some(&b'.') {
            float = true;
            len += 1;
            len += decimal(len);
        }

        if matches!(bytes.get(len), Some(b'e' | b'E')) {
            let sign = usize::from(matches!(bytes.get(len + 1), Some(b'+' | b'-')));
            let exponent = decimal(len + 1 + sign);
            if exponent > 0 {
                float = true;
                len += 1 + sign + exponent;
            }
        }

        // Integers beyond i64 are floats
        if !float {
            let text: String = self.rest()[..len].chars().filter(|c| *c != '_').collect();
            let fits = if text.len() > 1 && text.starts_with('0') {
                i64::from_str_radix(&text[1..], 8).is_ok()
            } else {
                text.parse::<i64>().is_ok()
            };
            float = !fits && text.bytes().all(|b| b.is_ascii_digit());
        }

        let kind = if float { TokenKind::DNumber } else { TokenKind::LNumber };
        self.push(kind, len);
    }

    /// Quoted string starting after `prefix` bytes (`b` for binary strings)
    fn lex_string(&mut self, prefix: usize) -> Result<(), LexError> {
        let bytes = self.rest().as_bytes();
        let quote = bytes[prefix];
        let body_start = prefix + 1;

        let mut index = body_start;
        let mut interpolated = false;
        loop {
            match bytes.get(index) {
                None => return Err(self.unterminated("string")),
                Some(b'\\') => index += 2,
                Some(&b) if b == quote => break,
                Some(b'$') if quote == b'"' => {
                    if bytes.get(index + 1).is_some_and(|b| is_ident_start(*b) || *b == b'{') {
                        interpolated = true;
                    }
                    index += 1;
                }
                Some(b'{') if quote == b'"' => {
                    if bytes.get(index + 1) == Some(&b'$') {
                        interpolated = true;
                    }
                    index += 1;
                }
                Some(_) => index += 1,
            }
        }

        let kind = if interpolated {
            TokenKind::DoubleQuotedString
        } else {
            TokenKind::ConstantString
        };
        self.push_lines(kind, index + 1);
        Ok(())
    }

    fn lex_backtick(&mut self) -> Result<(), LexError> {
        let bytes = self.rest().as_bytes();
        let mut index = 1;
        loop {
            match bytes.get(index) {
                None => return Err(self.unterminated("shell command")),
                Some(b'\\') => index += 2,
                Some(b'`') => break,
                Some(_) => index += 1,
            }
        }

        self.push(TokenKind::Backtick, 1);
        if index > 1 {
            self.push_lines(TokenKind::DoubleQuotedString, index - 1);
        }
        self.push(TokenKind::Backtick, 1);
        Ok(())
    }

    fn lex_heredoc(&mut self, header: usize, label: &str, nowdoc: bool) -> Result<(), LexError> {
        let (start, body, end) = if nowdoc {
            (TokenKind::StartNowdoc, TokenKind::Nowdoc, TokenKind::EndNowdoc)
        } else {
            (TokenKind::StartHeredoc, TokenKind::Heredoc, TokenKind::EndHeredoc)
        };

        let (line, column) = (self.line, self.column);
        self.push(start, header);

        loop {
            let rest = self.rest();
            if rest.is_empty() {
                return Err(LexError::Unterminated {
                    what: if nowdoc { "nowdoc" } else { "heredoc" },
                    line,
                    column,
                });
            }

            let indent = rest
                .bytes()
                .take_while(|b| *b == b' ' || *b == b'\t')
                .count();
            let candidate = &rest[indent..];
            if candidate.starts_with(label)
                && !candidate.as_bytes().get(label.len()).copied().is_some_and(is_ident_byte)
            {
                self.push(end, indent + label.len());
                return Ok(());
            }

            let len = rest.find('\n').map_or(rest.len(), |at| at + 1);
            self.push(body, len);
        }
    }
}

fn is_ident_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte >= 0x80
}

fn is_ident_byte(byte: u8) -> bool {
    is_ident_start(byte) || byte.is_ascii_digit()
}

fn ident_len(bytes: &[u8]) -> usize {
    match bytes.first() {
        Some(&b) if is_ident_start(b) => bytes.iter().take_while(|b| is_ident_byte(**b)).count(),
        _ => 0,
    }
}

/// Index and kind of the last token that is not whitespace or a comment
fn last_significant(tokens: &[Token]) -> Option<(usize, TokenKind)> {
    tokens
        .iter()
        .enumerate()
        .rev()
        .find(|(_, token)| !token.kind.is_empty())
        .map(|(index, token)| (index, token.kind))
}

fn keyword_kind(word: &str) -> Option<TokenKind> {
    use TokenKind::*;

    Some(match word {
        "abstract" => Abstract,
        "and" => LogicalAnd,
        "array" => Array,
        "as" => As,
        "break" => Break,
        "callable" => Callable,
        "case" => Case,
        "catch" => Catch,
        "class" => Class,
        "clone" => Clone,
        "const" => Const,
        "continue" => Continue,
        "declare" => Declare,
        "default" => Default,
        "die" | "exit" => Exit,
        "do" => Do,
        "echo" => Echo,
        "else" => Else,
        "elseif" => ElseIf,
        "empty" => Empty,
        "enddeclare" => EndDeclare,
        "endfor" => EndFor,
        "endforeach" => EndForeach,
        "endif" => EndIf,
        "endswitch" => EndSwitch,
        "endwhile" => EndWhile,
        "enum" => Enum,
        "eval" => Eval,
        "extends" => Extends,
        "final" => Final,
        "finally" => Finally,
        "fn" => Fn,
        "for" => For,
        "foreach" => Foreach,
        "function" => Function,
        "global" => Global,
        "goto" => Goto,
        "if" => If,
        "implements" => Implements,
        "include" => Include,
        "include_once" => IncludeOnce,
        "instanceof" => Instanceof,
        "insteadof" => Insteadof,
        "interface" => Interface,
        "isset" => Isset,
        "list" => List,
        "match" => Match,
        "namespace" => Namespace,
        "new" => New,
        "or" => LogicalOr,
        "print" => Print,
        "private" => Private,
        "protected" => Protected,
        "public" => Public,
        "readonly" => Readonly,
        "require" => Require,
        "require_once" => RequireOnce,
        "return" => Return,
        "static" => Static,
        "switch" => Switch,
        "throw" => Throw,
        "trait" => Trait,
        "try" => Try,
        "unset" => Unset,
        "use" => Use,
        "var" => Var,
        "while" => While,
        "xor" => LogicalXor,
        "yield" => Yield,
        "true" => True,
        "false" => False,
        "null" => Null,
        "__halt_compiler" => HaltCompiler,
        "__line__" => Line,
        "__file__" => File,
        "__dir__" => Dir,
        "__class__" => ClassC,
        "__function__" => FuncC,
        "__method__" => MethodC,
        "__namespace__" => NsC,
        "__trait__" => TraitC,
        _ => return None,
    })
}

/// Context-dependent reclassification after lexing
fn classify(tokens: &mut [Token]) {
    // Closer kind to emit for each unclosed `[` / `#[`
    let mut brackets: Vec<TokenKind> = Vec::new();

    for index in 0..tokens.len() {
        match tokens[index].kind {
            TokenKind::Function => {
                let next = next_significant(tokens, index);
                let closure = match next.map(|n| (n, tokens[n].kind)) {
                    Some((_, TokenKind::OpenParen)) => true,
                    Some((amp, TokenKind::BitwiseAnd)) => next_significant(tokens, amp)
                        .is_some_and(|n| tokens[n].kind == TokenKind::OpenParen),
                    _ => false,
                };
                if closure {
                    tokens[index].kind = TokenKind::Closure;
                }
            }
            TokenKind::Class => {
                if last_significant(&tokens[..index]).is_some_and(|(_, kind)| kind == TokenKind::New) {
                    tokens[index].kind = TokenKind::AnonClass;
                }
            }
            TokenKind::OpenSquareBracket => {
                let access = last_significant(&tokens[..index]).is_some_and(|(_, kind)| {
                    matches!(
                        kind,
                        TokenKind::Variable
                            | TokenKind::CloseSquareBracket
                            | TokenKind::CloseShortArray
                            | TokenKind::CloseParen
                            | TokenKind::Identifier
                            | TokenKind::ConstantString
                            | TokenKind::DoubleQuotedString
                    )
                });
                if access {
                    brackets.push(TokenKind::CloseSquareBracket);
                } else {
                    tokens[index].kind = TokenKind::OpenShortArray;
                    brackets.push(TokenKind::CloseShortArray);
                }
            }
            TokenKind::Attribute => brackets.push(TokenKind::CloseSquareBracket),
            TokenKind::CloseSquareBracket => {
                if let Some(kind) = brackets.pop() {
                    tokens[index].kind = kind;
                }
            }
            _ => {}
        }
    }
}

fn next_significant(tokens: &[Token], index: usize) -> Option<usize> {
    (index + 1..tokens.len()).find(|&i| !tokens[i].kind.is_empty())
}
