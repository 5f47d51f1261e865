//! Annotated token stream
//!
//! `TokenStream::new` computes every navigation side table once. After
//! construction the stream is immutable; rules only read it.

use crate::token::{Token, TokenKind};
use std::ops::Index;

/// Keywords that own the parenthesis pair following them
const PAREN_OWNERS: &[TokenKind] = &[
    TokenKind::Function,
    TokenKind::Closure,
    TokenKind::Fn,
    TokenKind::If,
    TokenKind::ElseIf,
    TokenKind::For,
    TokenKind::Foreach,
    TokenKind::While,
    TokenKind::Switch,
    TokenKind::Catch,
    TokenKind::Declare,
    TokenKind::Match,
    TokenKind::Array,
    TokenKind::List,
    TokenKind::Isset,
    TokenKind::Empty,
    TokenKind::Unset,
    TokenKind::Eval,
    TokenKind::Exit,
    TokenKind::Use,
    TokenKind::AnonClass,
];

/// Owners whose pending scope is abandoned by a `:` (alternative syntax)
const ALT_SYNTAX_OWNERS: &[TokenKind] = &[
    TokenKind::If,
    TokenKind::ElseIf,
    TokenKind::Else,
    TokenKind::For,
    TokenKind::Foreach,
    TokenKind::While,
    TokenKind::Switch,
    TokenKind::Declare,
];

/// A flat token sequence with bracket, parenthesis and scope metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    tokens: Vec<Token>,
}

impl TokenStream {
    /// Annotate `tokens` and freeze them into a stream
    pub fn new(tokens: Vec<Token>) -> Self {
        let mut annotator = Annotator {
            tokens,
            open: Vec::new(),
            scopes: Vec::new(),
            pending: Vec::new(),
        };
        annotator.run();

        Self {
            tokens: annotator.tokens,
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Token> {
        self.tokens.get(index)
    }

    /// Kind of the token at `index`, if in bounds
    pub fn kind(&self, index: usize) -> Option<TokenKind> {
        self.tokens.get(index).map(|token| token.kind)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn iter(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter()
    }

    /// For an opener, the index of its closer (paren, bracket or brace)
    pub fn closer_of(&self, index: usize) -> Option<usize> {
        let token = self.tokens.get(index)?;
        if !token.kind.is_opener() {
            return None;
        }
        token.matching_paren.or(token.matching_bracket)
    }

    /// For a closer, the index of its opener
    pub fn opener_of(&self, index: usize) -> Option<usize> {
        let token = self.tokens.get(index)?;
        if !token.kind.is_closer() {
            return None;
        }
        token.matching_paren.or(token.matching_bracket)
    }

    /// Innermost scope owner enclosing `index`
    pub fn direct_scope(&self, index: usize) -> Option<usize> {
        self.tokens.get(index)?.enclosing_scopes.last().copied()
    }

    /// Innermost class-like scope owner enclosing `index`
    pub fn enclosing_oo_scope(&self, index: usize) -> Option<usize> {
        self.tokens
            .get(index)?
            .enclosing_scopes
            .iter()
            .rev()
            .copied()
            .find(|&owner| self.tokens[owner].kind.is_oo_scope())
    }

    /// Whether `index` sits directly inside a class-like body
    pub fn is_in_oo_body(&self, index: usize) -> bool {
        self.direct_scope(index)
            .is_some_and(|owner| self.tokens[owner].kind.is_oo_scope())
    }

    /// Whether `index` is outside every function and class-like scope
    pub fn is_global_scope(&self, index: usize) -> bool {
        self.tokens.get(index).is_some_and(|token| {
            token.enclosing_scopes.iter().all(|&owner| {
                let kind = self.tokens[owner].kind;
                !kind.is_oo_scope() && kind != TokenKind::Function && kind != TokenKind::Closure
            })
        })
    }
}

impl Index<usize> for TokenStream {
    type Output = Token;

    fn index(&self, index: usize) -> &Self::Output {
        &self.tokens[index]
    }
}

impl From<Vec<Token>> for TokenStream {
    fn from(tokens: Vec<Token>) -> Self {
        Self::new(tokens)
    }
}

/// One-pass side-table builder
struct Annotator {
    tokens: Vec<Token>,
    /// Indexes of every unclosed opener, innermost last
    open: Vec<usize>,
    /// Owners of the scopes currently open, innermost last
    scopes: Vec<usize>,
    /// Scope owners waiting for their `{`, with the nesting depth they were seen at
    pending: Vec<(usize, usize)>,
}

impl Annotator {
    fn run(&mut self) {
        for index in 0..self.tokens.len() {
            let kind = self.tokens[index].kind;

            if kind.is_closer() {
                self.close(index, kind);
                self.annotate(index);
                continue;
            }

            self.annotate(index);

            match kind {
                TokenKind::OpenParen => self.open_paren(index),
                TokenKind::OpenCurly => self.open_curly(index),
                TokenKind::OpenSquareBracket | TokenKind::OpenShortArray | TokenKind::Attribute => {
                    self.open.push(index)
                }
                TokenKind::Semicolon => self.drop_pending(),
                TokenKind::Colon => {
                    let depth = self.open.len();
                    if let Some(&(owner, at)) = self.pending.last() {
                        if at == depth && ALT_SYNTAX_OWNERS.contains(&self.tokens[owner].kind) {
                            self.pending.pop();
                        }
                    }
                }
                kind if kind.is_scope_owner() => self.push_owner(index, kind),
                _ => {}
            }
        }
    }

    fn annotate(&mut self, index: usize) {
        let parens: Vec<usize> = self
            .open
            .iter()
            .copied()
            .filter(|&opener| self.tokens[opener].kind == TokenKind::OpenParen)
            .collect();
        let token = &mut self.tokens[index];
        token.enclosing_parens = parens;
        token.enclosing_scopes = self.scopes.clone();
    }

    fn push_owner(&mut self, index: usize, kind: TokenKind) {
        let next = self.next_non_empty(index);

        // `namespace\foo()` is a relative name, not a declaration
        if kind == TokenKind::Namespace
            && next.is_some_and(|n| self.tokens[n].kind == TokenKind::NsSeparator)
        {
            return;
        }

        // `else if` hands the scope to the `if`
        if kind == TokenKind::If {
            if let Some(&(owner, _)) = self.pending.last() {
                if self.tokens[owner].kind == TokenKind::Else {
                    self.pending.pop();
                }
            }
        }

        self.pending.push((index, self.open.len()));
    }

    fn open_paren(&mut self, index: usize) {
        if let Some(owner) = self.paren_owner(index) {
            self.tokens[index].paren_owner = Some(owner);
        }
        self.open.push(index);
    }

    fn paren_owner(&self, index: usize) -> Option<usize> {
        let prev = self.prev_non_empty(index)?;
        let kind = self.tokens[prev].kind;

        if PAREN_OWNERS.contains(&kind) {
            return Some(prev);
        }

        // function foo( / function &foo(
        if kind == TokenKind::Identifier {
            let before = self.prev_non_empty(prev)?;
            let before = if self.tokens[before].kind == TokenKind::BitwiseAnd {
                self.prev_non_empty(before)?
            } else {
                before
            };
            if self.tokens[before].kind == TokenKind::Function {
                return Some(before);
            }
        }

        None
    }

    fn open_curly(&mut self, index: usize) {
        let depth = self.open.len();
        if let Some(&(owner, at)) = self.pending.last() {
            if at == depth {
                self.pending.pop();
                self.tokens[index].scope_owner = Some(owner);
                self.tokens[index].scope_opener = Some(index);
                self.tokens[owner].scope_opener = Some(index);
                self.scopes.push(owner);
            }
        }
        self.open.push(index);
    }

    fn close(&mut self, index: usize, kind: TokenKind) {
        let Some(position) = self
            .open
            .iter()
            .rposition(|&opener| pairs_with(self.tokens[opener].kind, kind))
        else {
            return;
        };

        // Anything opened after the matching opener was never closed
        self.open.truncate(position + 1);
        let Some(opener) = self.open.pop() else {
            return;
        };

        match kind {
            TokenKind::CloseParen => {
                let owner = self.tokens[opener].paren_owner;
                self.tokens[opener].matching_paren = Some(index);
                let token = &mut self.tokens[index];
                token.matching_paren = Some(opener);
                token.paren_owner = owner;
            }
            _ => {
                self.tokens[opener].matching_bracket = Some(index);
                self.tokens[index].matching_bracket = Some(opener);
            }
        }

        if kind == TokenKind::CloseCurly {
            if let Some(owner) = self.tokens[opener].scope_owner {
                self.tokens[opener].scope_closer = Some(index);
                self.tokens[owner].scope_closer = Some(index);
                let token = &mut self.tokens[index];
                token.scope_owner = Some(owner);
                token.scope_opener = Some(opener);
                token.scope_closer = Some(index);

                if let Some(position) = self.scopes.iter().rposition(|&open| open == owner) {
                    self.scopes.truncate(position);
                }
            }
        }

        let depth = self.open.len();
        self.pending.retain(|&(_, at)| at <= depth);
    }

    /// Cancel pending owners at the current depth, innermost first
    fn drop_pending(&mut self) {
        let depth = self.open.len();
        while let Some(&(_, at)) = self.pending.last() {
            if at < depth {
                break;
            }
            self.pending.pop();
        }
    }

    fn prev_non_empty(&self, index: usize) -> Option<usize> {
        (0..index).rev().find(|&i| !self.tokens[i].kind.is_empty())
    }

    fn next_non_empty(&self, index: usize) -> Option<usize> {
        (index + 1..self.tokens.len()).find(|&i| !self.tokens[i].kind.is_empty())
    }
}

fn pairs_with(opener: TokenKind, closer: TokenKind) -> bool {
    matches!(
        (opener, closer),
        (TokenKind::OpenParen, TokenKind::CloseParen)
            | (TokenKind::OpenSquareBracket, TokenKind::CloseSquareBracket)
            | (TokenKind::Attribute, TokenKind::CloseSquareBracket)
            | (TokenKind::OpenShortArray, TokenKind::CloseShortArray)
            | (TokenKind::OpenCurly, TokenKind::CloseCurly)
    )
}
