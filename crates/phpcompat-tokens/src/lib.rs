//! Token stream model and navigation
//!
//! This crate handles:
//! - The flat, annotated token model consumed by the rules
//! - Cursor queries with atomic skipping of nested pairs
//! - Call-site detection and argument extraction
//! - Loose numeric evaluation of token spans
//! - A reference PHP lexer that produces annotated streams

pub mod call;
pub mod cursor;
pub mod keywords;
pub mod lexer;
pub mod numeric;
pub mod stream;
pub mod token;

pub use call::Argument;
pub use cursor::Scan;
pub use keywords::{legacy_keyword, LegacyKeyword, LEGACY_KEYWORDS};
pub use lexer::{LexError, Lexer};
pub use numeric::{NumericEvaluator, NumericValue};
pub use stream::TokenStream;
pub use token::{Token, TokenKind};
