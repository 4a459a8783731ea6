//! Character-level lexer.
//!
//! Splits a source buffer into primitive tokens: identifier runs, digit runs,
//! whitespace runs, single newlines, configured symbol characters, quotes,
//! and a catch-all for anything else. The lexer is total: every input
//! character lands in exactly one token, in order. It does not interpret
//! strings, comments or operators; the green lexer in the `parser` crate
//! assembles those.

mod cursor;
mod lexer;

pub use crate::lexer::{Lexer, Token, TokenKind, tokenize};
