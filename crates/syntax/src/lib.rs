//! Lossless syntax trees for small configurable languages.
//!
//! The tree has two layers. The *green* layer is immutable, position-free and
//! structurally shared: cloning a node is a reference-count bump, and editing
//! produces a new root that shares every unchanged subtree with the old one.
//! The *red* layer is an ephemeral cursor over the green tree that knows
//! absolute positions and parents; it is created lazily during traversal and
//! becomes stale as soon as a new green root is installed.
//!
//! Serialising any green root reproduces the source it was parsed from
//! byte-for-byte: whitespace, comments and malformed input are all kept in the
//! tree, either as trivia attached to tokens or as `Error` leaves.

mod builder;
mod error;
mod green;
mod keywords;
mod options;
mod red;
mod syntax_kind;
mod trivia;
mod walk;

pub use crate::{
    builder::TreeBuilder,
    error::TreeError,
    green::GreenNode,
    keywords::KeywordTable,
    options::{CommentStyle, TokenizerOptions},
    red::{RedChildren, RedNode, RedSlot},
    syntax_kind::SyntaxKind,
    trivia::{Trivia, TriviaKind},
    walk::{Direction, FilterResult, PathWalker, TreeWalker, WalkEvent, WhatToShow},
};
