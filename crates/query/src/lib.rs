//! Composable queries over syntax trees.
//!
//! A query is either a single-node predicate or a matcher over a run of
//! consecutive siblings. Every query answers three questions: which nodes in
//! a tree it selects (`select`, document order), whether one node matches
//! (`matches`), and how many siblings a match starting at a node consumes
//! (`try_match`). The binder additionally matches queries directly against
//! green sibling lists, without materialising red nodes.
//!
//! Queries are immutable and cheap to clone; combinators (`|`, `&`,
//! sequencing, repetition, lookahead) and selection modifiers (`first`,
//! `nth`, `with_text`, ...) wrap rather than mutate.

mod green_match;
mod matcher;
mod query;
mod region;
mod resolve;
mod select;

pub use crate::{
    query::{BoundarySide, Query, TextFilter},
    region::Region,
};

use syntax::{GreenNode, SyntaxKind};

/// Matches nodes of exactly `kind`.
pub fn kind(kind: SyntaxKind) -> Query {
    Query::kind(kind)
}

/// Matches any block, or only blocks of `kind` via [`block_of`].
pub fn block() -> Query {
    Query::block(None)
}

pub fn block_of(kind: SyntaxKind) -> Query {
    Query::block(Some(kind))
}

/// Matches any token leaf.
pub fn leaf() -> Query {
    Query::leaf()
}

/// Matches any node.
pub fn any() -> Query {
    Query::any()
}

/// Matches a node at the start of a line: its own leading trivia, or the
/// previous sibling's trailing trivia, contains a line break.
pub fn newline() -> Query {
    Query::newline()
}

pub fn any_keyword() -> Query {
    Query::any_keyword()
}

/// Matches the keyword spelled `text`; inert until resolved against a schema.
pub fn keyword(text: impl Into<Box<str>>) -> Query {
    Query::keyword(text)
}

/// Matches any keyword in the named schema category.
pub fn keyword_category(name: impl Into<Box<str>>) -> Query {
    Query::keyword_category(name)
}

/// Matches `parts` in order over consecutive siblings.
pub fn seq(parts: impl IntoIterator<Item = Query>) -> Query {
    Query::seq(parts.into_iter().collect())
}

/// First matching alternative wins.
pub fn any_of(alternatives: impl IntoIterator<Item = Query>) -> Query {
    Query::any_of(alternatives.into_iter().collect())
}

/// Consumes one node iff none of `queries` match it.
pub fn none_of(queries: impl IntoIterator<Item = Query>) -> Query {
    Query::none_of(queries.into_iter().collect())
}

pub fn optional(inner: Query) -> Query {
    Query::optional(inner)
}

/// Greedy repetition between `min` and `max` matches.
pub fn repeat(inner: Query, min: usize, max: usize) -> Query {
    Query::repeat(inner, min, max)
}

pub fn zero_or_more(inner: Query) -> Query {
    Query::repeat(inner, 0, usize::MAX)
}

pub fn one_or_more(inner: Query) -> Query {
    Query::repeat(inner, 1, usize::MAX)
}

/// Greedy repetition of `inner` until `terminator` matches at the current
/// position; the terminator is not consumed.
pub fn repeat_until(inner: Query, terminator: Query) -> Query {
    Query::repeat_until(inner, terminator)
}

/// Matches `inner`, then requires `cond` to match right after it.
pub fn lookahead(inner: Query, cond: Query) -> Query {
    Query::lookahead(inner, cond, true)
}

pub fn negative_lookahead(inner: Query, cond: Query) -> Query {
    Query::lookahead(inner, cond, false)
}

/// Zero-width negative assertion.
pub fn not(inner: Query) -> Query {
    Query::not(inner)
}

/// Matches `start`, then scans forward until `end` matches; fails if `end`
/// is never reached. Consumes through `end` when `inclusive`.
pub fn between(start: Query, end: Query, inclusive: bool) -> Query {
    Query::between(start, end, inclusive)
}

/// Selects the sibling `offset` slots away from each anchor node.
pub fn sibling(offset: isize, inner: Option<Query>) -> Query {
    Query::sibling(offset, inner)
}

pub fn parent(inner: Option<Query>) -> Query {
    Query::parent(inner)
}

pub fn ancestor(inner: Query) -> Query {
    Query::ancestor(inner)
}

/// Zero-width assertion: first slot of the root list.
pub fn bof() -> Query {
    Query::bof()
}

/// Zero-width assertion: past the last slot of the root list.
pub fn eof() -> Query {
    Query::eof()
}

/// Matches exactly this green node (identity) wherever it sits.
pub fn exact(node: GreenNode) -> Query {
    Query::exact(node)
}

/// First or last child of each container matched by `container`.
pub fn boundary(container: Query, side: BoundarySide) -> Query {
    Query::boundary(container, side)
}

/// The region spanning all children of each matched container.
pub fn inner_content(container: Query) -> Query {
    Query::inner_content(container)
}
