//! Lazy selection of matching red nodes in document order.

use std::{cmp::Reverse, iter::Peekable};

use rustc_hash::FxHashSet;

use syntax::{RedNode, TreeWalker, WhatToShow};

use crate::query::{Query, QueryKind};

pub type SelectIter = Box<dyn Iterator<Item = RedNode>>;

/// `(green identity, position)` — the dedup key for selection results.
fn identity(node: &RedNode) -> (usize, u32) {
    (node.green().key(), node.position())
}

/// Total order agreeing with preorder document order: position first, wider
/// (enclosing) nodes before narrower ones, shallower before deeper.
fn document_order_key(node: &RedNode) -> (u32, Reverse<u32>, usize) {
    (node.position(), Reverse(node.end_position()), node.ancestors().count())
}

fn walk_all(root: &RedNode) -> TreeWalker {
    TreeWalker::new(root.clone(), WhatToShow::ALL)
}

impl Query {
    /// All nodes this query selects under `root`, lazily, in document order.
    ///
    /// Predicate and sequence queries yield the node a match starts at;
    /// navigation queries (sibling/parent/ancestor/boundary/inner-content)
    /// yield their target nodes, deduplicated by `(green, position)`.
    /// Schema-dependent queries yield nothing until resolved.
    pub fn select(&self, root: &RedNode) -> SelectIter {
        match self.kind_ref() {
            QueryKind::First(inner) => Box::new(inner.select(root).take(1)),
            QueryKind::Last(inner) => Box::new(inner.select(root).last().into_iter()),
            QueryKind::Nth(inner, n) => Box::new(inner.select(root).skip(*n).take(1)),
            QueryKind::Skip(inner, n) => Box::new(inner.select(root).skip(*n)),
            QueryKind::Take(inner, n) => Box::new(inner.select(root).take(*n)),
            QueryKind::Filter { inner, pred } => {
                let pred = pred.clone();
                Box::new(inner.select(root).filter(move |node| pred(node)))
            }
            QueryKind::WithText { inner, filter } => {
                let filter = filter.clone();
                Box::new(
                    inner
                        .select(root)
                        .filter(move |node| node.green().text().is_some_and(|t| filter.accepts(t))),
                )
            }
            QueryKind::Union(a, b) => merge(a.select(root), b.select(root)),
            QueryKind::AnyOf(alternatives) => {
                let mut merged: SelectIter = Box::new(std::iter::empty());
                for alternative in alternatives {
                    merged = merge(merged, alternative.select(root));
                }
                merged
            }
            QueryKind::Sibling { offset, inner } => {
                let offset = *offset;
                let inner = inner.clone();
                dedup(Box::new(walk_all(root).filter_map(move |anchor| {
                    let target = sibling_of(&anchor, offset)?;
                    match &inner {
                        Some(q) => q.matches(&target).then_some(target),
                        None => Some(target),
                    }
                })))
            }
            QueryKind::Parent(inner) => {
                let inner = inner.clone();
                dedup(Box::new(walk_all(root).filter_map(move |node| {
                    let parent = node.parent()?.clone();
                    match &inner {
                        Some(q) => q.matches(&parent).then_some(parent),
                        None => Some(parent),
                    }
                })))
            }
            QueryKind::Ancestor(inner) => {
                let inner = inner.clone();
                dedup(Box::new(
                    walk_all(root).filter_map(move |node| node.ancestors().find(|a| inner.matches(a))),
                ))
            }
            QueryKind::Boundary { container, side } => {
                let side = *side;
                Box::new(container.select(root).filter_map(move |c| match side {
                    crate::BoundarySide::Start => c.child(0),
                    crate::BoundarySide::End => c.slot_count().checked_sub(1).and_then(|last| c.child(last)),
                }))
            }
            QueryKind::InnerContent(container) => Box::new(container.select(root).flat_map(|c| c.children())),
            _ => {
                let query = self.clone();
                Box::new(walk_all(root).filter(move |node| query.try_match(node).is_some()))
            }
        }
    }
}

fn sibling_of(anchor: &RedNode, offset: isize) -> Option<RedNode> {
    let index = anchor.slot_index()? as isize;
    let target = index.checked_add(offset)?;
    if target < 0 {
        return None;
    }
    anchor.parent()?.child(target as usize)
}

fn dedup(iter: SelectIter) -> SelectIter {
    let mut seen = FxHashSet::default();
    Box::new(iter.filter(move |node| seen.insert(identity(node))))
}

/// Merges two document-ordered streams into one, dropping duplicates.
fn merge(a: SelectIter, b: SelectIter) -> SelectIter {
    struct Merge {
        a: Peekable<SelectIter>,
        b: Peekable<SelectIter>,
        seen: FxHashSet<(usize, u32)>,
    }

    impl Iterator for Merge {
        type Item = RedNode;

        fn next(&mut self) -> Option<RedNode> {
            loop {
                let take_a = match (self.a.peek(), self.b.peek()) {
                    (None, None) => return None,
                    (Some(_), None) => true,
                    (None, Some(_)) => false,
                    (Some(x), Some(y)) => document_order_key(x) <= document_order_key(y),
                };
                let node = if take_a { self.a.next() } else { self.b.next() }.expect("peeked above");
                if self.seen.insert(identity(&node)) {
                    return Some(node);
                }
            }
        }
    }

    Box::new(Merge { a: a.peekable(), b: b.peekable(), seen: FxHashSet::default() })
}
