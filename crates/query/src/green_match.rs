//! Green-level matching: the binder's fast path.
//!
//! Matches a query against a bare list of green siblings without creating red
//! nodes. Queries that genuinely need tree context (parent and ancestor
//! navigation, red-node predicates) simply never match at this level.

use syntax::GreenNode;

use crate::query::{Query, QueryKind};

#[derive(Clone, Copy)]
pub(crate) struct GreenCursor<'a> {
    siblings: &'a [GreenNode],
    index: usize,
    is_root: bool,
}

impl<'a> GreenCursor<'a> {
    fn current(&self) -> Option<&'a GreenNode> {
        self.siblings.get(self.index)
    }

    fn advanced(&self, by: usize) -> GreenCursor<'a> {
        GreenCursor { index: self.index + by, ..*self }
    }

    fn at(&self, index: usize) -> GreenCursor<'a> {
        GreenCursor { index, ..*self }
    }

    fn previous(&self) -> Option<&'a GreenNode> {
        self.index.checked_sub(1).and_then(|i| self.siblings.get(i))
    }
}

impl Query {
    /// Matches this query against `siblings` starting at slot `at`, the way
    /// the binder sees a child list. `is_root` enables the begin/end-of-file
    /// assertions.
    pub fn try_match_green(&self, siblings: &[GreenNode], at: usize, is_root: bool) -> Option<usize> {
        self.green_match_at(&GreenCursor { siblings, index: at, is_root })
    }

    fn green_match_at(&self, cursor: &GreenCursor<'_>) -> Option<usize> {
        match self.kind_ref() {
            QueryKind::Kind(kind) => (cursor.current()?.kind() == *kind).then_some(1),
            QueryKind::Block(kind) => {
                let node = cursor.current()?;
                (node.is_block() && kind.is_none_or(|k| node.kind() == k)).then_some(1)
            }
            QueryKind::Leaf => cursor.current()?.is_leaf().then_some(1),
            QueryKind::Any => cursor.current().map(|_| 1),
            QueryKind::Newline { negated } => {
                let node = cursor.current()?;
                let at_line_start = node.leading_has_line_break()
                    || cursor.previous().is_some_and(GreenNode::trailing_has_line_break);
                (at_line_start != *negated).then_some(1)
            }
            QueryKind::AnyKeyword => cursor.current()?.kind().is_keyword().then_some(1),
            QueryKind::Keyword(lookup) => {
                let kind = (*lookup.cell.get()?)?;
                (cursor.current()?.kind() == kind).then_some(1)
            }
            QueryKind::KeywordCategory(lookup) => {
                let kinds = lookup.cell.get()?;
                kinds.contains(&cursor.current()?.kind()).then_some(1)
            }
            QueryKind::Union(a, b) => a.green_match_at(cursor).or_else(|| b.green_match_at(cursor)),
            QueryKind::Intersection(a, b) => {
                let left = a.green_match_at(cursor)?;
                let right = b.green_match_at(cursor)?;
                (left == right).then_some(left)
            }
            QueryKind::AnyOf(alternatives) => alternatives.iter().find_map(|q| q.green_match_at(cursor)),
            QueryKind::NoneOf(queries) => {
                cursor.current()?;
                queries.iter().all(|q| q.green_match_at(cursor).is_none()).then_some(1)
            }
            QueryKind::Sequence(parts) => {
                let mut cursor = *cursor;
                let mut total = 0;
                for part in parts {
                    let consumed = part.green_match_at(&cursor)?;
                    total += consumed;
                    cursor = cursor.advanced(consumed);
                }
                Some(total)
            }
            QueryKind::Optional(inner) => Some(inner.green_match_at(cursor).unwrap_or(0)),
            QueryKind::Repeat { inner, min, max } => {
                let mut cursor = *cursor;
                let mut total = 0;
                let mut times = 0;
                while times < *max {
                    match inner.green_match_at(&cursor) {
                        Some(consumed) if consumed > 0 => {
                            total += consumed;
                            times += 1;
                            cursor = cursor.advanced(consumed);
                        }
                        _ => break,
                    }
                }
                (times >= *min).then_some(total)
            }
            QueryKind::RepeatUntil { inner, terminator } => {
                let mut cursor = *cursor;
                let mut total = 0;
                loop {
                    if cursor.current().is_none() || terminator.green_match_at(&cursor).is_some() {
                        return Some(total);
                    }
                    let consumed = inner.green_match_at(&cursor)?;
                    if consumed == 0 {
                        return Some(total);
                    }
                    total += consumed;
                    cursor = cursor.advanced(consumed);
                }
            }
            QueryKind::Lookahead { inner, cond, positive } => {
                let consumed = inner.green_match_at(cursor)?;
                let holds = cond.green_match_at(&cursor.advanced(consumed)).is_some();
                (holds == *positive).then_some(consumed)
            }
            QueryKind::Not(inner) => inner.green_match_at(cursor).is_none().then_some(0),
            QueryKind::Between { start, end, inclusive } => {
                let mut at = start.green_match_at(cursor)?;
                loop {
                    let scan = cursor.advanced(at);
                    if let Some(end_consumed) = end.green_match_at(&scan) {
                        return Some(if *inclusive { at + end_consumed } else { at });
                    }
                    if scan.current().is_none() {
                        return None;
                    }
                    at += 1;
                }
            }
            QueryKind::Sibling { offset, inner } => {
                cursor.current()?;
                let target = (cursor.index as isize).checked_add(*offset)?;
                if target < 0 || target as usize >= cursor.siblings.len() {
                    return None;
                }
                match inner {
                    Some(q) => q.green_match_at(&cursor.at(target as usize)).map(|_| 0),
                    None => Some(0),
                }
            }
            // Parent and ancestor context does not exist at green level.
            QueryKind::Parent(_) | QueryKind::Ancestor(_) => None,
            QueryKind::Bof => (cursor.is_root && cursor.index == 0).then_some(0),
            QueryKind::Eof => (cursor.is_root && cursor.index == cursor.siblings.len()).then_some(0),
            QueryKind::Exact(green) => cursor.current()?.ptr_eq(green).then_some(1),
            // Needs the parent container, which the green matcher cannot see.
            QueryKind::Boundary { .. } => None,
            QueryKind::InnerContent(container) => {
                let node = cursor.current()?;
                (node.is_container() && container.green_match_at(cursor).is_some()).then_some(1)
            }
            QueryKind::First(inner)
            | QueryKind::Last(inner)
            | QueryKind::Nth(inner, _)
            | QueryKind::Skip(inner, _)
            | QueryKind::Take(inner, _) => inner.green_match_at(cursor),
            // Red-node predicates cannot run against bare greens.
            QueryKind::Filter { .. } => None,
            QueryKind::WithText { inner, filter } => {
                let consumed = inner.green_match_at(cursor)?;
                let text = cursor.current()?.text()?;
                filter.accepts(text).then_some(consumed)
            }
        }
    }
}
