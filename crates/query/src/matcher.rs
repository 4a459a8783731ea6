//! Red-level matching: `try_match` / `matches` over sibling runs.

use syntax::RedNode;

use crate::query::{Query, QueryKind};

/// A position in a sibling list: either a slot under a parent (possibly one
/// past the end), or a parentless node treated as a list of one.
#[derive(Clone)]
pub(crate) enum Cursor {
    InParent { parent: RedNode, index: usize },
    Lone { node: RedNode, offset: usize },
}

impl Cursor {
    pub(crate) fn at(node: &RedNode) -> Cursor {
        match (node.parent(), node.slot_index()) {
            (Some(parent), Some(index)) => Cursor::InParent { parent: parent.clone(), index: index as usize },
            _ => Cursor::Lone { node: node.clone(), offset: 0 },
        }
    }

    pub(crate) fn current(&self) -> Option<RedNode> {
        match self {
            Cursor::InParent { parent, index } => parent.child(*index),
            Cursor::Lone { node, offset } => (*offset == 0).then(|| node.clone()),
        }
    }

    fn advanced(&self, by: usize) -> Cursor {
        match self {
            Cursor::InParent { parent, index } => Cursor::InParent { parent: parent.clone(), index: index + by },
            Cursor::Lone { node, offset } => Cursor::Lone { node: node.clone(), offset: offset + by },
        }
    }

    fn previous(&self) -> Option<RedNode> {
        match self {
            Cursor::InParent { parent, index } => index.checked_sub(1).and_then(|i| parent.child(i)),
            Cursor::Lone { .. } => None,
        }
    }

    fn sibling_at(&self, offset: isize) -> Option<RedNode> {
        match self {
            Cursor::InParent { parent, index } => {
                let target = (*index as isize).checked_add(offset)?;
                if target < 0 {
                    return None;
                }
                parent.child(target as usize)
            }
            Cursor::Lone { node, offset: at } => (offset == 0 && *at == 0).then(|| node.clone()),
        }
    }

    fn index(&self) -> usize {
        match self {
            Cursor::InParent { index, .. } => *index,
            Cursor::Lone { offset, .. } => *offset,
        }
    }

    fn len(&self) -> usize {
        match self {
            Cursor::InParent { parent, .. } => parent.slot_count(),
            Cursor::Lone { .. } => 1,
        }
    }

    fn at_root_level(&self) -> bool {
        match self {
            Cursor::InParent { parent, .. } => parent.is_root(),
            Cursor::Lone { node, .. } => node.is_root(),
        }
    }
}

impl Query {
    /// Attempts a match starting at `start`, returning how many consecutive
    /// siblings the match claims. Single-node queries consume 1; zero-width
    /// assertions and navigation queries consume 0.
    pub fn try_match(&self, start: &RedNode) -> Option<usize> {
        self.match_at(&Cursor::at(start))
    }

    pub fn matches(&self, node: &RedNode) -> bool {
        self.try_match(node).is_some()
    }

    pub(crate) fn match_at(&self, cursor: &Cursor) -> Option<usize> {
        match self.kind_ref() {
            QueryKind::Kind(kind) => {
                let node = cursor.current()?;
                (node.kind() == *kind).then_some(1)
            }
            QueryKind::Block(kind) => {
                let node = cursor.current()?;
                (node.is_block() && kind.is_none_or(|k| node.kind() == k)).then_some(1)
            }
            QueryKind::Leaf => cursor.current()?.is_leaf().then_some(1),
            QueryKind::Any => cursor.current().map(|_| 1),
            QueryKind::Newline { negated } => {
                let node = cursor.current()?;
                let at_line_start = node.green().leading_has_line_break()
                    || cursor.previous().is_some_and(|prev| prev.green().trailing_has_line_break());
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
            QueryKind::Union(a, b) => a.match_at(cursor).or_else(|| b.match_at(cursor)),
            QueryKind::Intersection(a, b) => {
                let left = a.match_at(cursor)?;
                let right = b.match_at(cursor)?;
                (left == right).then_some(left)
            }
            QueryKind::AnyOf(alternatives) => alternatives.iter().find_map(|q| q.match_at(cursor)),
            QueryKind::NoneOf(queries) => {
                cursor.current()?;
                queries.iter().all(|q| q.match_at(cursor).is_none()).then_some(1)
            }
            QueryKind::Sequence(parts) => {
                let mut cursor = cursor.clone();
                let mut total = 0;
                for part in parts {
                    let consumed = part.match_at(&cursor)?;
                    total += consumed;
                    cursor = cursor.advanced(consumed);
                }
                Some(total)
            }
            QueryKind::Optional(inner) => Some(inner.match_at(cursor).unwrap_or(0)),
            QueryKind::Repeat { inner, min, max } => {
                let mut cursor = cursor.clone();
                let mut total = 0;
                let mut times = 0;
                while times < *max {
                    // a zero-width inner match makes no progress; stop
                    match inner.match_at(&cursor) {
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
                let mut cursor = cursor.clone();
                let mut total = 0;
                loop {
                    if cursor.current().is_none() || terminator.match_at(&cursor).is_some() {
                        return Some(total);
                    }
                    let consumed = inner.match_at(&cursor)?;
                    if consumed == 0 {
                        return Some(total);
                    }
                    total += consumed;
                    cursor = cursor.advanced(consumed);
                }
            }
            QueryKind::Lookahead { inner, cond, positive } => {
                let consumed = inner.match_at(cursor)?;
                let holds = cond.match_at(&cursor.advanced(consumed)).is_some();
                (holds == *positive).then_some(consumed)
            }
            QueryKind::Not(inner) => inner.match_at(cursor).is_none().then_some(0),
            QueryKind::Between { start, end, inclusive } => {
                let mut at = start.match_at(cursor)?;
                loop {
                    let scan = cursor.advanced(at);
                    if let Some(end_consumed) = end.match_at(&scan) {
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
                let target = cursor.sibling_at(*offset)?;
                match inner {
                    Some(q) => q.matches(&target).then_some(0),
                    None => Some(0),
                }
            }
            QueryKind::Parent(inner) => {
                let parent = cursor.current()?.parent()?.clone();
                match inner {
                    Some(q) => q.matches(&parent).then_some(0),
                    None => Some(0),
                }
            }
            QueryKind::Ancestor(inner) => {
                let node = cursor.current()?;
                node.ancestors().any(|a| inner.matches(&a)).then_some(0)
            }
            QueryKind::Bof => (cursor.at_root_level() && cursor.index() == 0).then_some(0),
            QueryKind::Eof => (cursor.at_root_level() && cursor.index() == cursor.len()).then_some(0),
            QueryKind::Exact(green) => cursor.current()?.green().ptr_eq(green).then_some(1),
            QueryKind::Boundary { container, side } => {
                let node = cursor.current()?;
                let parent = node.parent()?.clone();
                if !container.matches(&parent) {
                    return None;
                }
                let index = node.slot_index()? as usize;
                let wanted = match side {
                    crate::BoundarySide::Start => 0,
                    crate::BoundarySide::End => parent.slot_count().checked_sub(1)?,
                };
                (index == wanted).then_some(1)
            }
            QueryKind::InnerContent(container) => {
                let node = cursor.current()?;
                (node.green().is_container() && container.match_at(cursor).is_some()).then_some(1)
            }
            QueryKind::First(inner)
            | QueryKind::Last(inner)
            | QueryKind::Nth(inner, _)
            | QueryKind::Skip(inner, _)
            | QueryKind::Take(inner, _) => inner.match_at(cursor),
            QueryKind::Filter { inner, pred } => {
                let consumed = inner.match_at(cursor)?;
                pred(&cursor.current()?).then_some(consumed)
            }
            QueryKind::WithText { inner, filter } => {
                let consumed = inner.match_at(cursor)?;
                let node = cursor.current()?;
                let text = node.green().text()?;
                filter.accepts(text).then_some(consumed)
            }
        }
    }
}
