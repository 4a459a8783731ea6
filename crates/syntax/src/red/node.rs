use std::{fmt, iter, sync::OnceLock};

use countme::Count;
use triomphe::Arc;

use crate::{Direction, GreenNode, SyntaxKind, Trivia, WalkEvent};

/// Where a red node sits relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedSlot {
    Root,
    Child(u32),
    /// A block's opening delimiter; not a child slot.
    Opener,
    /// A block's closing delimiter; not a child slot.
    Closer,
}

struct RedNodeData {
    green: GreenNode,
    parent: Option<RedNode>,
    position: u32,
    slot: RedSlot,
    children: Box<[OnceLock<RedNode>]>,
    opener: OnceLock<RedNode>,
    closer: OnceLock<RedNode>,
    _c: Count<RedNode>,
}

/// A cursor into the tree: a green node plus absolute position and parent.
///
/// Equality is `(green identity, position)`; two cursors over the same green
/// node at the same offset are the same node.
#[derive(Clone)]
pub struct RedNode {
    data: Arc<RedNodeData>,
}

impl RedNode {
    pub fn new_root(green: GreenNode) -> RedNode {
        RedNode::new(green, None, 0, RedSlot::Root)
    }

    fn new(green: GreenNode, parent: Option<RedNode>, position: u32, slot: RedSlot) -> RedNode {
        let slots = green.slot_count();
        let children = (0..slots).map(|_| OnceLock::new()).collect::<Vec<_>>().into_boxed_slice();
        RedNode {
            data: Arc::new(RedNodeData {
                green,
                parent,
                position,
                slot,
                children,
                opener: OnceLock::new(),
                closer: OnceLock::new(),
                _c: Count::new(),
            }),
        }
    }

    #[inline]
    pub fn green(&self) -> &GreenNode {
        &self.data.green
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.green.kind()
    }

    #[inline]
    pub fn position(&self) -> u32 {
        self.data.position
    }

    #[inline]
    pub fn end_position(&self) -> u32 {
        self.data.position + self.data.green.width()
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.data.green.width()
    }

    #[inline]
    pub fn parent(&self) -> Option<&RedNode> {
        self.data.parent.as_ref()
    }

    #[inline]
    pub fn slot(&self) -> RedSlot {
        self.data.slot
    }

    /// Slot index under the parent, for ordinary children.
    #[inline]
    pub fn slot_index(&self) -> Option<u32> {
        match self.data.slot {
            RedSlot::Child(i) => Some(i),
            _ => None,
        }
    }

    #[inline]
    pub fn is_root(&self) -> bool {
        self.data.parent.is_none()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.data.green.is_leaf()
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        self.data.green.is_block()
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.data.green.slot_count()
    }

    /// The red child at `index`, created on first access and cached so every
    /// caller sees the same instance.
    pub fn child(&self, index: usize) -> Option<RedNode> {
        let offset = self.data.green.slot_offset(index)?;
        self.child_with_offset(index, self.data.position + offset)
    }

    fn child_with_offset(&self, index: usize, position: u32) -> Option<RedNode> {
        let cell = self.data.children.get(index)?;
        let red = cell.get_or_init(|| {
            let green = self.data.green.get_slot(index).expect("slot checked by caller").clone();
            RedNode::new(green, Some(self.clone()), position, RedSlot::Child(index as u32))
        });
        Some(red.clone())
    }

    /// All red children, materialising offsets incrementally.
    pub fn children(&self) -> RedChildren {
        let base = self.data.position + self.data.green.slot_offset(0).unwrap_or(0);
        RedChildren { parent: self.clone(), index: 0, next_position: base }
    }

    pub fn opener_node(&self) -> Option<RedNode> {
        let opener = self.data.green.opener()?.clone();
        let red = self.data.opener.get_or_init(|| {
            RedNode::new(opener.clone(), Some(self.clone()), self.data.position, RedSlot::Opener)
        });
        Some(red.clone())
    }

    pub fn closer_node(&self) -> Option<RedNode> {
        let closer = self.data.green.closer()?.clone();
        let position = self.end_position() - closer.width();
        let red = self
            .data
            .closer
            .get_or_init(|| RedNode::new(closer.clone(), Some(self.clone()), position, RedSlot::Closer));
        Some(red.clone())
    }

    /// First offset inside a block, just past the opener. For other
    /// containers this is the node's own position.
    pub fn inner_start_position(&self) -> u32 {
        match self.data.green.opener() {
            Some(opener) => self.data.position + opener.width(),
            None => self.data.position,
        }
    }

    /// Offset just before a block's closer; the node's end otherwise.
    pub fn inner_end_position(&self) -> u32 {
        match self.data.green.closer() {
            Some(closer) => self.end_position() - closer.width(),
            None => self.end_position(),
        }
    }

    pub fn next_sibling(&self) -> Option<RedNode> {
        let index = self.slot_index()? as usize;
        self.parent()?.child(index + 1)
    }

    pub fn previous_sibling(&self) -> Option<RedNode> {
        let index = self.slot_index()? as usize;
        if index == 0 {
            return None;
        }
        self.parent()?.child(index - 1)
    }

    /// Start of a leaf's own text, past its leading trivia.
    pub fn text_position(&self) -> u32 {
        self.data.position + self.data.green.leading_width()
    }

    pub fn text_end_position(&self) -> u32 {
        self.text_position() + self.data.green.text_width()
    }

    pub fn leading_trivia(&self) -> impl Iterator<Item = &Trivia> {
        self.data.green.leading_trivia().iter()
    }

    pub fn trailing_trivia(&self) -> impl Iterator<Item = &Trivia> {
        self.data.green.trailing_trivia().iter()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = RedNode> + use<> {
        iter::successors(self.parent().cloned(), |node| node.parent().cloned())
    }

    /// Enter/leave events for a depth-first walk of this subtree.
    pub fn preorder(&self) -> impl Iterator<Item = WalkEvent<RedNode>> + use<> {
        let mut stack = vec![WalkEvent::Enter(self.clone())];
        iter::from_fn(move || {
            let event = stack.pop()?;
            if let WalkEvent::Enter(node) = &event {
                stack.push(WalkEvent::Leave(node.clone()));
                let children: Vec<_> = node.children().collect();
                for child in children.into_iter().rev() {
                    stack.push(WalkEvent::Enter(child));
                }
            }
            Some(event)
        })
    }

    /// This node and every node below it, in document order.
    pub fn descendants(&self) -> impl Iterator<Item = RedNode> + use<> {
        self.preorder().filter_map(|event| match event {
            WalkEvent::Enter(node) => Some(node),
            WalkEvent::Leave(_) => None,
        })
    }

    /// This node and its following (or preceding) siblings.
    pub fn siblings(&self, direction: Direction) -> impl Iterator<Item = RedNode> + use<> {
        iter::successors(Some(self.clone()), move |node| match direction {
            Direction::Forward => node.next_sibling(),
            Direction::Backward => node.previous_sibling(),
        })
    }

    /// Red views over the children strictly between a block's delimiters.
    /// For lists and syntax wrappers this is the same as [`RedNode::children`].
    pub fn inner_children(&self) -> RedChildren {
        self.children()
    }

    /// The innermost container whose span includes `pos`. `None` when `pos`
    /// lies outside `[position, end_position)`.
    pub fn find_node_at(&self, pos: u32) -> Option<RedNode> {
        if pos < self.data.position || pos >= self.end_position() {
            return None;
        }
        let mut current = self.clone();
        'descend: loop {
            if current.is_leaf() {
                return Some(current);
            }
            for child in current.clone().children() {
                if child.is_leaf() {
                    continue;
                }
                if pos >= child.position() && pos < child.end_position() {
                    current = child;
                    continue 'descend;
                }
            }
            return Some(current);
        }
    }

    /// The token leaf covering `pos`, delimiters included.
    pub fn find_leaf_at(&self, pos: u32) -> Option<RedNode> {
        if pos < self.data.position || pos >= self.end_position() {
            return None;
        }
        let mut current = self.clone();
        'descend: loop {
            if current.is_leaf() {
                return Some(current);
            }
            if let Some(opener) = current.opener_node() {
                if pos < opener.end_position() {
                    return Some(opener);
                }
            }
            if let Some(closer) = current.closer_node() {
                if pos >= closer.position() && closer.width() > 0 {
                    return Some(closer);
                }
            }
            for child in current.clone().children() {
                if pos >= child.position() && pos < child.end_position() {
                    current = child;
                    continue 'descend;
                }
            }
            return None;
        }
    }

    pub fn to_text(&self) -> String {
        self.data.green.to_text()
    }

    /// Indented `Kind@start..end` structure dump for debugging.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        for _ in 0..depth {
            out.push_str("  ");
        }
        out.push_str(&format!("{:?}@{}..{}", self.kind(), self.position(), self.end_position()));
        if let Some(text) = self.green().text() {
            out.push_str(&format!(" {text:?}"));
        }
        out.push('\n');
        if let Some(opener) = self.opener_node() {
            opener.dump_into(out, depth + 1);
        }
        for child in self.children() {
            child.dump_into(out, depth + 1);
        }
        if let Some(closer) = self.closer_node() {
            closer.dump_into(out, depth + 1);
        }
    }
}

impl PartialEq for RedNode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.data.green.ptr_eq(&other.data.green) && self.data.position == other.data.position
    }
}

impl Eq for RedNode {}

impl std::hash::Hash for RedNode {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.data.green.key().hash(state);
        self.data.position.hash(state);
    }
}

impl fmt::Debug for RedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedNode")
            .field("kind", &self.kind())
            .field("range", &(self.position()..self.end_position()))
            .finish()
    }
}

impl fmt::Display for RedNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

/// Iterator over red children with incremental position bookkeeping.
pub struct RedChildren {
    parent: RedNode,
    index: usize,
    next_position: u32,
}

impl Iterator for RedChildren {
    type Item = RedNode;

    fn next(&mut self) -> Option<RedNode> {
        if self.index >= self.parent.slot_count() {
            return None;
        }
        let child = self.parent.child_with_offset(self.index, self.next_position)?;
        self.index += 1;
        self.next_position = child.end_position();
        Some(child)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.parent.slot_count() - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RedChildren {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ident(text: &str, trailing: Vec<Trivia>) -> GreenNode {
        GreenNode::leaf(SyntaxKind::IDENT, text, vec![], trailing)
    }

    fn sample_root() -> RedNode {
        // "{ ab cd }" as opener(+ws) ab(+ws) cd closer(lead ws)
        let opener = GreenNode::leaf(SyntaxKind::SYMBOL, "{", vec![], vec![Trivia::whitespace(" ")]);
        let closer = GreenNode::leaf(SyntaxKind::SYMBOL, "}", vec![Trivia::whitespace(" ")], vec![]);
        let block = GreenNode::block(
            opener,
            vec![ident("ab", vec![Trivia::whitespace(" ")]), ident("cd", vec![])],
            closer,
        );
        RedNode::new_root(GreenNode::list(vec![block]))
    }

    #[test]
    fn test_positions() {
        let root = sample_root();
        assert_eq!(root.position(), 0);
        assert_eq!(root.end_position(), 9);

        let block = root.child(0).unwrap();
        assert_eq!(block.position(), 0);
        assert_eq!(block.inner_start_position(), 2);
        assert_eq!(block.inner_end_position(), 7);

        let ab = block.child(0).unwrap();
        assert_eq!(ab.position(), 2);
        assert_eq!(ab.end_position(), 5);
        assert_eq!(ab.text_position(), 2);
        assert_eq!(ab.text_end_position(), 4);

        let cd = block.child(1).unwrap();
        assert_eq!(cd.position(), 5);
        assert_eq!(cd.end_position(), 7);
    }

    #[test]
    fn test_child_cache_returns_same_instance() {
        let root = sample_root();
        let block = root.child(0).unwrap();
        let a = block.child(0).unwrap();
        let b = block.child(0).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.parent().unwrap() == &block, true);
    }

    #[test]
    fn test_sibling_navigation() {
        let root = sample_root();
        let block = root.child(0).unwrap();
        let ab = block.child(0).unwrap();
        let cd = ab.next_sibling().unwrap();
        assert_eq!(cd.green().text(), Some("cd"));
        assert_eq!(cd.previous_sibling().unwrap(), ab);
        assert_eq!(cd.next_sibling(), None);
        assert_eq!(ab.previous_sibling(), None);
    }

    #[test]
    fn test_delimiter_nodes() {
        let root = sample_root();
        let block = root.child(0).unwrap();
        let opener = block.opener_node().unwrap();
        let closer = block.closer_node().unwrap();
        assert_eq!(opener.position(), 0);
        assert_eq!(opener.slot(), RedSlot::Opener);
        assert_eq!(closer.position(), 7);
        assert_eq!(closer.end_position(), 9);
        assert_eq!(opener.next_sibling(), None);
    }

    #[test]
    fn test_find_leaf_at() {
        let root = sample_root();
        // "{ ab cd }": 0 '{', 1 ' ', 2-3 "ab", 4 ' ', 5-6 "cd", 7 ' ', 8 '}'
        assert_eq!(root.find_leaf_at(0).unwrap().green().text(), Some("{"));
        assert_eq!(root.find_leaf_at(1).unwrap().green().text(), Some("{"));
        assert_eq!(root.find_leaf_at(2).unwrap().green().text(), Some("ab"));
        assert_eq!(root.find_leaf_at(4).unwrap().green().text(), Some("ab"));
        assert_eq!(root.find_leaf_at(5).unwrap().green().text(), Some("cd"));
        assert_eq!(root.find_leaf_at(7).unwrap().green().text(), Some("}"));
        assert_eq!(root.find_leaf_at(8).unwrap().green().text(), Some("}"));
        assert_eq!(root.find_leaf_at(9), None);
    }

    #[test]
    fn test_find_node_at() {
        let root = sample_root();
        let node = root.find_node_at(3).unwrap();
        assert_eq!(node.kind(), SyntaxKind::BRACE_BLOCK);
        assert_eq!(root.find_node_at(20), None);
    }

    #[test]
    fn test_red_equality_is_green_identity_plus_position() {
        let root = sample_root();
        let again = RedNode::new_root(root.green().clone());
        assert_eq!(root.child(0).unwrap(), again.child(0).unwrap());
    }

    #[test]
    fn test_preorder_events_balance() {
        let root = sample_root();
        let events: Vec<_> = root.preorder().collect();
        // every Enter has a matching Leave: root, block, ab, cd
        assert_eq!(events.len(), 8);
        assert_eq!(events.first(), Some(&WalkEvent::Enter(root.clone())));
        assert_eq!(events.last(), Some(&WalkEvent::Leave(root.clone())));
    }

    #[test]
    fn test_descendants_in_document_order() {
        let root = sample_root();
        let kinds: Vec<_> = root.descendants().map(|n| n.kind()).collect();
        assert_eq!(
            kinds,
            vec![SyntaxKind::TOKEN_LIST, SyntaxKind::BRACE_BLOCK, SyntaxKind::IDENT, SyntaxKind::IDENT]
        );
    }

    #[test]
    fn test_siblings_iterator() {
        let root = sample_root();
        let block = root.child(0).unwrap();
        let ab = block.child(0).unwrap();
        assert_eq!(ab.siblings(Direction::Forward).count(), 2);
        let cd = block.child(1).unwrap();
        assert_eq!(cd.siblings(Direction::Backward).count(), 2);
        assert_eq!(cd.siblings(Direction::Forward).count(), 1);
    }
}
