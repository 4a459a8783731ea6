use std::fmt;

use bitflags::bitflags;
use countme::Count;
use triomphe::Arc;

use crate::{SyntaxKind, Trivia};

/// Blocks at or above this child count carry a precomputed slot-offset table.
pub(crate) const OFFSET_TABLE_THRESHOLD: usize = 10;

bitflags! {
    /// Facts about a subtree, unioned upward at construction time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct NodeFlags: u8 {
        const CONTAINS_NEWLINE = 1 << 0;
        const CONTAINS_COMMENT = 1 << 1;
        const CONTAINS_ERROR   = 1 << 2;
        const CONTAINS_KEYWORD = 1 << 3;
        /// Set only on the keyword leaf itself.
        const IS_KEYWORD       = 1 << 4;
    }
}

pub(crate) enum GreenVariant {
    Leaf {
        text: Box<str>,
        leading: Box<[Trivia]>,
        trailing: Box<[Trivia]>,
    },
    Block {
        opener: GreenNode,
        children: Box<[GreenNode]>,
        /// Slot offsets relative to the block start, present once the child
        /// count reaches [`OFFSET_TABLE_THRESHOLD`].
        offsets: Option<Box<[u32]>>,
        closer: GreenNode,
    },
    List {
        children: Box<[GreenNode]>,
    },
    Syntax {
        children: Box<[GreenNode]>,
    },
}

pub(crate) struct GreenNodeData {
    kind: SyntaxKind,
    width: u32,
    flags: NodeFlags,
    variant: GreenVariant,
    _c: Count<GreenNode>,
}

/// An immutable tree node: a token leaf, a delimited block, an undelimited
/// list, or a binder-produced syntax wrapper.
///
/// Cloning is a reference-count bump. Equality is identity: two greens are
/// equal iff they are the same allocation; structurally identical trees built
/// separately compare unequal.
#[derive(Clone)]
pub struct GreenNode {
    data: Arc<GreenNodeData>,
}

const NO_TRIVIA: [Trivia; 0] = [];

impl GreenNode {
    /// A token leaf. Empty trivia vectors normalise to the canonical empty
    /// sequence.
    pub fn leaf(kind: SyntaxKind, text: impl Into<Box<str>>, leading: Vec<Trivia>, trailing: Vec<Trivia>) -> GreenNode {
        let text = text.into();
        let leading: Box<[Trivia]> = if leading.is_empty() { Box::new(NO_TRIVIA) } else { leading.into() };
        let trailing: Box<[Trivia]> = if trailing.is_empty() { Box::new(NO_TRIVIA) } else { trailing.into() };

        let mut width = text.len() as u32;
        let mut flags = NodeFlags::empty();
        if kind == SyntaxKind::ERROR {
            flags |= NodeFlags::CONTAINS_ERROR;
        }
        if kind.is_keyword() {
            flags |= NodeFlags::IS_KEYWORD | NodeFlags::CONTAINS_KEYWORD;
        }
        if text.contains('\n') || text.contains('\r') {
            flags |= NodeFlags::CONTAINS_NEWLINE;
        }
        for piece in leading.iter().chain(trailing.iter()) {
            width += piece.width();
            if piece.has_line_break() {
                flags |= NodeFlags::CONTAINS_NEWLINE;
            }
            if piece.is_comment() {
                flags |= NodeFlags::CONTAINS_COMMENT;
            }
        }

        GreenNode::from_parts(kind, width, flags, GreenVariant::Leaf { text, leading, trailing })
    }

    /// A delimited block. The opener must be a leaf whose text starts with a
    /// valid open delimiter; the block kind is derived from it. A closer with
    /// empty text marks an unclosed block.
    pub fn block(opener: GreenNode, children: Vec<GreenNode>, closer: GreenNode) -> GreenNode {
        debug_assert!(opener.is_leaf() && closer.is_leaf());
        let open_char = opener.text().and_then(|t| t.chars().next()).unwrap_or('{');
        let kind = SyntaxKind::block_for_opener(open_char).unwrap_or(SyntaxKind::BRACE_BLOCK);

        let mut flags = opener.flags() | closer.flags();
        flags.remove(NodeFlags::IS_KEYWORD);
        let mut width = opener.width();
        let offsets = if children.len() >= OFFSET_TABLE_THRESHOLD {
            let mut table = Vec::with_capacity(children.len());
            for child in &children {
                table.push(width);
                width += child.width();
                flags |= child.flags() - NodeFlags::IS_KEYWORD;
            }
            Some(table.into_boxed_slice())
        } else {
            for child in &children {
                width += child.width();
                flags |= child.flags() - NodeFlags::IS_KEYWORD;
            }
            None
        };
        width += closer.width();

        GreenNode::from_parts(
            kind,
            width,
            flags,
            GreenVariant::Block { opener, children: children.into(), offsets, closer },
        )
    }

    /// An undelimited list; the root container of every parse.
    pub fn list(children: Vec<GreenNode>) -> GreenNode {
        let (width, flags) = sum_children(&children);
        GreenNode::from_parts(SyntaxKind::TOKEN_LIST, width, flags, GreenVariant::List { children: children.into() })
    }

    /// A binder-produced wrapper; `kind` must lie in the semantic band.
    pub fn syntax(kind: SyntaxKind, children: Vec<GreenNode>) -> GreenNode {
        debug_assert!(kind.is_semantic());
        let (width, flags) = sum_children(&children);
        GreenNode::from_parts(kind, width, flags, GreenVariant::Syntax { children: children.into() })
    }

    fn from_parts(kind: SyntaxKind, width: u32, flags: NodeFlags, variant: GreenVariant) -> GreenNode {
        GreenNode {
            data: Arc::new(GreenNodeData { kind, width, flags, variant, _c: Count::new() }),
        }
    }

    #[inline]
    pub fn kind(&self) -> SyntaxKind {
        self.data.kind
    }

    /// Total width in bytes, trivia included.
    #[inline]
    pub fn width(&self) -> u32 {
        self.data.width
    }

    #[inline]
    pub(crate) fn flags(&self) -> NodeFlags {
        self.data.flags
    }

    #[inline]
    pub fn contains_newline(&self) -> bool {
        self.data.flags.contains(NodeFlags::CONTAINS_NEWLINE)
    }

    #[inline]
    pub fn contains_comment(&self) -> bool {
        self.data.flags.contains(NodeFlags::CONTAINS_COMMENT)
    }

    #[inline]
    pub fn contains_error(&self) -> bool {
        self.data.flags.contains(NodeFlags::CONTAINS_ERROR)
    }

    #[inline]
    pub fn contains_keyword(&self) -> bool {
        self.data.flags.contains(NodeFlags::CONTAINS_KEYWORD)
    }

    #[inline]
    pub fn is_keyword_leaf(&self) -> bool {
        self.data.flags.contains(NodeFlags::IS_KEYWORD)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.data.variant, GreenVariant::Leaf { .. })
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self.data.variant, GreenVariant::Block { .. })
    }

    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self.data.variant, GreenVariant::List { .. })
    }

    #[inline]
    pub fn is_syntax(&self) -> bool {
        matches!(self.data.variant, GreenVariant::Syntax { .. })
    }

    #[inline]
    pub fn is_container(&self) -> bool {
        !self.is_leaf()
    }

    pub(crate) fn variant(&self) -> &GreenVariant {
        &self.data.variant
    }

    /// Children occupying slots. Leaves have none; a block's delimiters are
    /// not slots.
    #[inline]
    pub fn children(&self) -> &[GreenNode] {
        match &self.data.variant {
            GreenVariant::Leaf { .. } => &[],
            GreenVariant::Block { children, .. } => children,
            GreenVariant::List { children } => children,
            GreenVariant::Syntax { children } => children,
        }
    }

    #[inline]
    pub fn slot_count(&self) -> usize {
        self.children().len()
    }

    #[inline]
    pub fn get_slot(&self, index: usize) -> Option<&GreenNode> {
        self.children().get(index)
    }

    /// Offset of slot `index` from the start of this node. O(1) for blocks
    /// carrying an offset table, O(index) otherwise. `None` out of range.
    pub fn slot_offset(&self, index: usize) -> Option<u32> {
        if index >= self.slot_count() {
            return None;
        }
        match &self.data.variant {
            GreenVariant::Leaf { .. } => None,
            GreenVariant::Block { opener, children, offsets, .. } => match offsets {
                Some(table) => Some(table[index]),
                None => Some(opener.width() + prefix_width(children, index)),
            },
            GreenVariant::List { children } | GreenVariant::Syntax { children } => Some(prefix_width(children, index)),
        }
    }

    #[inline]
    pub fn opener(&self) -> Option<&GreenNode> {
        match &self.data.variant {
            GreenVariant::Block { opener, .. } => Some(opener),
            _ => None,
        }
    }

    #[inline]
    pub fn closer(&self) -> Option<&GreenNode> {
        match &self.data.variant {
            GreenVariant::Block { closer, .. } => Some(closer),
            _ => None,
        }
    }

    /// Leaf text, without trivia.
    #[inline]
    pub fn text(&self) -> Option<&str> {
        match &self.data.variant {
            GreenVariant::Leaf { text, .. } => Some(text),
            _ => None,
        }
    }

    #[inline]
    pub fn text_width(&self) -> u32 {
        self.text().map_or(0, |t| t.len() as u32)
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        match &self.data.variant {
            GreenVariant::Leaf { leading, .. } => leading,
            _ => &[],
        }
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        match &self.data.variant {
            GreenVariant::Leaf { trailing, .. } => trailing,
            _ => &[],
        }
    }

    pub fn leading_width(&self) -> u32 {
        self.leading_trivia().iter().map(Trivia::width).sum()
    }

    pub fn trailing_width(&self) -> u32 {
        self.trailing_trivia().iter().map(Trivia::width).sum()
    }

    /// The first token leaf in this subtree, delimiters included.
    pub fn first_leaf(&self) -> Option<&GreenNode> {
        match &self.data.variant {
            GreenVariant::Leaf { .. } => Some(self),
            GreenVariant::Block { opener, .. } => Some(opener),
            GreenVariant::List { children } | GreenVariant::Syntax { children } => {
                children.iter().find_map(|c| c.first_leaf())
            }
        }
    }

    /// The last token leaf in this subtree, delimiters included.
    pub fn last_leaf(&self) -> Option<&GreenNode> {
        match &self.data.variant {
            GreenVariant::Leaf { .. } => Some(self),
            GreenVariant::Block { closer, .. } => Some(closer),
            GreenVariant::List { children } | GreenVariant::Syntax { children } => {
                children.iter().rev().find_map(|c| c.last_leaf())
            }
        }
    }

    /// True if rendering this node would start with a line break, or the
    /// previous sibling's rendering ended with one.
    pub fn leading_has_line_break(&self) -> bool {
        self.first_leaf()
            .is_some_and(|leaf| leaf.leading_trivia().iter().any(Trivia::has_line_break))
    }

    pub fn trailing_has_line_break(&self) -> bool {
        self.last_leaf()
            .is_some_and(|leaf| leaf.trailing_trivia().iter().any(Trivia::has_line_break))
    }

    /// Identity comparison: same allocation.
    #[inline]
    pub fn ptr_eq(&self, other: &GreenNode) -> bool {
        Arc::ptr_eq(&self.data, &other.data)
    }

    /// Stable identity key for hashing and dedup.
    #[inline]
    pub fn key(&self) -> usize {
        (&*self.data) as *const GreenNodeData as usize
    }

    /// Appends the byte-exact rendering of this subtree: leading trivia,
    /// content (or opener, children, closer), trailing trivia.
    pub fn write_to(&self, out: &mut String) {
        match &self.data.variant {
            GreenVariant::Leaf { text, leading, trailing } => {
                for piece in leading.iter() {
                    out.push_str(piece.text());
                }
                out.push_str(text);
                for piece in trailing.iter() {
                    out.push_str(piece.text());
                }
            }
            GreenVariant::Block { opener, children, closer, .. } => {
                opener.write_to(out);
                for child in children.iter() {
                    child.write_to(out);
                }
                closer.write_to(out);
            }
            GreenVariant::List { children } | GreenVariant::Syntax { children } => {
                for child in children.iter() {
                    child.write_to(out);
                }
            }
        }
    }

    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.width() as usize);
        self.write_to(&mut out);
        out
    }
}

fn prefix_width(children: &[GreenNode], index: usize) -> u32 {
    children[..index].iter().map(GreenNode::width).sum()
}

fn sum_children(children: &[GreenNode]) -> (u32, NodeFlags) {
    let mut width = 0;
    let mut flags = NodeFlags::empty();
    for child in children {
        width += child.width();
        flags |= child.flags() - NodeFlags::IS_KEYWORD;
    }
    (width, flags)
}

impl PartialEq for GreenNode {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Eq for GreenNode {}

impl std::hash::Hash for GreenNode {
    #[inline]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Debug for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("GreenNode");
        s.field("kind", &self.kind()).field("width", &self.width());
        if let Some(text) = self.text() {
            s.field("text", &text);
        } else {
            s.field("slots", &self.slot_count());
        }
        s.finish()
    }
}

impl fmt::Display for GreenNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}
