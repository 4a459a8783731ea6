//! Structural-sharing mutators. Every method returns a new node; the receiver
//! and all untouched children are shared by reference.

use crate::{GreenNode, Trivia};

use super::node::GreenVariant;

impl GreenNode {
    /// Rebuilds this container with `children`, preserving its shape: a block
    /// keeps its opener and closer, a list stays a list, a syntax wrapper
    /// keeps its kind. Panics on a leaf.
    pub fn with_children(&self, children: Vec<GreenNode>) -> GreenNode {
        match self.variant() {
            GreenVariant::Leaf { .. } => panic!("leaf nodes have no children"),
            GreenVariant::Block { opener, closer, .. } => {
                GreenNode::block(opener.clone(), children, closer.clone())
            }
            GreenVariant::List { .. } => GreenNode::list(children),
            GreenVariant::Syntax { .. } => GreenNode::syntax(self.kind(), children),
        }
    }

    /// Replaces the child at `index`. `None` if out of range or a leaf.
    pub fn with_slot(&self, index: usize, node: GreenNode) -> Option<GreenNode> {
        if self.is_leaf() || index >= self.slot_count() {
            return None;
        }
        let mut children = self.children().to_vec();
        children[index] = node;
        Some(self.with_children(children))
    }

    /// Inserts `nodes` so the first lands at slot `index` (`index` may equal
    /// the slot count to append). `None` if out of range or a leaf.
    pub fn with_insert(&self, index: usize, nodes: &[GreenNode]) -> Option<GreenNode> {
        if self.is_leaf() || index > self.slot_count() {
            return None;
        }
        let mut children = self.children().to_vec();
        children.splice(index..index, nodes.iter().cloned());
        Some(self.with_children(children))
    }

    /// Removes `count` children starting at slot `index`.
    pub fn with_remove(&self, index: usize, count: usize) -> Option<GreenNode> {
        let end = index.checked_add(count)?;
        if self.is_leaf() || end > self.slot_count() {
            return None;
        }
        let mut children = self.children().to_vec();
        children.drain(index..end);
        Some(self.with_children(children))
    }

    /// Replaces `count` children starting at slot `index` with `nodes`.
    pub fn with_replace(&self, index: usize, count: usize, nodes: &[GreenNode]) -> Option<GreenNode> {
        let end = index.checked_add(count)?;
        if self.is_leaf() || end > self.slot_count() {
            return None;
        }
        let mut children = self.children().to_vec();
        children.splice(index..end, nodes.iter().cloned());
        Some(self.with_children(children))
    }

    /// Rebuilds with new leading trivia on the first token of the subtree: a
    /// leaf's own leading, a block's opener, or a container's first child. A
    /// childless container is returned unchanged.
    pub fn with_leading_trivia(&self, trivia: Vec<Trivia>) -> GreenNode {
        match self.variant() {
            GreenVariant::Leaf { text, trailing, .. } => {
                GreenNode::leaf(self.kind(), text.clone(), trivia, trailing.to_vec())
            }
            GreenVariant::Block { opener, children, closer, .. } => GreenNode::block(
                opener.with_leading_trivia(trivia),
                children.to_vec(),
                closer.clone(),
            ),
            GreenVariant::List { children } | GreenVariant::Syntax { children } => match children.first() {
                None => self.clone(),
                Some(first) => {
                    let mut children = children.to_vec();
                    children[0] = first.with_leading_trivia(trivia);
                    self.with_children(children)
                }
            },
        }
    }

    /// Mirror of [`GreenNode::with_leading_trivia`] for the last token.
    pub fn with_trailing_trivia(&self, trivia: Vec<Trivia>) -> GreenNode {
        match self.variant() {
            GreenVariant::Leaf { text, leading, .. } => {
                GreenNode::leaf(self.kind(), text.clone(), leading.to_vec(), trivia)
            }
            GreenVariant::Block { opener, children, closer, .. } => GreenNode::block(
                opener.clone(),
                children.to_vec(),
                closer.with_trailing_trivia(trivia),
            ),
            GreenVariant::List { children } | GreenVariant::Syntax { children } => match children.last() {
                None => self.clone(),
                Some(last) => {
                    let mut children = children.to_vec();
                    let index = children.len() - 1;
                    children[index] = last.with_trailing_trivia(trivia);
                    self.with_children(children)
                }
            },
        }
    }
}
