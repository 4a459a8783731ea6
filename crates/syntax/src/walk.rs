//! Depth-first traversal over red nodes with category masking and filtering.

use bitflags::bitflags;

use crate::RedNode;

/// Traversal event for callers that need enter/leave pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkEvent<T> {
    Enter(T),
    Leave(T),
}

bitflags! {
    /// Which node categories a walker yields.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct WhatToShow: u8 {
        const LEAVES = 1 << 0;
        const BLOCKS = 1 << 1;
        const LISTS  = 1 << 2;
        const SYNTAX = 1 << 3;
        /// The node traversal starts from.
        const ROOT   = 1 << 4;
        const ALL    = Self::LEAVES.bits() | Self::BLOCKS.bits() | Self::LISTS.bits() | Self::SYNTAX.bits() | Self::ROOT.bits();
    }
}

/// Per-node verdict from a walker filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterResult {
    /// Yield the node and descend into it.
    Accept,
    /// Do not yield the node, but descend into its children.
    Skip,
    /// Prune: neither yield nor descend.
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

enum Frame {
    Visit(RedNode),
    Emit(RedNode),
}

/// Depth-first iterator over a subtree. Forward order is preorder (document
/// order); backward order is its exact reverse.
pub struct TreeWalker {
    root: RedNode,
    stack: Vec<Frame>,
    show: WhatToShow,
    direction: Direction,
    filter: Option<Box<dyn Fn(&RedNode) -> FilterResult>>,
}

impl TreeWalker {
    pub fn new(root: RedNode, show: WhatToShow) -> TreeWalker {
        TreeWalker {
            stack: vec![Frame::Visit(root.clone())],
            root,
            show,
            direction: Direction::Forward,
            filter: None,
        }
    }

    pub fn backward(mut self) -> TreeWalker {
        self.direction = Direction::Backward;
        self
    }

    pub fn with_filter(mut self, filter: impl Fn(&RedNode) -> FilterResult + 'static) -> TreeWalker {
        self.filter = Some(Box::new(filter));
        self
    }

    fn is_shown(&self, node: &RedNode) -> bool {
        if *node == self.root {
            return self.show.contains(WhatToShow::ROOT);
        }
        let category = if node.is_leaf() {
            WhatToShow::LEAVES
        } else if node.is_block() {
            WhatToShow::BLOCKS
        } else if node.green().is_list() {
            WhatToShow::LISTS
        } else {
            WhatToShow::SYNTAX
        };
        self.show.intersects(category)
    }
}

impl Iterator for TreeWalker {
    type Item = RedNode;

    fn next(&mut self) -> Option<RedNode> {
        loop {
            match self.stack.pop()? {
                Frame::Emit(node) => return Some(node),
                Frame::Visit(node) => {
                    let verdict = match &self.filter {
                        Some(filter) => filter(&node),
                        None => FilterResult::Accept,
                    };
                    if verdict == FilterResult::Reject {
                        continue;
                    }
                    let emit = verdict == FilterResult::Accept && self.is_shown(&node);
                    match self.direction {
                        Direction::Forward => {
                            // children in reverse so the first child pops first
                            let children: Vec<_> = node.children().collect();
                            for child in children.into_iter().rev() {
                                self.stack.push(Frame::Visit(child));
                            }
                            if emit {
                                return Some(node);
                            }
                        }
                        Direction::Backward => {
                            if emit {
                                self.stack.push(Frame::Emit(node.clone()));
                            }
                            // forward order: the last child is processed first
                            for child in node.children() {
                                self.stack.push(Frame::Visit(child));
                            }
                        }
                    }
                }
            }
        }
    }
}

/// Preorder walker that tracks the slot-index path of the visited node in
/// O(1) extra work per step: indices are pushed on descent and popped on
/// ascent. Not an `Iterator` because the path is borrowed between steps.
pub struct PathWalker {
    pending_root: Option<RedNode>,
    frames: Vec<(RedNode, usize)>,
    path: Vec<u32>,
}

impl PathWalker {
    pub fn new(root: RedNode) -> PathWalker {
        PathWalker { pending_root: Some(root), frames: Vec::new(), path: Vec::new() }
    }

    /// Slot-index path from the root to the most recently returned node.
    pub fn path(&self) -> &[u32] {
        &self.path
    }

    pub fn next(&mut self) -> Option<RedNode> {
        if let Some(root) = self.pending_root.take() {
            self.frames.push((root.clone(), 0));
            return Some(root);
        }
        loop {
            let descended = {
                let (node, index) = self.frames.last_mut()?;
                if *index < node.slot_count() {
                    let slot = *index;
                    *index += 1;
                    Some((node.child(slot).expect("index bounded by slot_count"), slot))
                } else {
                    None
                }
            };
            match descended {
                Some((child, slot)) => {
                    self.path.push(slot as u32);
                    self.frames.push((child.clone(), 0));
                    return Some(child);
                }
                None => {
                    self.frames.pop();
                    self.path.pop();
                }
            }
        }
    }
}
