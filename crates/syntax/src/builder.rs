//! Path-addressed surgery on a green root.
//!
//! A path is the sequence of slot indices from the root to a target
//! container. Each operation rebuilds only the spine from the root to that
//! container; every sibling off the spine is shared by reference with the
//! old tree.

use crate::{GreenNode, Trivia, TreeError};

pub struct TreeBuilder {
    root: GreenNode,
}

impl TreeBuilder {
    pub fn new(root: GreenNode) -> TreeBuilder {
        TreeBuilder { root }
    }

    #[inline]
    pub fn root(&self) -> &GreenNode {
        &self.root
    }

    /// Inserts `nodes` into the container at `path` so the first lands at
    /// slot `index`.
    pub fn insert_at(&self, path: &[u32], index: u32, nodes: &[GreenNode]) -> Result<GreenNode, TreeError> {
        self.rewrite(path, |container| {
            container
                .with_insert(index as usize, nodes)
                .ok_or(TreeError::OutOfRange { index, len: container.slot_count() as u32 })
        })
    }

    /// Removes `count` children of the container at `path` starting at `index`.
    pub fn remove_at(&self, path: &[u32], index: u32, count: u32) -> Result<GreenNode, TreeError> {
        self.rewrite(path, |container| {
            container.with_remove(index as usize, count as usize).ok_or(TreeError::RangeOutOfBounds {
                start: index,
                count,
                len: container.slot_count() as u32,
            })
        })
    }

    /// Replaces `count` children starting at `index` with `nodes`.
    pub fn replace_at(&self, path: &[u32], index: u32, count: u32, nodes: &[GreenNode]) -> Result<GreenNode, TreeError> {
        self.rewrite(path, |container| {
            container.with_replace(index as usize, count as usize, nodes).ok_or(TreeError::RangeOutOfBounds {
                start: index,
                count,
                len: container.slot_count() as u32,
            })
        })
    }

    /// Swaps a single child for `node`.
    pub fn replace_child(&self, path: &[u32], index: u32, node: GreenNode) -> Result<GreenNode, TreeError> {
        self.rewrite(path, |container| {
            container
                .with_slot(index as usize, node.clone())
                .ok_or(TreeError::OutOfRange { index, len: container.slot_count() as u32 })
        })
    }

    /// Rewrites the leading trivia of the child at `path`/`index`.
    pub fn update_leading_trivia(&self, path: &[u32], index: u32, trivia: Vec<Trivia>) -> Result<GreenNode, TreeError> {
        self.rewrite(path, |container| {
            let child = container
                .get_slot(index as usize)
                .ok_or(TreeError::OutOfRange { index, len: container.slot_count() as u32 })?;
            let child = child.with_leading_trivia(trivia.clone());
            Ok(container.with_slot(index as usize, child).expect("index checked above"))
        })
    }

    /// Descends `path`, applies `op` to the target container, and rebuilds
    /// the spine bottom-up.
    fn rewrite(
        &self,
        path: &[u32],
        op: impl FnOnce(&GreenNode) -> Result<GreenNode, TreeError>,
    ) -> Result<GreenNode, TreeError> {
        // (container, slot taken out of it) for each step of the spine
        let mut spine: Vec<(GreenNode, u32)> = Vec::with_capacity(path.len());
        let mut current = self.root.clone();
        for &step in path {
            if current.is_leaf() {
                return Err(TreeError::DescendIntoLeaf { kind: current.kind() });
            }
            let child = current
                .get_slot(step as usize)
                .ok_or(TreeError::OutOfRange { index: step, len: current.slot_count() as u32 })?
                .clone();
            spine.push((current, step));
            current = child;
        }
        if current.is_leaf() {
            return Err(TreeError::DescendIntoLeaf { kind: current.kind() });
        }

        let mut rebuilt = op(&current)?;
        for (parent, step) in spine.into_iter().rev() {
            rebuilt = parent.with_slot(step as usize, rebuilt).expect("spine index was valid on descent");
        }
        Ok(rebuilt)
    }
}
