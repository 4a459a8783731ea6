//! The syntax binder: wraps matched sibling runs into schema-defined syntax
//! nodes, bottom-up, with structural sharing for untouched subtrees.

use syntax::{GreenNode, TreeBuilder, TreeError};

use crate::Schema;

/// Binds the whole tree. Returns the same root (by identity) when nothing
/// matched anywhere.
pub fn bind(root: &GreenNode, schema: &Schema) -> GreenNode {
    bind_node(root, schema, true)
}

/// Re-binds only the subtree at `path`, sharing everything off its spine
/// with the input root.
pub fn bind_at_path(root: &GreenNode, path: &[u32], schema: &Schema) -> Result<GreenNode, TreeError> {
    let mut target = root.clone();
    for &step in path {
        target = target
            .get_slot(step as usize)
            .cloned()
            .ok_or(TreeError::OutOfRange { index: step, len: target.slot_count() as u32 })?;
    }
    let bound = bind_node(&target, schema, path.is_empty());
    if bound.ptr_eq(&target) {
        return Ok(root.clone());
    }
    match path.split_last() {
        None => Ok(bound),
        Some((&last, parent_path)) => TreeBuilder::new(root.clone()).replace_child(parent_path, last, bound),
    }
}

fn bind_node(node: &GreenNode, schema: &Schema, is_root: bool) -> GreenNode {
    if node.is_leaf() {
        return node.clone();
    }

    let mut children_changed = false;
    let mut children = Vec::with_capacity(node.slot_count());
    for child in node.children() {
        let bound = bind_node(child, schema, false);
        children_changed |= !bound.ptr_eq(child);
        children.push(bound);
    }

    // A syntax node's direct children are the construct it already wraps;
    // rescanning them would nest a fresh wrapper on every bind.
    if node.is_syntax() {
        if !children_changed {
            return node.clone();
        }
        return node.with_children(children);
    }

    let mut out = Vec::with_capacity(children.len());
    let mut wrapped = false;
    let mut index = 0;
    'scan: while index < children.len() {
        for definition in schema.definitions() {
            for pattern in definition.patterns() {
                let Some(consumed) = pattern.try_match_green(&children, index, is_root) else {
                    continue;
                };
                if consumed == 0 {
                    continue;
                }
                debug_assert!(index + consumed <= children.len());
                tracing::trace!(name = definition.name(), index, consumed, "binding syntax node");
                out.push(GreenNode::syntax(definition.kind(), children[index..index + consumed].to_vec()));
                index += consumed;
                wrapped = true;
                continue 'scan;
            }
        }
        out.push(children[index].clone());
        index += 1;
    }

    if !children_changed && !wrapped {
        return node.clone();
    }
    node.with_children(out)
}
