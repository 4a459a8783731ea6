//! Query-driven batched editor.
//!
//! Operations resolve their queries against the current tree when queued,
//! recording `(parent path, child index, absolute position)` per target.
//! `commit` sorts the batch by position descending (ties: later-queued
//! first), applies each edit through a fresh builder so earlier positions are
//! never shifted, transfers trivia on replacements, re-binds at the common
//! ancestor path, and installs the new root atomically with undo recorded.

use query::{Query, Region};
use syntax::{GreenNode, RedNode, TokenizerOptions, TreeBuilder, TreeError, Trivia};

use crate::{Schema, SyntaxTree, bind::bind_at_path};

/// Where an insertion lands relative to each query match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    Before,
    After,
    /// First slot inside a matched container, just past a block's opener.
    InnerStart,
    /// Past the last slot inside a matched container, just before a block's
    /// closer.
    InnerEnd,
}

enum EditSource {
    Text(String),
    Nodes(Vec<GreenNode>),
}

enum EditOp {
    Insert { path: Vec<u32>, index: u32, source: EditSource },
    Remove { path: Vec<u32>, index: u32 },
    Replace { path: Vec<u32>, index: u32, source: EditSource, leading: Vec<Trivia>, trailing: Vec<Trivia> },
}

impl EditOp {
    fn path(&self) -> &[u32] {
        match self {
            EditOp::Insert { path, .. } | EditOp::Remove { path, .. } | EditOp::Replace { path, .. } => path,
        }
    }
}

struct PendingEdit {
    position: u32,
    seq: u64,
    op: EditOp,
}

/// A batch of edits against one tree. Dropping the editor without calling
/// [`Editor::commit`] discards the batch.
pub struct Editor<'tree> {
    tree: &'tree mut SyntaxTree,
    options: TokenizerOptions,
    pending: Vec<PendingEdit>,
    next_seq: u64,
}

impl<'tree> Editor<'tree> {
    pub(crate) fn new(tree: &'tree mut SyntaxTree, options: TokenizerOptions) -> Editor<'tree> {
        Editor { tree, options, pending: Vec::new(), next_seq: 0 }
    }

    /// Queues a text insertion at `at` relative to every match of `query`.
    /// The text is lexed at commit time with the editor's tokenizer options.
    pub fn insert(&mut self, query: &Query, at: InsertPosition, text: &str) {
        self.queue_inserts(query, at, |_| EditSource::Text(text.to_owned()));
    }

    /// Queues an insertion of ready-made green nodes.
    pub fn insert_nodes(&mut self, query: &Query, at: InsertPosition, nodes: Vec<GreenNode>) {
        self.queue_inserts(query, at, move |_| EditSource::Nodes(nodes.clone()));
    }

    /// Queues removal of the matched node of every match.
    pub fn remove(&mut self, query: &Query) {
        for region in self.resolve(query) {
            if region.consumed() == 0 {
                continue;
            }
            self.push(region.position(), EditOp::Remove {
                path: region.parent_path().to_vec(),
                index: region.start_slot(),
            });
        }
    }

    /// Queues replacement of every matched node by `text`, transferring the
    /// original's leading and trailing trivia onto the replacement.
    pub fn replace(&mut self, query: &Query, text: &str) {
        self.queue_replacements(query, |_| EditSource::Text(text.to_owned()));
    }

    pub fn replace_nodes(&mut self, query: &Query, nodes: Vec<GreenNode>) {
        self.queue_replacements(query, move |_| EditSource::Nodes(nodes.clone()));
    }

    /// Replacement with per-match text computed from the matched node.
    pub fn replace_with(&mut self, query: &Query, transform: impl Fn(&RedNode) -> String) {
        self.queue_replacements(query, |node| EditSource::Text(transform(node)));
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Discards all queued edits without touching the tree.
    pub fn rollback(mut self) {
        self.pending.clear();
    }

    /// Applies the batch atomically. On error the tree is left untouched.
    /// Committing an empty batch is a no-op.
    pub fn commit(mut self) -> Result<(), TreeError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut edits = std::mem::take(&mut self.pending);
        edits.sort_by(|a, b| b.position.cmp(&a.position).then(b.seq.cmp(&a.seq)));
        tracing::debug!(count = edits.len(), "committing edit batch");

        let mut root = self.tree.green_root().clone();
        for edit in &edits {
            let builder = TreeBuilder::new(root);
            root = match &edit.op {
                EditOp::Insert { path, index, source } => {
                    let nodes = self.realize(source);
                    if nodes.is_empty() {
                        builder.root().clone()
                    } else {
                        builder.insert_at(path, *index, &nodes)?
                    }
                }
                EditOp::Remove { path, index } => builder.remove_at(path, *index, 1)?,
                EditOp::Replace { path, index, source, leading, trailing } => {
                    let mut nodes = self.realize(source);
                    if nodes.is_empty() {
                        // empty replacement drops the original's trivia
                        builder.remove_at(path, *index, 1)?
                    } else {
                        transfer_trivia(&mut nodes, leading, trailing);
                        builder.replace_at(path, *index, 1, &nodes)?
                    }
                }
            };
        }

        if let Some(schema) = self.tree.schema()
            && schema.has_definitions()
        {
            let rebind_path = common_prefix(edits.iter().map(|e| e.op.path()));
            root = bind_at_path(&root, &rebind_path, schema)?;
        }

        self.tree.install_edited_root(root);
        Ok(())
    }

    fn push(&mut self, position: u32, op: EditOp) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(PendingEdit { position, seq, op });
    }

    fn resolve(&self, query: &Query) -> Vec<Region> {
        if let Some(schema) = self.tree.schema() {
            query.resolve(schema.keywords());
        }
        query.resolve_regions(&self.tree.root()).collect()
    }

    fn queue_inserts(&mut self, query: &Query, at: InsertPosition, source: impl Fn(&Region) -> EditSource) {
        for region in self.resolve(query) {
            let edit = match at {
                InsertPosition::Before => Some((
                    region.position(),
                    region.parent_path().to_vec(),
                    region.start_slot(),
                )),
                InsertPosition::After => Some((
                    region.position_after(),
                    region.parent_path().to_vec(),
                    region.start_slot() + region.consumed(),
                )),
                InsertPosition::InnerStart | InsertPosition::InnerEnd => {
                    region.first().filter(|node| node.green().is_container()).map(|node| {
                        let mut path = region.parent_path().to_vec();
                        path.push(region.start_slot());
                        match at {
                            InsertPosition::InnerStart => (node.inner_start_position(), path, 0),
                            _ => (node.inner_end_position(), path, node.slot_count() as u32),
                        }
                    })
                }
            };
            if let Some((position, path, index)) = edit {
                let source = source(&region);
                self.push(position, EditOp::Insert { path, index, source });
            }
        }
    }

    fn queue_replacements(&mut self, query: &Query, source: impl Fn(&RedNode) -> EditSource) {
        for region in self.resolve(query) {
            let Some(node) = region.first() else { continue };
            if region.consumed() == 0 {
                continue;
            }
            let leading = node.green().first_leaf().map(|l| l.leading_trivia().to_vec()).unwrap_or_default();
            let trailing = node.green().last_leaf().map(|l| l.trailing_trivia().to_vec()).unwrap_or_default();
            let source = source(node);
            self.push(region.position(), EditOp::Replace {
                path: region.parent_path().to_vec(),
                index: region.start_slot(),
                source,
                leading,
                trailing,
            });
        }
    }

    /// Turns an edit source into green nodes, lexing text with the editor's
    /// tokenizer options and the tree's keywords.
    fn realize(&self, source: &EditSource) -> Vec<GreenNode> {
        match source {
            EditSource::Nodes(nodes) => nodes.clone(),
            EditSource::Text(text) => {
                let keywords = self.tree.schema().map(Schema::keywords);
                parser::parse(text, &self.options, keywords).children().to_vec()
            }
        }
    }
}

/// Prepends the replaced node's leading trivia to the first replacement and
/// appends its trailing trivia to the last.
fn transfer_trivia(nodes: &mut [GreenNode], leading: &[Trivia], trailing: &[Trivia]) {
    if !leading.is_empty() {
        let first = &nodes[0];
        let mut combined = leading.to_vec();
        combined.extend(first.first_leaf().map(|l| l.leading_trivia().to_vec()).unwrap_or_default());
        nodes[0] = first.with_leading_trivia(combined);
    }
    if !trailing.is_empty() {
        let last_index = nodes.len() - 1;
        let last = &nodes[last_index];
        let mut combined = last.last_leaf().map(|l| l.trailing_trivia().to_vec()).unwrap_or_default();
        combined.extend(trailing.iter().cloned());
        nodes[last_index] = last.with_trailing_trivia(combined);
    }
}

/// Longest common prefix of the touched container paths; the rebind target.
fn common_prefix<'a>(mut paths: impl Iterator<Item = &'a [u32]>) -> Vec<u32> {
    let Some(first) = paths.next() else { return Vec::new() };
    let mut prefix = first.to_vec();
    for path in paths {
        let shared = prefix.iter().zip(path.iter()).take_while(|(a, b)| a == b).count();
        prefix.truncate(shared);
        if prefix.is_empty() {
            break;
        }
    }
    prefix
}
