use std::sync::OnceLock;

use triomphe::Arc;

use query::Query;
use syntax::{GreenNode, RedNode, SyntaxKind, TokenizerOptions, TreeWalker, WhatToShow};

use crate::{Editor, Schema, bind};

/// Owns the current green root, a lazily created red root, the undo/redo
/// stacks, and an optional schema used for keyword resolution and binding.
///
/// Green roots are immutable; every mutation installs a fresh root and
/// invalidates previously handed-out red nodes. Readers holding the old root
/// keep seeing a consistent snapshot.
pub struct SyntaxTree {
    root: GreenNode,
    red: OnceLock<RedNode>,
    schema: Option<Arc<Schema>>,
    options: TokenizerOptions,
    undo: Vec<GreenNode>,
    redo: Vec<GreenNode>,
}

impl SyntaxTree {
    /// Parses with the conventional default tokenizer options and no schema.
    pub fn parse(text: &str) -> SyntaxTree {
        let options = TokenizerOptions::default();
        let root = parser::parse(text, &options, None);
        SyntaxTree::assemble(root, None, options)
    }

    /// Parses with the schema's tokenizer options and keywords, without
    /// running the binder.
    pub fn parse_with(text: &str, schema: Arc<Schema>) -> SyntaxTree {
        let root = parser::parse(text, schema.tokenizer(), Some(schema.keywords()));
        let options = schema.tokenizer().clone();
        SyntaxTree::assemble(root, Some(schema), options)
    }

    /// Parses and immediately binds the schema's syntax definitions.
    pub fn parse_and_bind(text: &str, schema: Arc<Schema>) -> SyntaxTree {
        let mut tree = SyntaxTree::parse_with(text, schema);
        tree.bind();
        tree
    }

    /// Wraps an existing green root.
    pub fn from_green(root: GreenNode) -> SyntaxTree {
        SyntaxTree::assemble(root, None, TokenizerOptions::default())
    }

    /// A new tree over the same green root carrying `schema`, bound if the
    /// schema has definitions. History does not carry over.
    pub fn with_schema(&self, schema: Arc<Schema>) -> SyntaxTree {
        let root = if schema.has_definitions() {
            bind::bind(&self.root, &schema)
        } else {
            self.root.clone()
        };
        let options = schema.tokenizer().clone();
        SyntaxTree::assemble(root, Some(schema), options)
    }

    fn assemble(root: GreenNode, schema: Option<Arc<Schema>>, options: TokenizerOptions) -> SyntaxTree {
        SyntaxTree { root, red: OnceLock::new(), schema, options, undo: Vec::new(), redo: Vec::new() }
    }

    /// Re-binds the current root against the attached schema, in place.
    /// Does not touch history; a no-op without a schema.
    pub fn bind(&mut self) {
        if let Some(schema) = self.schema.clone() {
            let bound = bind::bind(&self.root, &schema);
            if !bound.ptr_eq(&self.root) {
                self.root = bound;
                self.red = OnceLock::new();
            }
        }
    }

    #[inline]
    pub fn green_root(&self) -> &GreenNode {
        &self.root
    }

    /// The red root for the current green root, created once per root.
    pub fn root(&self) -> RedNode {
        self.red.get_or_init(|| RedNode::new_root(self.root.clone())).clone()
    }

    pub fn schema(&self) -> Option<&Schema> {
        self.schema.as_deref()
    }

    /// Resolves schema-dependent parts of `query`, then selects matching
    /// nodes in document order.
    pub fn select(&self, query: &Query) -> impl Iterator<Item = RedNode> + use<> {
        if let Some(schema) = self.schema() {
            query.resolve(schema.keywords());
        }
        query.select(&self.root())
    }

    pub fn find_node_at(&self, position: u32) -> Option<RedNode> {
        self.root().find_node_at(position)
    }

    pub fn find_leaf_at(&self, position: u32) -> Option<RedNode> {
        self.root().find_leaf_at(position)
    }

    /// All token leaves in document order. Block delimiters are not slots
    /// and are reached through their blocks instead.
    pub fn leaves(&self) -> impl Iterator<Item = RedNode> + use<> {
        TreeWalker::new(self.root(), WhatToShow::LEAVES)
    }

    pub fn nodes_of_kind(&self, kind: SyntaxKind) -> impl Iterator<Item = RedNode> + use<> {
        TreeWalker::new(self.root(), WhatToShow::ALL).filter(move |node| node.kind() == kind)
    }

    /// Byte-exact rendering of the whole tree.
    pub fn to_text(&self) -> String {
        self.root.to_text()
    }

    /// Indented structure dump for debugging.
    pub fn dump(&self) -> String {
        self.root().dump()
    }

    /// An editor batching edits against this tree, lexing inserted text with
    /// the tree's tokenizer options.
    pub fn create_editor(&mut self) -> Editor<'_> {
        let options = self.options.clone();
        Editor::new(self, options)
    }

    /// As [`SyntaxTree::create_editor`], with explicit tokenizer options.
    pub fn create_editor_with(&mut self, options: TokenizerOptions) -> Editor<'_> {
        Editor::new(self, options)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Reverts to the previous root. Returns false when there is nothing to
    /// undo.
    pub fn undo(&mut self) -> bool {
        match self.undo.pop() {
            Some(previous) => {
                let current = std::mem::replace(&mut self.root, previous);
                self.redo.push(current);
                self.red = OnceLock::new();
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        match self.redo.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.root, next);
                self.undo.push(current);
                self.red = OnceLock::new();
                true
            }
            None => false,
        }
    }

    pub fn clear_history(&mut self) {
        self.undo.clear();
        self.redo.clear();
    }

    /// Installs a committed root: previous root onto the undo stack, redo
    /// cleared, red cache invalidated.
    pub(crate) fn install_edited_root(&mut self, root: GreenNode) {
        let previous = std::mem::replace(&mut self.root, root);
        self.undo.push(previous);
        self.redo.clear();
        self.red = OnceLock::new();
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("width", &self.root.width())
            .field("has_schema", &self.schema.is_some())
            .field("undo_depth", &self.undo.len())
            .finish()
    }
}
