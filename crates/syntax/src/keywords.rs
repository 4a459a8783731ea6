use rustc_hash::FxHashMap;

use crate::SyntaxKind;

/// Keyword registry: text to kind (case-sensitive first, then
/// case-insensitive), kind back to text, and named categories.
///
/// Kinds are handed out from the keyword band in registration order.
#[derive(Debug, Clone, Default)]
pub struct KeywordTable {
    by_text: FxHashMap<Box<str>, SyntaxKind>,
    by_text_folded: FxHashMap<Box<str>, SyntaxKind>,
    by_kind: FxHashMap<SyntaxKind, Box<str>>,
    categories: FxHashMap<Box<str>, Vec<SyntaxKind>>,
    next: u32,
}

impl KeywordTable {
    pub fn new() -> KeywordTable {
        KeywordTable::default()
    }

    /// Registers `text` and returns its kind; re-registering returns the
    /// existing kind.
    pub fn define(&mut self, text: &str) -> SyntaxKind {
        if let Some(&kind) = self.by_text.get(text) {
            return kind;
        }
        let kind = SyntaxKind::keyword(self.next);
        self.next += 1;
        self.by_text.insert(text.into(), kind);
        self.by_text_folded.insert(text.to_lowercase().into(), kind);
        self.by_kind.insert(kind, text.into());
        kind
    }

    /// Registers `text` and records it under `category` as well.
    pub fn define_in_category(&mut self, text: &str, category: &str) -> SyntaxKind {
        let kind = self.define(text);
        let members = self.categories.entry(category.into()).or_default();
        if !members.contains(&kind) {
            members.push(kind);
        }
        kind
    }

    /// Case-sensitive lookup, falling back to case-insensitive.
    pub fn lookup(&self, text: &str) -> Option<SyntaxKind> {
        if let Some(&kind) = self.by_text.get(text) {
            return Some(kind);
        }
        self.by_text_folded.get(text.to_lowercase().as_str()).copied()
    }

    /// Reverse lookup from a keyword kind to its canonical spelling.
    pub fn text_for(&self, kind: SyntaxKind) -> Option<&str> {
        self.by_kind.get(&kind).map(|t| &**t)
    }

    /// Kinds registered under `category`, in registration order.
    pub fn category(&self, name: &str) -> &[SyntaxKind] {
        self.categories.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.by_text.is_empty()
    }

    pub fn len(&self) -> usize {
        self.by_text.len()
    }
}
