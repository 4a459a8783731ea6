use query::Query;
use syntax::{KeywordTable, SyntaxKind, TokenizerOptions};

/// One schema-defined construct: a named pattern that the binder wraps into
/// a semantic-band syntax node.
pub struct SyntaxDefinition {
    name: Box<str>,
    kind: SyntaxKind,
    patterns: Vec<Query>,
    priority: i32,
}

impl SyntaxDefinition {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The semantic kind stamped on nodes this definition produces.
    pub fn kind(&self) -> SyntaxKind {
        self.kind
    }

    /// Alternatives, tried in declaration order.
    pub fn patterns(&self) -> &[Query] {
        &self.patterns
    }

    pub fn priority(&self) -> i32 {
        self.priority
    }
}

/// Immutable language configuration the tree consumes: tokenizer options,
/// keyword tables, and the ordered list of syntax definitions.
pub struct Schema {
    tokenizer: TokenizerOptions,
    keywords: KeywordTable,
    definitions: Vec<SyntaxDefinition>,
    /// Indices into `definitions`, highest priority first, declaration order
    /// within equal priorities.
    by_priority: Vec<usize>,
}

impl Schema {
    pub fn new(tokenizer: TokenizerOptions, keywords: KeywordTable) -> Schema {
        Schema { tokenizer, keywords, definitions: Vec::new(), by_priority: Vec::new() }
    }

    /// Registers a syntax definition and assigns it a fresh semantic kind.
    /// Pattern queries are resolved against the keyword table immediately.
    pub fn define_syntax(&mut self, name: &str, priority: i32, patterns: Vec<Query>) -> SyntaxKind {
        let kind = SyntaxKind::semantic(self.definitions.len() as u32);
        for pattern in &patterns {
            pattern.resolve(&self.keywords);
        }
        self.definitions.push(SyntaxDefinition { name: name.into(), kind, patterns, priority });
        self.by_priority = (0..self.definitions.len()).collect();
        self.by_priority.sort_by_key(|&i| -i64::from(self.definitions[i].priority));
        kind
    }

    pub fn tokenizer(&self) -> &TokenizerOptions {
        &self.tokenizer
    }

    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    pub fn has_definitions(&self) -> bool {
        !self.definitions.is_empty()
    }

    /// Definitions in binding order: descending priority, then declaration
    /// order.
    pub fn definitions(&self) -> impl Iterator<Item = &SyntaxDefinition> {
        self.by_priority.iter().map(|&i| &self.definitions[i])
    }

    pub fn definition_named(&self, name: &str) -> Option<&SyntaxDefinition> {
        self.definitions.iter().find(|d| &*d.name == name)
    }

    /// The semantic kind assigned to the named definition.
    pub fn kind_of(&self, name: &str) -> Option<SyntaxKind> {
        self.definition_named(name).map(SyntaxDefinition::kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kinds_are_assigned_from_semantic_band() {
        let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
        let a = schema.define_syntax("A", 0, vec![query::leaf()]);
        let b = schema.define_syntax("B", 0, vec![query::leaf()]);
        assert_eq!(a.is_semantic(), true);
        assert_eq!(b.is_semantic(), true);
        assert_eq!(a == b, false);
        assert_eq!(schema.kind_of("A"), Some(a));
        assert_eq!(schema.kind_of("missing"), None);
    }

    #[test]
    fn test_binding_order_is_priority_then_declaration() {
        let mut schema = Schema::new(TokenizerOptions::default(), KeywordTable::new());
        schema.define_syntax("low", 1, vec![query::leaf()]);
        schema.define_syntax("high", 10, vec![query::leaf()]);
        schema.define_syntax("also_high", 10, vec![query::leaf()]);
        let names: Vec<_> = schema.definitions().map(SyntaxDefinition::name).collect();
        assert_eq!(names, vec!["high", "also_high", "low"]);
    }
}
