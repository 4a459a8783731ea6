use rustc_hash::FxHashSet;

/// A comment notation the lexers recognise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentStyle {
    /// Opened by `start`, terminated by the next newline (newline excluded).
    Line { start: Box<str> },
    /// Opened by `start`, terminated by the matching `end` (end included).
    Block { start: Box<str>, end: Box<str> },
}

impl CommentStyle {
    pub fn line(start: impl Into<Box<str>>) -> CommentStyle {
        CommentStyle::Line { start: start.into() }
    }

    pub fn block(start: impl Into<Box<str>>, end: impl Into<Box<str>>) -> CommentStyle {
        CommentStyle::Block { start: start.into(), end: end.into() }
    }

    #[inline]
    pub fn start(&self) -> &str {
        match self {
            CommentStyle::Line { start } => start,
            CommentStyle::Block { start, .. } => start,
        }
    }

    /// The closing marker; `None` for line comments, which end at a newline.
    #[inline]
    pub fn terminator(&self) -> Option<&str> {
        match self {
            CommentStyle::Line { .. } => None,
            CommentStyle::Block { end, .. } => Some(end),
        }
    }

    #[inline]
    pub fn is_block(&self) -> bool {
        matches!(self, CommentStyle::Block { .. })
    }
}

/// Character-level configuration consumed by the lexers: which characters are
/// symbols, which multi-character operators exist, how comments look, and
/// which prefixes glue onto identifiers.
///
/// Read-only from the tree's point of view; schemas own and hand these out.
#[derive(Debug, Clone)]
pub struct TokenizerOptions {
    symbols: FxHashSet<char>,
    operators: Vec<Box<str>>,
    operator_chars: FxHashSet<char>,
    comments: Vec<CommentStyle>,
    tag_prefixes: FxHashSet<char>,
}

impl TokenizerOptions {
    /// An empty configuration: no symbols, operators, comments or tags.
    pub fn empty() -> TokenizerOptions {
        TokenizerOptions {
            symbols: FxHashSet::default(),
            operators: Vec::new(),
            operator_chars: FxHashSet::default(),
            comments: Vec::new(),
            tag_prefixes: FxHashSet::default(),
        }
    }

    pub fn with_symbols(mut self, symbols: impl IntoIterator<Item = char>) -> TokenizerOptions {
        self.symbols = symbols.into_iter().collect();
        self
    }

    /// Sets the multi-character operator set. Operator-capable characters are
    /// derived from the given strings.
    pub fn with_operators<S: Into<Box<str>>>(mut self, operators: impl IntoIterator<Item = S>) -> TokenizerOptions {
        self.operators = operators.into_iter().map(Into::into).collect();
        self.operator_chars = self.operators.iter().flat_map(|op| op.chars()).collect();
        self
    }

    /// Adds a line comment style opened by `start`.
    pub fn with_line_comment(self, start: impl Into<Box<str>>) -> TokenizerOptions {
        self.with_comment_style(CommentStyle::line(start))
    }

    /// Adds a block comment style delimited by `start` and `end`.
    pub fn with_block_comment(self, start: impl Into<Box<str>>, end: impl Into<Box<str>>) -> TokenizerOptions {
        self.with_comment_style(CommentStyle::block(start, end))
    }

    pub fn with_comment_style(mut self, style: CommentStyle) -> TokenizerOptions {
        self.comments.push(style);
        self
    }

    pub fn with_tag_prefixes(mut self, prefixes: impl IntoIterator<Item = char>) -> TokenizerOptions {
        self.tag_prefixes = prefixes.into_iter().collect();
        self
    }

    #[inline]
    pub fn is_symbol(&self, c: char) -> bool {
        self.symbols.contains(&c)
    }

    #[inline]
    pub fn is_operator_char(&self, c: char) -> bool {
        self.operator_chars.contains(&c)
    }

    #[inline]
    pub fn operators(&self) -> &[Box<str>] {
        &self.operators
    }

    /// Configured comment notations, in declaration order. Earlier styles
    /// win when two start markers share a prefix.
    #[inline]
    pub fn comment_styles(&self) -> &[CommentStyle] {
        &self.comments
    }

    #[inline]
    pub fn is_tag_prefix(&self, c: char) -> bool {
        self.tag_prefixes.contains(&c)
    }
}

impl Default for TokenizerOptions {
    /// A conventional C-family configuration so sources parse without a
    /// schema: common punctuation symbols, two-character operators, `//` and
    /// `/* */` comments, no tag prefixes.
    fn default() -> TokenizerOptions {
        TokenizerOptions::empty()
            .with_symbols("{}[]().,;:+-*/=<>!&|^%~?@#".chars())
            .with_operators(["==", "!=", "<=", ">=", "&&", "||", "->", "=>", "::"])
            .with_line_comment("//")
            .with_block_comment("/*", "*/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_configuration() {
        let options = TokenizerOptions::default();
        assert_eq!(options.is_symbol('{'), true);
        assert_eq!(options.is_symbol('a'), false);
        assert_eq!(
            options.comment_styles(),
            &[CommentStyle::line("//"), CommentStyle::block("/*", "*/")]
        );
        assert_eq!(options.is_tag_prefix('#'), false);
    }

    #[test]
    fn test_comment_style_accessors() {
        let line = CommentStyle::line("#");
        assert_eq!(line.start(), "#");
        assert_eq!(line.terminator(), None);
        assert_eq!(line.is_block(), false);

        let block = CommentStyle::block("(*", "*)");
        assert_eq!(block.start(), "(*");
        assert_eq!(block.terminator(), Some("*)"));
        assert_eq!(block.is_block(), true);
    }

    #[test]
    fn test_multiple_comment_styles_accumulate() {
        let options = TokenizerOptions::empty()
            .with_line_comment("//")
            .with_line_comment("#")
            .with_block_comment("(*", "*)");
        assert_eq!(options.comment_styles().len(), 3);
        assert_eq!(options.comment_styles()[1], CommentStyle::line("#"));
    }

    #[test]
    fn test_operator_chars_derived() {
        let options = TokenizerOptions::empty().with_operators(["==", "->"]);
        assert_eq!(options.is_operator_char('='), true);
        assert_eq!(options.is_operator_char('-'), true);
        assert_eq!(options.is_operator_char('>'), true);
        assert_eq!(options.is_operator_char('+'), false);
    }
}
