use std::fmt;

/// A 32-bit node kind partitioned into fixed bands.
///
/// The low band holds the structural kinds below. Kinds in
/// `1_000..100_000` are keyword kinds handed out by a [`crate::KeywordTable`],
/// and kinds `>= 100_000` are semantic kinds assigned to schema-defined
/// syntax wrappers. Band membership is decidable by range alone.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct SyntaxKind(pub u32);

impl SyntaxKind {
    /// Root container without delimiters.
    pub const TOKEN_LIST: SyntaxKind = SyntaxKind(0);
    pub const IDENT: SyntaxKind = SyntaxKind(1);
    pub const NUMERIC: SyntaxKind = SyntaxKind(2);
    pub const STRING: SyntaxKind = SyntaxKind(3);
    pub const SYMBOL: SyntaxKind = SyntaxKind(4);
    pub const OPERATOR: SyntaxKind = SyntaxKind(5);
    /// Identifier glued to a configured tag prefix, e.g. `#name`.
    pub const TAGGED_IDENT: SyntaxKind = SyntaxKind(6);
    /// Unexpected or unterminated input, kept verbatim.
    pub const ERROR: SyntaxKind = SyntaxKind(7);
    pub const BRACE_BLOCK: SyntaxKind = SyntaxKind(8);
    pub const BRACKET_BLOCK: SyntaxKind = SyntaxKind(9);
    pub const PAREN_BLOCK: SyntaxKind = SyntaxKind(10);

    pub const KEYWORD_BASE: u32 = 1_000;
    pub const SEMANTIC_BASE: u32 = 100_000;

    /// The `n`-th keyword kind. Panics if the keyword band overflows.
    pub const fn keyword(n: u32) -> SyntaxKind {
        assert!(Self::KEYWORD_BASE + n < Self::SEMANTIC_BASE);
        SyntaxKind(Self::KEYWORD_BASE + n)
    }

    /// The `n`-th semantic kind.
    pub const fn semantic(n: u32) -> SyntaxKind {
        SyntaxKind(Self::SEMANTIC_BASE + n)
    }

    #[inline]
    pub const fn is_keyword(self) -> bool {
        self.0 >= Self::KEYWORD_BASE && self.0 < Self::SEMANTIC_BASE
    }

    #[inline]
    pub const fn is_semantic(self) -> bool {
        self.0 >= Self::SEMANTIC_BASE
    }

    #[inline]
    pub const fn is_block(self) -> bool {
        matches!(self, SyntaxKind::BRACE_BLOCK | SyntaxKind::BRACKET_BLOCK | SyntaxKind::PAREN_BLOCK)
    }

    /// True for kinds a leaf may carry (anything outside the container kinds).
    #[inline]
    pub const fn is_token(self) -> bool {
        !self.is_block() && !self.is_semantic() && self.0 != Self::TOKEN_LIST.0
    }

    /// Block kind for an opening delimiter, if `c` is one of `{`, `[`, `(`.
    pub const fn block_for_opener(c: char) -> Option<SyntaxKind> {
        match c {
            '{' => Some(SyntaxKind::BRACE_BLOCK),
            '[' => Some(SyntaxKind::BRACKET_BLOCK),
            '(' => Some(SyntaxKind::PAREN_BLOCK),
            _ => None,
        }
    }

    /// The closing delimiter matching an opening one.
    pub const fn matching_closer(opener: char) -> Option<char> {
        match opener {
            '{' => Some('}'),
            '[' => Some(']'),
            '(' => Some(')'),
            _ => None,
        }
    }

    pub const fn is_closer_char(c: char) -> bool {
        matches!(c, '}' | ']' | ')')
    }
}

impl fmt::Debug for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            SyntaxKind::TOKEN_LIST => "TokenList",
            SyntaxKind::IDENT => "Ident",
            SyntaxKind::NUMERIC => "Numeric",
            SyntaxKind::STRING => "String",
            SyntaxKind::SYMBOL => "Symbol",
            SyntaxKind::OPERATOR => "Operator",
            SyntaxKind::TAGGED_IDENT => "TaggedIdent",
            SyntaxKind::ERROR => "Error",
            SyntaxKind::BRACE_BLOCK => "BraceBlock",
            SyntaxKind::BRACKET_BLOCK => "BracketBlock",
            SyntaxKind::PAREN_BLOCK => "ParenBlock",
            k if k.is_keyword() => return write!(f, "Keyword({})", k.0 - Self::KEYWORD_BASE),
            k if k.is_semantic() => return write!(f, "Semantic({})", k.0 - Self::SEMANTIC_BASE),
            k => return write!(f, "SyntaxKind({})", k.0),
        };
        f.write_str(name)
    }
}
