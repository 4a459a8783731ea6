use std::fmt;

/// What a piece of trivia is. Trivia is never a tree node; it rides on the
/// leaf that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    SingleLineComment,
    MultiLineComment,
}

/// A single run of whitespace, one newline, or one comment, with its literal
/// text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    kind: TriviaKind,
    text: Box<str>,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<Box<str>>) -> Trivia {
        Trivia { kind, text: text.into() }
    }

    pub fn whitespace(text: impl Into<Box<str>>) -> Trivia {
        Trivia::new(TriviaKind::Whitespace, text)
    }

    pub fn newline(text: impl Into<Box<str>>) -> Trivia {
        Trivia::new(TriviaKind::Newline, text)
    }

    pub fn line_comment(text: impl Into<Box<str>>) -> Trivia {
        Trivia::new(TriviaKind::SingleLineComment, text)
    }

    pub fn block_comment(text: impl Into<Box<str>>) -> Trivia {
        Trivia::new(TriviaKind::MultiLineComment, text)
    }

    #[inline]
    pub fn kind(&self) -> TriviaKind {
        self.kind
    }

    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.text.len() as u32
    }

    #[inline]
    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TriviaKind::SingleLineComment | TriviaKind::MultiLineComment)
    }

    /// True if this piece ends or spans a line: a newline piece, or a
    /// multi-line comment whose text contains a line break.
    #[inline]
    pub fn has_line_break(&self) -> bool {
        self.kind == TriviaKind::Newline || self.text.contains('\n') || self.text.contains('\r')
    }
}

impl fmt::Debug for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({:?})", self.kind, self.text)
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}
