use syntax::TokenizerOptions;

/// Primitive token categories, prior to any green-level interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Maximal identifier run; never starts with a digit.
    Ident,
    /// Maximal decimal digit run.
    Digits,
    /// Maximal run of non-newline whitespace.
    Whitespace,
    /// A single `\n`, `\r`, or `\r\n`.
    Newline,
    /// One configured symbol character.
    Symbol,
    /// `'` or `"`.
    Quote,
    /// Any character no other rule claims.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'source> {
    pub kind: TokenKind,
    pub text: &'source str,
}

pub struct Lexer<'source> {
    pub(super) source: &'source str,
    pub(super) position: usize,
    options: &'source TokenizerOptions,
}

impl<'source> Lexer<'source> {
    pub fn new(source: &'source str, options: &'source TokenizerOptions) -> Self {
        Self { source, position: 0, options }
    }

    pub fn next_token(&mut self) -> Option<Token<'source>> {
        let c = self.peek()?;
        let token = match c {
            '\n' => {
                self.bump();
                Token { kind: TokenKind::Newline, text: "\n" }
            }
            '\r' => {
                let start = self.position;
                self.bump();
                if self.peek() == Some('\n') {
                    self.bump();
                }
                Token { kind: TokenKind::Newline, text: self.slice_from(start) }
            }
            '\'' | '"' => {
                let start = self.position;
                self.bump();
                Token { kind: TokenKind::Quote, text: self.slice_from(start) }
            }
            c if c.is_ascii_digit() => Token { kind: TokenKind::Digits, text: self.bump_while(|c| c.is_ascii_digit()) },
            c if is_ident_start(c) => {
                Token { kind: TokenKind::Ident, text: self.bump_while(is_ident_continue) }
            }
            c if c.is_whitespace() => Token {
                kind: TokenKind::Whitespace,
                text: self.bump_while(|c| c.is_whitespace() && c != '\n' && c != '\r'),
            },
            c => {
                let start = self.position;
                self.bump();
                let kind = if self.options.is_symbol(c) { TokenKind::Symbol } else { TokenKind::Other };
                Token { kind, text: self.slice_from(start) }
            }
        };
        Some(token)
    }
}

#[inline]
fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

#[inline]
fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Lexes the whole buffer. The concatenation of the returned token texts is
/// the input, byte for byte.
pub fn tokenize<'source>(source: &'source str, options: &'source TokenizerOptions) -> Vec<Token<'source>> {
    let mut lexer = Lexer::new(source, options);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next_token() {
        tokens.push(token);
    }
    debug_assert!(lexer.is_eof());
    tokens
}
