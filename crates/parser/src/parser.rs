use lexer::{Token, TokenKind, tokenize};
use syntax::{CommentStyle, GreenNode, KeywordTable, SyntaxKind, TokenizerOptions, Trivia};

use crate::{reader::TokenReader, trie::OperatorTrie};

/// Parses `source` into a green tree rooted at a `TokenList`.
///
/// Never fails: malformed input is recorded in the tree as `Error` leaves or
/// unclosed blocks, and the result always renders back to `source`
/// byte-for-byte.
pub fn parse(source: &str, options: &TokenizerOptions, keywords: Option<&KeywordTable>) -> GreenNode {
    let tokens = tokenize(source, options);
    let mut parser = TreeParser {
        reader: TokenReader::new(tokens),
        trie: OperatorTrie::new(options.operators()),
        options,
        keywords,
    };
    parser.parse_root()
}

/// How a leading-trivia collection ended.
enum LeadingEnd {
    /// A real token is next.
    Token,
    Eof,
    /// A block comment ran to end-of-input; the text is everything from its
    /// start marker on.
    UnterminatedComment(String),
}

/// How trailing trivia after a node was attributed.
enum Trailing {
    /// The node keeps these pieces.
    Owned(Vec<Trivia>),
    /// The block closer was reached on the same line; it takes the pieces as
    /// its leading trivia instead.
    ToCloser(Vec<Trivia>),
}

struct TreeParser<'source> {
    reader: TokenReader<'source>,
    trie: OperatorTrie,
    options: &'source TokenizerOptions,
    keywords: Option<&'source KeywordTable>,
}

impl<'source> TreeParser<'source> {
    fn parse_root(&mut self) -> GreenNode {
        let mut children: Vec<GreenNode> = Vec::new();
        loop {
            let (leading, end) = self.collect_leading();
            match end {
                LeadingEnd::Eof => {
                    if !leading.is_empty() {
                        match children.pop() {
                            Some(last) => children.push(append_trailing(last, leading)),
                            None => {
                                for piece in leading {
                                    children.push(standalone_trivia_leaf(piece));
                                }
                            }
                        }
                    }
                    break;
                }
                LeadingEnd::UnterminatedComment(text) => {
                    children.push(GreenNode::leaf(SyntaxKind::ERROR, text, leading, vec![]));
                }
                LeadingEnd::Token => {
                    let node = self.parse_node(leading);
                    let node = match self.collect_trailing(None) {
                        Trailing::Owned(trivia) => append_trailing(node, trivia),
                        Trailing::ToCloser(_) => unreachable!("no closer expected at top level"),
                    };
                    children.push(node);
                }
            }
        }
        GreenNode::list(children)
    }

    /// Parses one node starting at the current (non-trivia) token.
    fn parse_node(&mut self, leading: Vec<Trivia>) -> GreenNode {
        let token = self.reader.peek().expect("caller observed a token");

        if let Some(c) = single_char(token)
            && SyntaxKind::block_for_opener(c).is_some()
        {
            return self.parse_block(leading);
        }
        if token.kind == TokenKind::Quote {
            return self.parse_string(leading);
        }
        if token.kind == TokenKind::Digits {
            return self.parse_numeric(leading);
        }
        if is_char(token, '.') && self.reader.peek_at(1).is_some_and(|t| t.kind == TokenKind::Digits) {
            return self.parse_numeric(leading);
        }
        // A comment start surviving to node position was not absorbed as
        // trivia; its first character stands alone as a symbol.
        if self.comment_start().is_some() {
            let token = self.reader.bump().expect("peeked above");
            return GreenNode::leaf(SyntaxKind::SYMBOL, token.text, leading, vec![]);
        }
        if let Some(c) = single_char(token)
            && self.options.is_tag_prefix(c)
            && self.reader.peek_at(1).is_some_and(|t| t.kind == TokenKind::Ident)
        {
            let text = self.reader.bump_joined(2);
            return GreenNode::leaf(SyntaxKind::TAGGED_IDENT, text, leading, vec![]);
        }
        if let Some(text) = self.try_operator() {
            return GreenNode::leaf(SyntaxKind::OPERATOR, text, leading, vec![]);
        }
        if token.kind == TokenKind::Ident {
            let token = self.reader.bump().expect("peeked above");
            let kind = self
                .keywords
                .and_then(|table| table.lookup(token.text))
                .unwrap_or(SyntaxKind::IDENT);
            return GreenNode::leaf(kind, token.text, leading, vec![]);
        }
        if let Some(c) = single_char(token)
            && SyntaxKind::is_closer_char(c)
        {
            let token = self.reader.bump().expect("peeked above");
            return GreenNode::leaf(SyntaxKind::ERROR, token.text, leading, vec![]);
        }

        let token = self.reader.bump().expect("peeked above");
        GreenNode::leaf(SyntaxKind::SYMBOL, token.text, leading, vec![])
    }

    fn parse_block(&mut self, leading: Vec<Trivia>) -> GreenNode {
        let open_token = self.reader.bump().expect("caller matched an opener");
        let open_char = open_token.text.chars().next().expect("opener is one char");
        let close_char = SyntaxKind::matching_closer(open_char).expect("caller matched an opener");

        let opener_trailing = match self.collect_trailing(None) {
            Trailing::Owned(trivia) => trivia,
            Trailing::ToCloser(_) => unreachable!("trailing after opener is collected plainly"),
        };
        let opener = GreenNode::leaf(SyntaxKind::SYMBOL, open_token.text, leading, opener_trailing);

        let mut children: Vec<GreenNode> = Vec::new();
        // Same-line trivia handed over when a child's trailing run hit the
        // closer before any newline.
        let mut closer_pending: Vec<Trivia> = Vec::new();
        loop {
            let (lead, end) = self.collect_leading();
            match end {
                LeadingEnd::Eof => {
                    // Unclosed block: synthesise a zero-width closer that
                    // still owns whatever trivia was pending.
                    let mut closer_leading = closer_pending;
                    closer_leading.extend(lead);
                    let closer = GreenNode::leaf(SyntaxKind::SYMBOL, "", closer_leading, vec![]);
                    return GreenNode::block(opener, children, closer);
                }
                LeadingEnd::UnterminatedComment(text) => {
                    let mut error_leading = std::mem::take(&mut closer_pending);
                    error_leading.extend(lead);
                    children.push(GreenNode::leaf(SyntaxKind::ERROR, text, error_leading, vec![]));
                }
                LeadingEnd::Token => {
                    let token = self.reader.peek().expect("leading collection saw a token");
                    if is_char(token, close_char) {
                        self.reader.bump();
                        let mut closer_leading = closer_pending;
                        closer_leading.extend(lead);
                        let closer = GreenNode::leaf(SyntaxKind::SYMBOL, token.text, closer_leading, vec![]);
                        return GreenNode::block(opener, children, closer);
                    }
                    let node = self.parse_node(lead);
                    match self.collect_trailing(Some(close_char)) {
                        Trailing::Owned(trivia) => children.push(append_trailing(node, trivia)),
                        Trailing::ToCloser(trivia) => {
                            children.push(node);
                            closer_pending = trivia;
                        }
                    }
                }
            }
        }
    }

    /// Consumes a quoted string, honouring backslash escapes. Runs to the
    /// matching unescaped quote, or becomes an `Error` leaf at end-of-input.
    fn parse_string(&mut self, leading: Vec<Trivia>) -> GreenNode {
        let open = self.reader.bump().expect("caller matched a quote");
        let mut text = String::from(open.text);
        let mut escaped = false;
        loop {
            let Some(token) = self.reader.peek() else {
                return GreenNode::leaf(SyntaxKind::ERROR, text, leading, vec![]);
            };
            if token.kind == TokenKind::Quote && token.text == open.text && !escaped {
                self.reader.bump();
                text.push_str(token.text);
                return GreenNode::leaf(SyntaxKind::STRING, text, leading, vec![]);
            }
            self.reader.bump();
            for c in token.text.chars() {
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                }
            }
            text.push_str(token.text);
        }
    }

    /// `digits`, `digits.digits`, or `.digits`.
    fn parse_numeric(&mut self, leading: Vec<Trivia>) -> GreenNode {
        let mut text = String::new();
        let first = self.reader.bump().expect("caller matched digits or a dot");
        text.push_str(first.text);
        if first.kind == TokenKind::Digits {
            let dot = self.reader.peek().is_some_and(|t| is_char(t, '.'));
            let digits_after = self.reader.peek_at(1).is_some_and(|t| t.kind == TokenKind::Digits);
            if dot && digits_after {
                text.push_str(&self.reader.bump_joined(2));
            }
        } else {
            // leading dot; caller guaranteed digits follow
            let digits = self.reader.bump().expect("caller checked the digits");
            text.push_str(digits.text);
        }
        GreenNode::leaf(SyntaxKind::NUMERIC, text, leading, vec![])
    }

    /// Greedy multi-character operator match over the upcoming run of
    /// operator-capable symbol characters.
    fn try_operator(&mut self) -> Option<String> {
        if self.trie.is_empty() {
            return None;
        }
        let mut run = Vec::new();
        let mut offset = 0;
        while let Some(token) = self.reader.peek_at(offset) {
            if !matches!(token.kind, TokenKind::Symbol | TokenKind::Other) {
                break;
            }
            let Some(c) = single_char(token) else { break };
            if !self.options.is_operator_char(c) {
                break;
            }
            run.push(c);
            offset += 1;
        }
        let length = self.trie.longest_match(run.into_iter())?;
        Some(self.reader.bump_joined(length))
    }

    /// Collects whitespace, newlines and whole comments before a token.
    fn collect_leading(&mut self) -> (Vec<Trivia>, LeadingEnd) {
        let mut trivia = Vec::new();
        loop {
            let Some(token) = self.reader.peek() else {
                return (trivia, LeadingEnd::Eof);
            };
            match token.kind {
                TokenKind::Whitespace => {
                    self.reader.bump();
                    trivia.push(Trivia::whitespace(token.text));
                }
                TokenKind::Newline => {
                    self.reader.bump();
                    trivia.push(Trivia::newline(token.text));
                }
                _ => {
                    let Some(style) = self.comment_start() else {
                        return (trivia, LeadingEnd::Token);
                    };
                    match self.comment_token_count(style) {
                        Some(count) => trivia.push(self.consume_comment(style, count)),
                        None => {
                            let mut text = String::new();
                            while let Some(token) = self.reader.bump() {
                                text.push_str(token.text);
                            }
                            return (trivia, LeadingEnd::UnterminatedComment(text));
                        }
                    }
                }
            }
        }
    }

    /// Collects same-line trivia after a node: whitespace and comments up to
    /// and including the terminating newline. With `closer` set, reaching
    /// that delimiter before a newline reassigns the run to it.
    fn collect_trailing(&mut self, closer: Option<char>) -> Trailing {
        let mut trivia = Vec::new();
        loop {
            let Some(token) = self.reader.peek() else {
                return Trailing::Owned(trivia);
            };
            if let Some(close_char) = closer
                && is_char(token, close_char)
            {
                return Trailing::ToCloser(trivia);
            }
            match token.kind {
                TokenKind::Whitespace => {
                    self.reader.bump();
                    trivia.push(Trivia::whitespace(token.text));
                }
                TokenKind::Newline => {
                    self.reader.bump();
                    trivia.push(Trivia::newline(token.text));
                    return Trailing::Owned(trivia);
                }
                _ => {
                    let Some(style) = self.comment_start() else {
                        return Trailing::Owned(trivia);
                    };
                    match self.comment_token_count(style) {
                        Some(count) => trivia.push(self.consume_comment(style, count)),
                        // Leave the unterminated comment untouched for the
                        // next leading collection, which surfaces it as an
                        // Error leaf.
                        None => return Trailing::Owned(trivia),
                    }
                }
            }
        }
    }

    /// The first configured comment style whose start marker spells out at
    /// the cursor.
    fn comment_start(&self) -> Option<&'source CommentStyle> {
        let options = self.options;
        options
            .comment_styles()
            .iter()
            .find(|style| self.marker_tokens(style.start(), 0).is_some())
    }

    /// How many tokens the comment at the cursor spans, without consuming
    /// anything. `None` for a block comment whose end marker never appears.
    fn comment_token_count(&self, style: &CommentStyle) -> Option<usize> {
        let start = self.marker_tokens(style.start(), 0).expect("checked by caller");
        match style.terminator() {
            None => {
                let mut count = start;
                while let Some(token) = self.reader.peek_at(count) {
                    if token.kind == TokenKind::Newline {
                        break;
                    }
                    count += 1;
                }
                Some(count)
            }
            Some(end) => {
                let mut offset = start;
                loop {
                    match self.marker_tokens(end, offset) {
                        Some(count) => return Some(offset + count),
                        None if self.reader.peek_at(offset).is_none() => return None,
                        None => offset += 1,
                    }
                }
            }
        }
    }

    fn consume_comment(&mut self, style: &CommentStyle, token_count: usize) -> Trivia {
        let text = self.reader.bump_joined(token_count);
        if style.is_block() {
            Trivia::block_comment(text)
        } else {
            Trivia::line_comment(text)
        }
    }

    /// Number of tokens starting at `offset` whose texts spell `marker`
    /// exactly, honouring token boundaries.
    fn marker_tokens(&self, marker: &str, offset: usize) -> Option<usize> {
        let mut matched = 0;
        let mut count = 0;
        while matched < marker.len() {
            let token = self.reader.peek_at(offset + count)?;
            if !marker[matched..].starts_with(token.text) {
                return None;
            }
            matched += token.text.len();
            count += 1;
        }
        Some(count)
    }
}

fn single_char(token: Token<'_>) -> Option<char> {
    let mut chars = token.text.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn is_char(token: Token<'_>, c: char) -> bool {
    single_char(token) == Some(c) && matches!(token.kind, TokenKind::Symbol | TokenKind::Other)
}

/// Appends trivia after whatever the node's last token already holds.
fn append_trailing(node: GreenNode, mut extra: Vec<Trivia>) -> GreenNode {
    if extra.is_empty() {
        return node;
    }
    let mut combined = node.last_leaf().map(|leaf| leaf.trailing_trivia().to_vec()).unwrap_or_default();
    combined.append(&mut extra);
    node.with_trailing_trivia(combined)
}

/// A zero-width leaf carrying one orphaned trivia piece, for inputs that are
/// trivia from start to end.
fn standalone_trivia_leaf(piece: Trivia) -> GreenNode {
    GreenNode::leaf(SyntaxKind::SYMBOL, "", vec![piece], vec![])
}
