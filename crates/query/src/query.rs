use std::{
    fmt, ops,
    sync::{Arc, OnceLock},
};

use syntax::{GreenNode, RedNode, SyntaxKind};

/// Which end of a container a boundary query selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundarySide {
    Start,
    End,
}

/// Text constraint applied by `with_text` and friends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextFilter {
    Exact(Box<str>),
    Starts(Box<str>),
    Ends(Box<str>),
    Contains(Box<str>),
}

impl TextFilter {
    pub(crate) fn accepts(&self, text: &str) -> bool {
        match self {
            TextFilter::Exact(t) => text == &**t,
            TextFilter::Starts(t) => text.starts_with(&**t),
            TextFilter::Ends(t) => text.ends_with(&**t),
            TextFilter::Contains(t) => text.contains(&**t),
        }
    }
}

/// Schema-resolvable keyword lookup, cached one-shot.
pub(crate) struct KeywordLookup {
    pub(crate) text: Box<str>,
    pub(crate) cell: OnceLock<Option<SyntaxKind>>,
}

/// Schema-resolvable keyword category, cached one-shot.
pub(crate) struct CategoryLookup {
    pub(crate) name: Box<str>,
    pub(crate) cell: OnceLock<Vec<SyntaxKind>>,
}

type NodePredicate = dyn Fn(&RedNode) -> bool + Send + Sync;

pub(crate) enum QueryKind {
    Kind(SyntaxKind),
    Block(Option<SyntaxKind>),
    Leaf,
    Any,
    Newline { negated: bool },
    AnyKeyword,
    Keyword(KeywordLookup),
    KeywordCategory(CategoryLookup),
    Union(Query, Query),
    Intersection(Query, Query),
    AnyOf(Vec<Query>),
    NoneOf(Vec<Query>),
    Sequence(Vec<Query>),
    Optional(Query),
    Repeat { inner: Query, min: usize, max: usize },
    RepeatUntil { inner: Query, terminator: Query },
    Lookahead { inner: Query, cond: Query, positive: bool },
    Not(Query),
    Between { start: Query, end: Query, inclusive: bool },
    Sibling { offset: isize, inner: Option<Query> },
    Parent(Option<Query>),
    Ancestor(Query),
    Bof,
    Eof,
    Exact(GreenNode),
    Boundary { container: Query, side: BoundarySide },
    InnerContent(Query),
    // selection modifiers
    First(Query),
    Last(Query),
    Nth(Query, usize),
    Skip(Query, usize),
    Take(Query, usize),
    Filter { inner: Query, pred: Arc<NodePredicate> },
    WithText { inner: Query, filter: TextFilter },
}

/// An immutable, composable query. Cloning shares the underlying matcher, so
/// cached schema resolutions are shared between clones.
#[derive(Clone)]
pub struct Query {
    pub(crate) kind: Arc<QueryKind>,
}

impl Query {
    fn wrap(kind: QueryKind) -> Query {
        Query { kind: Arc::new(kind) }
    }

    pub(crate) fn kind_ref(&self) -> &QueryKind {
        &self.kind
    }

    pub fn kind(kind: SyntaxKind) -> Query {
        Query::wrap(QueryKind::Kind(kind))
    }

    pub fn block(kind: Option<SyntaxKind>) -> Query {
        Query::wrap(QueryKind::Block(kind))
    }

    pub fn leaf() -> Query {
        Query::wrap(QueryKind::Leaf)
    }

    pub fn any() -> Query {
        Query::wrap(QueryKind::Any)
    }

    pub fn newline() -> Query {
        Query::wrap(QueryKind::Newline { negated: false })
    }

    pub fn any_keyword() -> Query {
        Query::wrap(QueryKind::AnyKeyword)
    }

    pub fn keyword(text: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::Keyword(KeywordLookup { text: text.into(), cell: OnceLock::new() }))
    }

    pub fn keyword_category(name: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::KeywordCategory(CategoryLookup { name: name.into(), cell: OnceLock::new() }))
    }

    pub fn seq(parts: Vec<Query>) -> Query {
        Query::wrap(QueryKind::Sequence(parts))
    }

    pub fn any_of(alternatives: Vec<Query>) -> Query {
        Query::wrap(QueryKind::AnyOf(alternatives))
    }

    pub fn none_of(queries: Vec<Query>) -> Query {
        Query::wrap(QueryKind::NoneOf(queries))
    }

    pub fn optional(inner: Query) -> Query {
        Query::wrap(QueryKind::Optional(inner))
    }

    pub fn repeat(inner: Query, min: usize, max: usize) -> Query {
        Query::wrap(QueryKind::Repeat { inner, min, max })
    }

    pub fn repeat_until(inner: Query, terminator: Query) -> Query {
        Query::wrap(QueryKind::RepeatUntil { inner, terminator })
    }

    pub fn lookahead(inner: Query, cond: Query, positive: bool) -> Query {
        Query::wrap(QueryKind::Lookahead { inner, cond, positive })
    }

    pub fn not(inner: Query) -> Query {
        Query::wrap(QueryKind::Not(inner))
    }

    pub fn between(start: Query, end: Query, inclusive: bool) -> Query {
        Query::wrap(QueryKind::Between { start, end, inclusive })
    }

    pub fn sibling(offset: isize, inner: Option<Query>) -> Query {
        Query::wrap(QueryKind::Sibling { offset, inner })
    }

    pub fn parent(inner: Option<Query>) -> Query {
        Query::wrap(QueryKind::Parent(inner))
    }

    pub fn ancestor(inner: Query) -> Query {
        Query::wrap(QueryKind::Ancestor(inner))
    }

    pub fn bof() -> Query {
        Query::wrap(QueryKind::Bof)
    }

    pub fn eof() -> Query {
        Query::wrap(QueryKind::Eof)
    }

    pub fn exact(node: GreenNode) -> Query {
        Query::wrap(QueryKind::Exact(node))
    }

    pub fn boundary(container: Query, side: BoundarySide) -> Query {
        Query::wrap(QueryKind::Boundary { container, side })
    }

    pub fn inner_content(container: Query) -> Query {
        Query::wrap(QueryKind::InnerContent(container))
    }

    /// Flips a newline query; any other query gains a zero-width negative
    /// assertion.
    pub fn negate(self) -> Query {
        match self.kind_ref() {
            QueryKind::Newline { negated } => Query::wrap(QueryKind::Newline { negated: !negated }),
            _ => Query::not(self),
        }
    }

    // --- selection modifiers -------------------------------------------------

    pub fn first(self) -> Query {
        Query::wrap(QueryKind::First(self))
    }

    pub fn last(self) -> Query {
        Query::wrap(QueryKind::Last(self))
    }

    pub fn nth(self, index: usize) -> Query {
        Query::wrap(QueryKind::Nth(self, index))
    }

    pub fn skip(self, count: usize) -> Query {
        Query::wrap(QueryKind::Skip(self, count))
    }

    pub fn take(self, count: usize) -> Query {
        Query::wrap(QueryKind::Take(self, count))
    }

    pub fn filter(self, pred: impl Fn(&RedNode) -> bool + Send + Sync + 'static) -> Query {
        Query::wrap(QueryKind::Filter { inner: self, pred: Arc::new(pred) })
    }

    pub fn with_text(self, text: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::WithText { inner: self, filter: TextFilter::Exact(text.into()) })
    }

    pub fn with_text_starting(self, prefix: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::WithText { inner: self, filter: TextFilter::Starts(prefix.into()) })
    }

    pub fn with_text_ending(self, suffix: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::WithText { inner: self, filter: TextFilter::Ends(suffix.into()) })
    }

    pub fn with_text_containing(self, needle: impl Into<Box<str>>) -> Query {
        Query::wrap(QueryKind::WithText { inner: self, filter: TextFilter::Contains(needle.into()) })
    }
}

/// `a | b`: union; first successful branch wins for sequence matching,
/// selection merges both in document order with dedup.
impl ops::BitOr for Query {
    type Output = Query;

    fn bitor(self, rhs: Query) -> Query {
        Query::wrap(QueryKind::Union(self, rhs))
    }
}

/// `a & b`: both must match with identical consumed counts.
impl ops::BitAnd for Query {
    type Output = Query;

    fn bitand(self, rhs: Query) -> Query {
        Query::wrap(QueryKind::Intersection(self, rhs))
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind_ref() {
            QueryKind::Kind(k) => write!(f, "Kind({k:?})"),
            QueryKind::Block(k) => write!(f, "Block({k:?})"),
            QueryKind::Leaf => write!(f, "Leaf"),
            QueryKind::Any => write!(f, "Any"),
            QueryKind::Newline { negated } => write!(f, "Newline(negated: {negated})"),
            QueryKind::AnyKeyword => write!(f, "AnyKeyword"),
            QueryKind::Keyword(lookup) => write!(f, "Keyword({:?})", lookup.text),
            QueryKind::KeywordCategory(lookup) => write!(f, "KeywordCategory({:?})", lookup.name),
            QueryKind::Union(a, b) => write!(f, "Union({a:?}, {b:?})"),
            QueryKind::Intersection(a, b) => write!(f, "Intersection({a:?}, {b:?})"),
            QueryKind::AnyOf(qs) => write!(f, "AnyOf({qs:?})"),
            QueryKind::NoneOf(qs) => write!(f, "NoneOf({qs:?})"),
            QueryKind::Sequence(qs) => write!(f, "Sequence({qs:?})"),
            QueryKind::Optional(q) => write!(f, "Optional({q:?})"),
            QueryKind::Repeat { inner, min, max } => write!(f, "Repeat({inner:?}, {min}..={max})"),
            QueryKind::RepeatUntil { inner, terminator } => write!(f, "RepeatUntil({inner:?}, {terminator:?})"),
            QueryKind::Lookahead { inner, cond, positive } => {
                write!(f, "Lookahead({inner:?}, {cond:?}, positive: {positive})")
            }
            QueryKind::Not(q) => write!(f, "Not({q:?})"),
            QueryKind::Between { start, end, inclusive } => {
                write!(f, "Between({start:?}, {end:?}, inclusive: {inclusive})")
            }
            QueryKind::Sibling { offset, inner } => write!(f, "Sibling({offset}, {inner:?})"),
            QueryKind::Parent(q) => write!(f, "Parent({q:?})"),
            QueryKind::Ancestor(q) => write!(f, "Ancestor({q:?})"),
            QueryKind::Bof => write!(f, "Bof"),
            QueryKind::Eof => write!(f, "Eof"),
            QueryKind::Exact(node) => write!(f, "Exact({node:?})"),
            QueryKind::Boundary { container, side } => write!(f, "Boundary({container:?}, {side:?})"),
            QueryKind::InnerContent(q) => write!(f, "InnerContent({q:?})"),
            QueryKind::First(q) => write!(f, "First({q:?})"),
            QueryKind::Last(q) => write!(f, "Last({q:?})"),
            QueryKind::Nth(q, n) => write!(f, "Nth({q:?}, {n})"),
            QueryKind::Skip(q, n) => write!(f, "Skip({q:?}, {n})"),
            QueryKind::Take(q, n) => write!(f, "Take({q:?}, {n})"),
            QueryKind::Filter { inner, .. } => write!(f, "Filter({inner:?})"),
            QueryKind::WithText { inner, filter } => write!(f, "WithText({inner:?}, {filter:?})"),
        }
    }
}
