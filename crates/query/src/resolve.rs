//! One-shot schema resolution for keyword-dependent queries.

use syntax::KeywordTable;

use crate::query::{Query, QueryKind};

impl Query {
    /// Resolves keyword text and category lookups against `keywords`.
    ///
    /// Results are cached in the query itself (shared by all clones), so the
    /// first resolution wins and later calls are no-ops. Unresolved queries
    /// simply never match.
    pub fn resolve(&self, keywords: &KeywordTable) {
        match self.kind_ref() {
            QueryKind::Keyword(lookup) => {
                lookup.cell.get_or_init(|| keywords.lookup(&lookup.text));
            }
            QueryKind::KeywordCategory(lookup) => {
                lookup.cell.get_or_init(|| keywords.category(&lookup.name).to_vec());
            }
            QueryKind::Union(a, b) | QueryKind::Intersection(a, b) => {
                a.resolve(keywords);
                b.resolve(keywords);
            }
            QueryKind::AnyOf(queries) | QueryKind::NoneOf(queries) | QueryKind::Sequence(queries) => {
                for query in queries {
                    query.resolve(keywords);
                }
            }
            QueryKind::Optional(inner)
            | QueryKind::Repeat { inner, .. }
            | QueryKind::Not(inner)
            | QueryKind::Ancestor(inner)
            | QueryKind::InnerContent(inner)
            | QueryKind::First(inner)
            | QueryKind::Last(inner)
            | QueryKind::Nth(inner, _)
            | QueryKind::Skip(inner, _)
            | QueryKind::Take(inner, _)
            | QueryKind::Filter { inner, .. }
            | QueryKind::WithText { inner, .. } => inner.resolve(keywords),
            QueryKind::RepeatUntil { inner, terminator } => {
                inner.resolve(keywords);
                terminator.resolve(keywords);
            }
            QueryKind::Lookahead { inner, cond, .. } => {
                inner.resolve(keywords);
                cond.resolve(keywords);
            }
            QueryKind::Between { start, end, .. } => {
                start.resolve(keywords);
                end.resolve(keywords);
            }
            QueryKind::Sibling { inner, .. } | QueryKind::Parent(inner) => {
                if let Some(inner) = inner {
                    inner.resolve(keywords);
                }
            }
            QueryKind::Boundary { container, .. } => container.resolve(keywords),
            QueryKind::Kind(_)
            | QueryKind::Block(_)
            | QueryKind::Leaf
            | QueryKind::Any
            | QueryKind::Newline { .. }
            | QueryKind::AnyKeyword
            | QueryKind::Bof
            | QueryKind::Eof
            | QueryKind::Exact(_) => {}
        }
    }
}
