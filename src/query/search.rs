//! Full-text search predicates.
//!
//! Every clause carries a predicate ref (`@<ref>@`) so scores, highlights and
//! offsets can be looked up per clause. Refs are either explicit or assigned
//! from a counter threaded through all clauses of one statement: each clause
//! takes the counter's value when it has no explicit ref, and the counter then
//! continues from the clause's ref plus one. The counter saturates at
//! `u32::MAX`, so clauses following an explicit `u32::MAX` ref share it.

use std::fmt;
use std::marker::PhantomData;

use crate::query::context::Context;
use crate::query::filter::join_group;
use crate::query::key::{Key, KeyPath};
use crate::query::operator::{Logic, Operator};
use crate::query::value::quote_literal;

/// One full-text predicate before rendering.
pub struct Search<M> {
    key: KeyPath,
    terms: String,
    reference: Option<u32>,
    bool_or: bool,
    highlight: Option<(String, String)>,
    offsets: bool,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Search<M> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            terms: self.terms.clone(),
            reference: self.reference,
            bool_or: self.bool_or,
            highlight: self.highlight.clone(),
            offsets: self.offsets,
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Search<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Search")
            .field("key", &self.key)
            .field("terms", &self.terms)
            .field("reference", &self.reference)
            .field("bool_or", &self.bool_or)
            .finish()
    }
}

/// Rendered search predicate plus the projections it requests.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchClause {
    /// `<path> @<ref>@ '<terms>'`
    pub expr: String,
    /// Predicate ref used by the clause.
    pub reference: u32,
    /// Highlight prefix and suffix, if requested.
    pub highlight: Option<(String, String)>,
    /// Whether match offsets were requested.
    pub offsets: bool,
}

impl<M> Search<M> {
    /// Searches `terms` in the field at `key`.
    pub fn new(key: &Key<M>, terms: impl Into<String>) -> Self {
        Self {
            key: key.path().clone(),
            terms: terms.into(),
            reference: None,
            bool_or: false,
            highlight: None,
            offsets: false,
            _model: PhantomData,
        }
    }

    /// Uses an explicit predicate ref.
    pub fn reference(mut self, reference: u32) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Matches documents containing any term instead of all terms.
    pub fn or(mut self) -> Self {
        self.bool_or = true;
        self
    }

    /// Requests highlighted matches wrapped in `prefix`/`suffix`.
    pub fn highlight(mut self, prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        self.highlight = Some((prefix.into(), suffix.into()));
        self
    }

    /// Requests match offsets.
    pub fn offsets(mut self) -> Self {
        self.offsets = true;
        self
    }

    /// Renders the clause, taking its ref from `auto_ref` when none was set.
    pub fn build(&self, ctx: &mut Context, auto_ref: &mut u32) -> SearchClause {
        let reference = self.reference.unwrap_or(*auto_ref);
        *auto_ref = reference.saturating_add(1);
        let path = self.key.render_stripped(ctx);
        let mode = if self.bool_or { ",OR" } else { "" };
        let (open, close) = Operator::Matches.symbol().split_at(1);
        SearchClause {
            expr: format!(
                "{path} {open}{reference}{mode}{close} {}",
                quote_literal(&self.terms)
            ),
            reference,
            highlight: self.highlight.clone(),
            offsets: self.offsets,
        }
    }
}

/// Search clauses that must all match.
pub struct SearchAll<M> {
    searches: Vec<Search<M>>,
}

impl<M> Clone for SearchAll<M> {
    fn clone(&self) -> Self {
        Self {
            searches: self.searches.clone(),
        }
    }
}

impl<M> fmt::Debug for SearchAll<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(&self.searches).finish()
    }
}

impl<M> SearchAll<M> {
    /// Groups `searches` conjunctively.
    pub fn new<I>(searches: I) -> Self
    where
        I: IntoIterator<Item = Search<M>>,
    {
        Self {
            searches: searches.into_iter().collect(),
        }
    }

    /// Renders every member, threading `auto_ref`.
    pub fn build_clauses(&self, ctx: &mut Context, auto_ref: &mut u32) -> Vec<SearchClause> {
        self.searches
            .iter()
            .map(|search| search.build(ctx, auto_ref))
            .collect()
    }
}

/// Searches attached to a query: standalone clauses are OR-ed together,
/// grouped clauses are AND-ed within their group.
pub enum SearchGroup<M> {
    /// Independently specified search.
    One(Search<M>),
    /// Explicitly grouped searches.
    All(SearchAll<M>),
}

impl<M> Clone for SearchGroup<M> {
    fn clone(&self) -> Self {
        match self {
            SearchGroup::One(search) => SearchGroup::One(search.clone()),
            SearchGroup::All(group) => SearchGroup::All(group.clone()),
        }
    }
}

impl<M> fmt::Debug for SearchGroup<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchGroup::One(search) => f.debug_tuple("One").field(search).finish(),
            SearchGroup::All(group) => f.debug_tuple("All").field(group).finish(),
        }
    }
}

/// Folds `groups` into one boolean expression and returns it with every
/// clause rendered along the way. Refs are sequential across all groups.
pub fn build_search_or<M>(groups: &[SearchGroup<M>], ctx: &mut Context) -> (String, Vec<SearchClause>) {
    let mut auto_ref = 0;
    let mut clauses = Vec::new();
    let mut parts = Vec::with_capacity(groups.len());
    for group in groups {
        match group {
            SearchGroup::One(search) => {
                let clause = search.build(ctx, &mut auto_ref);
                parts.push(clause.expr.clone());
                clauses.push(clause);
            }
            SearchGroup::All(all) => {
                let built = all.build_clauses(ctx, &mut auto_ref);
                let exprs: Vec<String> = built.iter().map(|c| c.expr.clone()).collect();
                let joined = match exprs.len() {
                    0 => continue,
                    1 => exprs.into_iter().next().unwrap_or_default(),
                    _ => join_group(Logic::And, &exprs),
                };
                parts.push(joined);
                clauses.extend(built);
            }
        }
    }
    let expr = match parts.len() {
        0 => String::new(),
        1 => parts.pop().unwrap_or_default(),
        _ => join_group(Logic::Or, &parts),
    };
    (expr, clauses)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Movie;

    fn search(field: &str, terms: &str) -> Search<Movie> {
        Search::new(&Key::root().field(field), terms)
    }

    #[test]
    fn clause_escapes_terms_and_marks_or_mode() {
        let mut ctx = Context::new();
        let mut auto_ref = 0;
        let clause = search("title", r"it's a \test").or().build(&mut ctx, &mut auto_ref);
        assert_eq!(clause.expr, r"title @0,OR@ 'it\'s a \\test'");
        assert_eq!(auto_ref, 1);
        assert!(ctx.vars().is_empty());
    }

    #[test]
    fn refs_continue_after_explicit_ref() {
        let groups = vec![
            SearchGroup::One(search("title", "a")),
            SearchGroup::One(search("plot", "b").reference(5)),
            SearchGroup::One(search("tagline", "c")),
        ];
        let mut ctx = Context::new();
        let (expr, clauses) = build_search_or(&groups, &mut ctx);
        let refs: Vec<u32> = clauses.iter().map(|c| c.reference).collect();
        assert_eq!(refs, vec![0, 5, 6]);
        assert_eq!(
            expr,
            "(title @0@ 'a' OR plot @5@ 'b' OR tagline @6@ 'c')"
        );
    }

    #[test]
    fn auto_ref_saturates_after_max_ref() {
        let groups = vec![
            SearchGroup::One(search("title", "a").reference(u32::MAX)),
            SearchGroup::One(search("plot", "b")),
        ];
        let mut ctx = Context::new();
        let (_, clauses) = build_search_or(&groups, &mut ctx);
        let refs: Vec<u32> = clauses.iter().map(|c| c.reference).collect();
        assert_eq!(refs, vec![u32::MAX, u32::MAX]);
    }

    #[test]
    fn grouped_searches_are_conjunctive() {
        let groups = vec![
            SearchGroup::All(SearchAll::new([search("title", "a"), search("plot", "b")])),
            SearchGroup::One(search("tagline", "c")),
        ];
        let mut ctx = Context::new();
        let (expr, _) = build_search_or(&groups, &mut ctx);
        assert_eq!(
            expr,
            "((title @0@ 'a' AND plot @1@ 'b') OR tagline @2@ 'c')"
        );
    }

    #[test]
    fn single_search_is_not_wrapped() {
        let groups = vec![SearchGroup::One(search("title", "a").highlight("<b>", "</b>"))];
        let mut ctx = Context::new();
        let (expr, clauses) = build_search_or(&groups, &mut ctx);
        assert_eq!(expr, "title @0@ 'a'");
        assert_eq!(
            clauses[0].highlight,
            Some(("<b>".to_owned(), "</b>".to_owned()))
        );
    }
}
