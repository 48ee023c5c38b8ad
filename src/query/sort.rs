//! Ordering expressions.
//!
//! Sort keys are never emitted directly in `ORDER BY`. Each one is projected
//! under a generated alias and the alias is ordered instead: ordering by an
//! indexed field directly can return rows out of order in the target store,
//! while ordering by a projected alias always sorts the final rows.

use std::fmt;
use std::marker::PhantomData;

use crate::query::context::Context;
use crate::query::key::{Key, KeyPath};

/// Untyped ordering term.
#[derive(Clone, Debug, PartialEq)]
pub enum SortSpec {
    /// Order by a path.
    Field {
        /// Sorted path.
        key: KeyPath,
        /// Descending when `true`.
        desc: bool,
        /// Locale-aware string collation.
        collate: bool,
        /// Numeric-aware string ordering.
        numeric: bool,
    },
    /// Order by summed full-text relevance of the given predicate refs.
    Score {
        /// Search predicate refs whose scores are added up.
        refs: Vec<u32>,
        /// Descending when `true` (best matches first).
        desc: bool,
    },
}

impl SortSpec {
    /// Expression projected under `alias`.
    pub fn render_projection(&self, ctx: &mut Context, alias: &str) -> String {
        let expr = match self {
            SortSpec::Field { key, .. } => key.render_stripped(ctx),
            SortSpec::Score { refs, .. } => {
                if refs.is_empty() {
                    "search::score(0)".to_owned()
                } else {
                    refs.iter()
                        .map(|r| format!("search::score({r})"))
                        .collect::<Vec<_>>()
                        .join(" + ")
                }
            }
        };
        format!("{expr} AS {alias}")
    }

    /// `ORDER BY` term referencing `alias`.
    pub fn render_order(&self, alias: &str) -> String {
        let mut out = alias.to_owned();
        let desc = match self {
            SortSpec::Field {
                desc,
                collate,
                numeric,
                ..
            } => {
                if *collate {
                    out.push_str(" COLLATE");
                }
                if *numeric {
                    out.push_str(" NUMERIC");
                }
                *desc
            }
            SortSpec::Score { desc, .. } => *desc,
        };
        out.push_str(if desc { " DESC" } else { " ASC" });
        out
    }
}

/// Ordering term for records of type `M`.
pub struct Sort<M> {
    spec: SortSpec,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Sort<M> {
    fn clone(&self) -> Self {
        Self::from_spec(self.spec.clone())
    }
}

impl<M> fmt::Debug for Sort<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Sort").field(&self.spec).finish()
    }
}

impl<M> Sort<M> {
    fn from_spec(spec: SortSpec) -> Self {
        Self {
            spec,
            _model: PhantomData,
        }
    }

    fn field(key: &Key<M>, desc: bool) -> Self {
        Self::from_spec(SortSpec::Field {
            key: key.path().clone(),
            desc,
            collate: false,
            numeric: false,
        })
    }

    /// Ascending order on `key`.
    pub fn asc(key: &Key<M>) -> Self {
        Self::field(key, false)
    }

    /// Descending order on `key`.
    pub fn desc(key: &Key<M>) -> Self {
        Self::field(key, true)
    }

    /// Relevance order over the given search refs, best matches first.
    pub fn score<I>(refs: I) -> Self
    where
        I: IntoIterator<Item = u32>,
    {
        Self::from_spec(SortSpec::Score {
            refs: refs.into_iter().collect(),
            desc: true,
        })
    }

    /// Switches to ascending order.
    pub fn ascending(mut self) -> Self {
        self.set_desc(false);
        self
    }

    /// Switches to descending order.
    pub fn descending(mut self) -> Self {
        self.set_desc(true);
        self
    }

    fn set_desc(&mut self, value: bool) {
        match &mut self.spec {
            SortSpec::Field { desc, .. } | SortSpec::Score { desc, .. } => *desc = value,
        }
    }

    /// Adds `COLLATE`; no effect on score sorts.
    pub fn collate(mut self) -> Self {
        if let SortSpec::Field { collate, .. } = &mut self.spec {
            *collate = true;
        }
        self
    }

    /// Adds `NUMERIC`; no effect on score sorts.
    pub fn numeric(mut self) -> Self {
        if let SortSpec::Field { numeric, .. } = &mut self.spec {
            *numeric = true;
        }
        self
    }

    /// Untyped term.
    pub fn spec(&self) -> &SortSpec {
        &self.spec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Movie;

    #[test]
    fn field_sort_modifiers_in_grammar_order() {
        let key = Key::<Movie>::root().field("title");
        let sort = Sort::asc(&key).numeric().collate();
        assert_eq!(sort.spec().render_order("__sort_0"), "__sort_0 COLLATE NUMERIC ASC");
        let mut ctx = Context::new();
        assert_eq!(
            sort.spec().render_projection(&mut ctx, "__sort_0"),
            "title AS __sort_0"
        );
        assert_eq!(
            Sort::desc(&key).spec().render_order("a"),
            "a DESC"
        );
    }

    #[test]
    fn score_sort_sums_refs_and_toggles() {
        let sort = Sort::<Movie>::score([0, 1]);
        let mut ctx = Context::new();
        assert_eq!(
            sort.spec().render_projection(&mut ctx, "s"),
            "search::score(0) + search::score(1) AS s"
        );
        assert_eq!(sort.spec().render_order("s"), "s DESC");
        let sort = sort.ascending().collate();
        assert_eq!(sort.spec().render_order("s"), "s ASC");
        assert_eq!(sort.descending().spec().render_order("s"), "s DESC");
    }
}
