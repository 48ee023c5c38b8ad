//! Boolean predicates over keys and their AND/OR combinators.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::query::context::Context;
use crate::query::key::{strip_separator, Key, KeyPath};
use crate::query::operator::{Logic, Operator};
use crate::query::value::Value;

/// Untyped predicate tree.
#[derive(Clone, Debug, PartialEq)]
pub enum Predicate {
    /// `<key> <op> $n`
    Compare {
        /// Left-hand path.
        key: KeyPath,
        /// Comparison operator.
        op: Operator,
        /// Right-hand value, bound through the context.
        operand: Value,
    },
    /// `<key> <op> <other>`: field-to-field, nothing is bound.
    CompareKey {
        /// Left-hand path.
        key: KeyPath,
        /// Comparison operator.
        op: Operator,
        /// Right-hand path.
        other: KeyPath,
    },
    /// Absent-or-null check.
    ///
    /// The store distinguishes a missing field (`NONE`) from an explicit
    /// `NULL`; hosts collapse both into one optional, so `is = true` renders
    /// the disjunction of both checks and `is = false` their negated
    /// conjunction.
    Nil {
        /// Checked path.
        key: KeyPath,
        /// `true` for "is nil", `false` for "is not nil".
        is: bool,
    },
    /// The key itself evaluates to a boolean.
    Truthy {
        /// Path used as the predicate.
        key: KeyPath,
    },
    /// `!(<inner>)`
    Not(Arc<Predicate>),
    /// `(<a> AND <b> ...)` / `(<a> OR <b> ...)`
    Group {
        /// Combination mode.
        logic: Logic,
        /// Member predicates.
        members: Vec<Arc<Predicate>>,
    },
}

impl Predicate {
    /// Renders the predicate, binding operands through `ctx`.
    pub fn render(&self, ctx: &mut Context) -> String {
        match self {
            Predicate::Compare { key, op, operand } => {
                let key = key.render_stripped(ctx);
                let var = ctx.as_var(operand.clone());
                format!("{key} {op} {var}")
            }
            Predicate::CompareKey { key, op, other } => {
                let key = key.render_stripped(ctx);
                let other = other.render_stripped(ctx);
                format!("{key} {op} {other}")
            }
            Predicate::Nil { key, is } => {
                let key = key.render_stripped(ctx);
                if *is {
                    format!("({key} == NONE OR {key} == NULL)")
                } else {
                    format!("({key} != NONE AND {key} != NULL)")
                }
            }
            Predicate::Truthy { key } => key.render_stripped(ctx),
            Predicate::Not(inner) => {
                let inner = strip_separator(inner.render(ctx));
                if inner.is_empty() {
                    inner
                } else {
                    format!("!({inner})")
                }
            }
            Predicate::Group { logic, members } => {
                render_group(*logic, members.iter().map(Arc::as_ref), ctx)
            }
        }
    }
}

/// Renders `members` joined by `logic`.
///
/// Members that render to nothing are skipped; if none remain the result is
/// empty, meaning "no constraint". Otherwise the joined members are wrapped in
/// exactly one pair of parentheses.
pub fn render_group<'a, I>(logic: Logic, members: I, ctx: &mut Context) -> String
where
    I: IntoIterator<Item = &'a Predicate>,
{
    let parts: Vec<String> = members
        .into_iter()
        .map(|member| strip_separator(member.render(ctx)))
        .filter(|rendered| !rendered.is_empty())
        .collect();
    join_group(logic, &parts)
}

pub(crate) fn join_group(logic: Logic, parts: &[String]) -> String {
    if parts.is_empty() {
        return String::new();
    }
    let joiner = format!(" {} ", Operator::from(logic));
    format!("({})", parts.join(&joiner))
}

/// Predicate over records of type `M`.
pub struct Filter<M> {
    predicate: Arc<Predicate>,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Filter<M> {
    fn clone(&self) -> Self {
        Self {
            predicate: Arc::clone(&self.predicate),
            _model: PhantomData,
        }
    }
}

impl<M> fmt::Debug for Filter<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Filter").field(&self.predicate).finish()
    }
}

impl<M> Filter<M> {
    /// Wraps an untyped predicate.
    pub fn from_predicate(predicate: Predicate) -> Self {
        Self {
            predicate: Arc::new(predicate),
            _model: PhantomData,
        }
    }

    /// `<key> <op> $n`
    pub fn compare(key: &Key<M>, op: Operator, operand: impl Into<Value>) -> Self {
        Self::from_predicate(Predicate::Compare {
            key: key.path().clone(),
            op,
            operand: operand.into(),
        })
    }

    /// `<key> <op> <other>` without binding.
    pub fn compare_key<N>(key: &Key<M>, op: Operator, other: &Key<N>) -> Self {
        Self::from_predicate(Predicate::CompareKey {
            key: key.path().clone(),
            op,
            other: other.path().clone(),
        })
    }

    /// Absent-or-null check on `key`.
    pub fn nil(key: &Key<M>, is: bool) -> Self {
        Self::from_predicate(Predicate::Nil {
            key: key.path().clone(),
            is,
        })
    }

    /// Uses a boolean-valued key directly as the predicate.
    pub fn key(key: &Key<M>) -> Self {
        Self::from_predicate(Predicate::Truthy {
            key: key.path().clone(),
        })
    }

    /// Negates the predicate.
    pub fn not(&self) -> Self {
        Self::from_predicate(Predicate::Not(Arc::clone(&self.predicate)))
    }

    /// `(self AND other)`
    pub fn and(&self, other: &Filter<M>) -> Self {
        all([self.clone(), other.clone()])
    }

    /// `(self OR other)`
    pub fn or(&self, other: &Filter<M>) -> Self {
        any([self.clone(), other.clone()])
    }

    /// Underlying predicate.
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    pub(crate) fn into_predicate(self) -> Arc<Predicate> {
        self.predicate
    }

    /// Renders the predicate with any leading separator removed.
    pub fn render(&self, ctx: &mut Context) -> String {
        strip_separator(self.predicate.render(ctx))
    }
}

impl<M> From<Key<M>> for Filter<M> {
    fn from(key: Key<M>) -> Self {
        Filter::key(&key)
    }
}

/// Filter that holds when every member holds.
pub fn all<M, I>(filters: I) -> Filter<M>
where
    I: IntoIterator<Item = Filter<M>>,
{
    group(Logic::And, filters)
}

/// Filter that holds when at least one member holds.
pub fn any<M, I>(filters: I) -> Filter<M>
where
    I: IntoIterator<Item = Filter<M>>,
{
    group(Logic::Or, filters)
}

fn group<M, I>(logic: Logic, filters: I) -> Filter<M>
where
    I: IntoIterator<Item = Filter<M>>,
{
    Filter::from_predicate(Predicate::Group {
        logic,
        members: filters.into_iter().map(Filter::into_predicate).collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Movie;

    fn key(name: &str) -> Key<Movie> {
        Key::root().field(name)
    }

    #[test]
    fn comparison_binds_operand() {
        let filter = Filter::compare(&key("title"), Operator::Equal, "Matrix");
        let mut ctx = Context::new();
        assert_eq!(filter.render(&mut ctx), "title = $0");
        assert_eq!(ctx.vars().get("0"), Some(&Value::from("Matrix")));
    }

    #[test]
    fn combinators_wrap_once() {
        let filter = all([
            Filter::compare(&key("title"), Operator::Equal, "Matrix"),
            Filter::compare(&key("year"), Operator::GreaterThan, 1990i64),
        ]);
        let mut ctx = Context::new();
        assert_eq!(filter.render(&mut ctx), "(title = $0 AND year > $1)");
        assert_eq!(ctx.vars().len(), 2);

        let either = any([
            Filter::compare(&key("a"), Operator::Equal, 1i64),
            Filter::compare(&key("b"), Operator::Equal, 2i64),
        ]);
        let mut ctx = Context::new();
        assert_eq!(either.render(&mut ctx), "(a = $0 OR b = $1)");
    }

    #[test]
    fn empty_groups_render_nothing() {
        let mut ctx = Context::new();
        assert_eq!(all(Vec::<Filter<Movie>>::new()).render(&mut ctx), "");
        let nested = any([all(Vec::<Filter<Movie>>::new()), all(Vec::new())]);
        assert_eq!(nested.render(&mut ctx), "");
        assert_eq!(nested.not().render(&mut ctx), "");
        let mixed = all([
            all(Vec::new()),
            Filter::compare(&key("a"), Operator::Equal, 1i64),
        ]);
        assert_eq!(mixed.render(&mut ctx), "(a = $0)");
    }

    #[test]
    fn nil_renders_both_absent_encodings() {
        let mut ctx = Context::new();
        assert_eq!(
            Filter::nil(&key("rating"), true).render(&mut ctx),
            "(rating == NONE OR rating == NULL)"
        );
        assert_eq!(
            Filter::nil(&key("rating"), false).render(&mut ctx),
            "(rating != NONE AND rating != NULL)"
        );
        assert!(ctx.vars().is_empty());
    }

    #[test]
    fn key_comparison_does_not_bind() {
        let filter = Filter::compare_key(&key("updated"), Operator::GreaterThan, &key("created"));
        let mut ctx = Context::new();
        assert_eq!(filter.render(&mut ctx), "updated > created");
        assert!(ctx.vars().is_empty());
    }

    #[test]
    fn key_filter_strips_separator() {
        let mut ctx = Context::new();
        assert_eq!(Filter::from(key("active")).render(&mut ctx), "active");
        let negated = Filter::from(key("active")).not();
        assert_eq!(negated.render(&mut ctx), "!(active)");
    }
}
