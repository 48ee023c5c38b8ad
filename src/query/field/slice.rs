//! Array fields.
//!
//! Besides containment predicates, a slice field is a factory for derived
//! sub-expressions: `at`, `first`, `len`, `distinct` and friends wrap the
//! same path in an `array::*` call and hand back a typed field for the
//! result, so further operators chain on naturally.

use std::fmt;
use std::marker::PhantomData;

use crate::query::field::{BoolField, Field, FromKey, Numeric};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::value::Value;

/// Array field whose elements are of field kind `E`.
pub struct SliceField<M, E> {
    key: Key<M>,
    _element: PhantomData<fn() -> E>,
}

impl<M, E> Clone for SliceField<M, E> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            _element: PhantomData,
        }
    }
}

impl<M, E> fmt::Debug for SliceField<M, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SliceField").field("key", &self.key).finish()
    }
}

impl<M, E: FromKey<M>> SliceField<M, E> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            key,
            _element: PhantomData,
        }
    }

    /// Element-kind view used to convert element values.
    fn element(&self) -> E {
        E::from_key(self.key.clone())
    }

    fn element_wire(&self, value: impl Into<E::Value>) -> Value {
        self.element().wire(value.into())
    }

    fn elements_wire<I>(&self, values: I) -> Value
    where
        I: IntoIterator,
        I::Item: Into<E::Value>,
    {
        let element = self.element();
        Value::Array(
            values
                .into_iter()
                .map(|v| element.wire(v.into()))
                .collect(),
        )
    }

    fn one(&self, op: Operator, value: impl Into<E::Value>) -> Filter<M> {
        Filter::compare(&self.key, op, self.element_wire(value))
    }

    fn many<I>(&self, op: Operator, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<E::Value>,
    {
        Filter::compare(&self.key, op, self.elements_wire(values))
    }

    fn call(&self, name: &str, args: Vec<Value>) -> Key<M> {
        self.key.func(name, args)
    }

    /// `<key> CONTAINS $n`
    pub fn contains(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::Contains, value)
    }

    /// `<key> CONTAINSNOT $n`
    pub fn contains_not(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::ContainsNot, value)
    }

    /// `<key> CONTAINSALL $n`
    pub fn contains_all<I>(&self, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<E::Value>,
    {
        self.many(Operator::ContainsAll, values)
    }

    /// `<key> CONTAINSANY $n`
    pub fn contains_any<I>(&self, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<E::Value>,
    {
        self.many(Operator::ContainsAny, values)
    }

    /// `<key> CONTAINSNONE $n`
    pub fn contains_none<I>(&self, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<E::Value>,
    {
        self.many(Operator::ContainsNone, values)
    }

    /// `<key> ?= $n`: some element equals the value.
    pub fn any_equal(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::AnyEqual, value)
    }

    /// `<key> *= $n`: every element equals the value.
    pub fn all_equal(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::AllEqual, value)
    }

    /// `<key> ?~ $n`: some element fuzzy-matches the value.
    pub fn any_fuzzy(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::AnyFuzzyMatch, value)
    }

    /// `<key> *~ $n`: every element fuzzy-matches the value.
    pub fn all_fuzzy(&self, value: impl Into<E::Value>) -> Filter<M> {
        self.one(Operator::AllFuzzyMatch, value)
    }

    /// `<key> = []` or `<key> != []`.
    pub fn empty(&self, is: bool) -> Filter<M> {
        let op = if is {
            Operator::Equal
        } else {
            Operator::NotEqual
        };
        Filter::compare(&self.key, op, Value::Array(Vec::new()))
    }

    /// `array::at(<key>, $n)`
    pub fn at(&self, index: i64) -> E {
        E::from_key(self.call("array::at", vec![Value::Int(index)]))
    }

    /// `array::first(<key>)`
    pub fn first(&self) -> E {
        E::from_key(self.call("array::first", Vec::new()))
    }

    /// `array::last(<key>)`
    pub fn last(&self) -> E {
        E::from_key(self.call("array::last", Vec::new()))
    }

    /// `array::min(<key>)`
    pub fn min(&self) -> E {
        E::from_key(self.call("array::min", Vec::new()))
    }

    /// `array::max(<key>)`
    pub fn max(&self) -> E {
        E::from_key(self.call("array::max", Vec::new()))
    }

    /// `array::len(<key>)`
    pub fn len(&self) -> Numeric<M, i64> {
        Numeric::new(self.call("array::len", Vec::new()))
    }

    /// `array::distinct(<key>)`
    pub fn distinct(&self) -> Self {
        Self::new(self.call("array::distinct", Vec::new()))
    }

    /// `array::reverse(<key>)`
    pub fn reverse(&self) -> Self {
        Self::new(self.call("array::reverse", Vec::new()))
    }

    /// `array::sort::asc(<key>)`
    pub fn sort_asc(&self) -> Self {
        Self::new(self.call("array::sort::asc", Vec::new()))
    }

    /// `array::sort::desc(<key>)`
    pub fn sort_desc(&self) -> Self {
        Self::new(self.call("array::sort::desc", Vec::new()))
    }

    /// `array::slice(<key>, $start, $len)`
    pub fn slice(&self, start: i64, len: i64) -> Self {
        Self::new(self.call(
            "array::slice",
            vec![Value::Int(start), Value::Int(len)],
        ))
    }

    /// `array::find_index(<key>, $n)`: index of the first matching element.
    pub fn find_index(&self, value: impl Into<E::Value>) -> Numeric<M, i64> {
        let arg = self.element_wire(value);
        Numeric::new(self.call("array::find_index", vec![arg]))
    }

    /// `array::filter_index(<key>, $n)`: indices of all matching elements.
    pub fn filter_index(&self, value: impl Into<E::Value>) -> SliceField<M, Numeric<M, i64>> {
        let arg = self.element_wire(value);
        SliceField::new(self.call("array::filter_index", vec![arg]))
    }

    /// `array::matches(<key>, $n)`: per-element equality flags.
    pub fn matches(&self, value: impl Into<E::Value>) -> SliceField<M, BoolField<M>> {
        let arg = self.element_wire(value);
        SliceField::new(self.call("array::matches", vec![arg]))
    }
}

impl<M, E: FromKey<M>> Field<M> for SliceField<M, E> {
    type Value = Vec<E::Value>;

    fn key(&self) -> &Key<M> {
        &self.key
    }

    fn wire(&self, value: Vec<E::Value>) -> Value {
        self.elements_wire(value)
    }
}

impl<M, E: FromKey<M>> FromKey<M> for SliceField<M, E> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::context::Context;
    use crate::query::field::{Comparison, Ordered, StringField};

    struct Movie;

    fn tags() -> SliceField<Movie, StringField<Movie>> {
        SliceField::new(Key::root().field("tags"))
    }

    #[test]
    fn containment_family() {
        let mut ctx = Context::new();
        assert_eq!(tags().contains("noir").render(&mut ctx), "tags CONTAINS $0");
        assert_eq!(
            tags().contains_any(["a", "b"]).render(&mut ctx),
            "tags CONTAINSANY $1"
        );
        assert_eq!(
            tags().contains_none(["c"]).render(&mut ctx),
            "tags CONTAINSNONE $2"
        );
        assert_eq!(tags().any_equal("x").render(&mut ctx), "tags ?= $3");
        assert_eq!(tags().empty(true).render(&mut ctx), "tags = $4");
        assert_eq!(ctx.vars().get("1"), Some(&Value::array(["a", "b"])));
        assert_eq!(ctx.vars().get("4"), Some(&Value::Array(Vec::new())));
    }

    #[test]
    fn derived_elements_are_typed() {
        let mut ctx = Context::new();
        assert_eq!(
            tags().at(2).lowercase().equal("noir").render(&mut ctx),
            "string::lowercase(array::at(tags, $0)) = $1"
        );
        assert_eq!(
            tags().distinct().len().greater(3i64).render(&mut ctx),
            "array::len(array::distinct(tags)) > $2"
        );
        assert_eq!(
            tags().slice(1, 2).first().equal("a").render(&mut ctx),
            "array::first(array::slice(tags, $3, $4)) = $5"
        );
    }

    #[test]
    fn index_helpers() {
        let mut ctx = Context::new();
        assert_eq!(
            tags().find_index("noir").greater_equal(0i64).render(&mut ctx),
            "array::find_index(tags, $0) >= $1"
        );
        assert_eq!(
            tags().filter_index("noir").len().equal(2i64).render(&mut ctx),
            "array::len(array::filter_index(tags, $2)) = $3"
        );
        assert_eq!(
            tags().matches("noir").any_equal(true).render(&mut ctx),
            "array::matches(tags, $4) ?= $5"
        );
    }

    #[test]
    fn whole_slice_equality_converts_each_element() {
        let mut ctx = Context::new();
        let filter = tags().equal(vec!["a".to_owned(), "b".to_owned()]);
        assert_eq!(filter.render(&mut ctx), "tags = $0");
        assert_eq!(ctx.vars().get("0"), Some(&Value::array(["a", "b"])));
    }
}
