use std::fmt;

use crate::query::field::{Comparable, Field, FromKey, Numeric, Ordered};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::search::Search;
use crate::query::value::Value;

/// Textual field: comparison, containment, pattern matching and full-text
/// search.
pub struct StringField<M> {
    inner: Comparable<M, String>,
}

impl<M> Clone for StringField<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> fmt::Debug for StringField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StringField").field("key", self.key()).finish()
    }
}

impl<M> StringField<M> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            inner: Comparable::new(key),
        }
    }

    fn op(&self, op: Operator, value: impl Into<String>) -> Filter<M> {
        Filter::compare(self.key(), op, self.wire(value.into()))
    }

    fn call(&self, name: &str, args: Vec<Value>) -> Key<M> {
        self.key().func(name, args)
    }

    /// `<key> == $n`
    pub fn exact_equal(&self, value: impl Into<String>) -> Filter<M> {
        self.op(Operator::ExactEqual, value)
    }

    /// `<key> ~ $n`
    pub fn fuzzy_match(&self, value: impl Into<String>) -> Filter<M> {
        self.op(Operator::FuzzyMatch, value)
    }

    /// `<key> !~ $n`
    pub fn fuzzy_not_match(&self, value: impl Into<String>) -> Filter<M> {
        self.op(Operator::FuzzyNotMatch, value)
    }

    /// `<key> CONTAINS $n`
    pub fn contains(&self, value: impl Into<String>) -> Filter<M> {
        self.op(Operator::Contains, value)
    }

    /// `<key> CONTAINSNOT $n`
    pub fn contains_not(&self, value: impl Into<String>) -> Filter<M> {
        self.op(Operator::ContainsNot, value)
    }

    /// `string::starts_with(<key>, $n)`
    pub fn starts_with(&self, prefix: impl Into<String>) -> Filter<M> {
        let key = self.call("string::starts_with", vec![Value::String(prefix.into())]);
        Filter::key(&key)
    }

    /// `string::ends_with(<key>, $n)`
    pub fn ends_with(&self, suffix: impl Into<String>) -> Filter<M> {
        let key = self.call("string::ends_with", vec![Value::String(suffix.into())]);
        Filter::key(&key)
    }

    /// `string::is::email(<key>)`
    pub fn is_email(&self) -> Filter<M> {
        Filter::key(&self.call("string::is::email", Vec::new()))
    }

    /// `string::lowercase(<key>)`
    pub fn lowercase(&self) -> Self {
        Self::new(self.call("string::lowercase", Vec::new()))
    }

    /// `string::uppercase(<key>)`
    pub fn uppercase(&self) -> Self {
        Self::new(self.call("string::uppercase", Vec::new()))
    }

    /// `string::trim(<key>)`
    pub fn trim(&self) -> Self {
        Self::new(self.call("string::trim", Vec::new()))
    }

    /// `string::reverse(<key>)`
    pub fn reverse(&self) -> Self {
        Self::new(self.call("string::reverse", Vec::new()))
    }

    /// `string::concat(<key>, $n)`
    pub fn concat(&self, suffix: impl Into<String>) -> Self {
        Self::new(self.call("string::concat", vec![Value::String(suffix.into())]))
    }

    /// `string::len(<key>)`
    pub fn len(&self) -> Numeric<M, i64> {
        Numeric::new(self.call("string::len", Vec::new()))
    }

    /// Full-text search over this field.
    pub fn matches(&self, terms: impl Into<String>) -> Search<M> {
        Search::new(self.key(), terms)
    }
}

impl<M> Field<M> for StringField<M> {
    type Value = String;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: String) -> Value {
        self.inner.wire(value)
    }
}

impl<M> Ordered<M> for StringField<M> {}

impl<M> FromKey<M> for StringField<M> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}
