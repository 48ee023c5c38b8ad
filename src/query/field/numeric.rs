use std::fmt;

use crate::query::field::{Comparable, Field, FromKey, Ordered};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::value::Value;

/// Numeric field: ordering plus arithmetic producing derived numerics.
pub struct Numeric<M, T> {
    inner: Comparable<M, T>,
}

impl<M, T> Clone for Numeric<M, T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M, T> fmt::Debug for Numeric<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Numeric").field("key", self.key()).finish()
    }
}

impl<M, T: Into<Value>> Numeric<M, T> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            inner: Comparable::new(key),
        }
    }

    fn derive(&self, key: Key<M>) -> Self {
        Self::new(key)
    }

    fn calc(&self, op: Operator, value: T) -> Self {
        self.derive(self.key().calc(op, self.wire(value)))
    }

    /// `(<key> + $n)`
    pub fn add(&self, value: impl Into<T>) -> Self {
        self.calc(Operator::Add, value.into())
    }

    /// `(<key> - $n)`
    pub fn sub(&self, value: impl Into<T>) -> Self {
        self.calc(Operator::Sub, value.into())
    }

    /// `(<key> * $n)`
    pub fn mul(&self, value: impl Into<T>) -> Self {
        self.calc(Operator::Mul, value.into())
    }

    /// `(<key> / $n)`
    pub fn div(&self, value: impl Into<T>) -> Self {
        self.calc(Operator::Div, value.into())
    }

    /// `(<key> ** $n)`
    pub fn raise(&self, value: impl Into<T>) -> Self {
        self.calc(Operator::Raise, value.into())
    }

    /// `math::abs(<key>)`
    pub fn abs(&self) -> Self {
        self.derive(self.key().func("math::abs", Vec::<Value>::new()))
    }

    /// `math::ceil(<key>)`
    pub fn ceil(&self) -> Self {
        self.derive(self.key().func("math::ceil", Vec::<Value>::new()))
    }

    /// `math::floor(<key>)`
    pub fn floor(&self) -> Self {
        self.derive(self.key().func("math::floor", Vec::<Value>::new()))
    }

    /// `math::round(<key>)`
    pub fn round(&self) -> Self {
        self.derive(self.key().func("math::round", Vec::<Value>::new()))
    }

    /// `-<key>`
    pub fn negate(&self) -> Self {
        self.derive(self.key().prefix(Operator::Negate))
    }
}

impl<M, T> Field<M> for Numeric<M, T> {
    type Value = T;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: T) -> Value {
        self.inner.wire(value)
    }
}

impl<M, T> Ordered<M> for Numeric<M, T> {}

impl<M, T: Into<Value>> FromKey<M> for Numeric<M, T> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

/// Boolean field.
pub struct BoolField<M> {
    key: Key<M>,
}

impl<M> Clone for BoolField<M> {
    fn clone(&self) -> Self {
        Self::new(self.key.clone())
    }
}

impl<M> fmt::Debug for BoolField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoolField").field("key", &self.key).finish()
    }
}

impl<M> BoolField<M> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self { key }
    }

    /// `<key> = true`
    pub fn is_true(&self) -> Filter<M> {
        Filter::compare(&self.key, Operator::Equal, true)
    }

    /// `<key> = false`
    pub fn is_false(&self) -> Filter<M> {
        Filter::compare(&self.key, Operator::Equal, false)
    }

    /// `!<key>` as a new boolean expression.
    pub fn invert(&self) -> Self {
        Self::new(self.key.prefix(Operator::Not))
    }

    /// Uses the field itself as the predicate.
    pub fn truthy(&self) -> Filter<M> {
        Filter::key(&self.key)
    }
}

impl<M> Field<M> for BoolField<M> {
    type Value = bool;

    fn key(&self) -> &Key<M> {
        &self.key
    }

    fn wire(&self, value: bool) -> Value {
        Value::Bool(value)
    }
}

impl<M> FromKey<M> for BoolField<M> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}
