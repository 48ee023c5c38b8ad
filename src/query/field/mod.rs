//! Typed field capabilities.
//!
//! Generated accessor code wraps each modeled field's [`Key`] in one of the
//! field kinds below. Which operations a kind offers is decided by the
//! capability traits it implements:
//!
//! * [`Comparison`] (every [`Field`]): equality, set membership, zero checks.
//! * [`Ordered`]: the four ordering operators and sort constructors.
//! * [`Nillable`]: absent-or-null checks for optional fields.
//!
//! Each kind carries a converter from its exposed host type to the wire
//! [`Value`], so wrapper types (datetimes, durations, record ids) are bound in
//! their store representation without the operator algebra knowing about it.

use std::fmt;
use std::ops::Deref;

use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::sort::Sort;
use crate::query::value::Value;

mod geo;
mod numeric;
mod record;
mod slice;
mod string;
mod temporal;

pub use geo::GeoField;
pub use numeric::{BoolField, Numeric};
pub use record::IdField;
pub use slice::SliceField;
pub use string::StringField;
pub use temporal::{DurationField, TimeField};

/// Host-to-wire conversion applied before binding.
pub type Converter<T> = fn(T) -> Value;

/// A typed view over a key.
pub trait Field<M> {
    /// Host type accepted by the field's operators.
    type Value;

    /// Path of the field.
    fn key(&self) -> &Key<M>;

    /// Converts a host value into its wire form.
    fn wire(&self, value: Self::Value) -> Value;
}

/// Field kinds constructible from a bare key, used for derived sub-expressions
/// such as slice elements and function results.
pub trait FromKey<M>: Field<M> + Sized {
    /// Wraps `key` in this field kind.
    fn from_key(key: Key<M>) -> Self;
}

/// Equality and membership, offered by every field kind.
pub trait Comparison<M>: Field<M> {
    /// `<key> = $n`
    fn equal(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(self.key(), Operator::Equal, self.wire(value.into()))
    }

    /// `<key> != $n`
    fn not_equal(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(self.key(), Operator::NotEqual, self.wire(value.into()))
    }

    /// `<key> IN $n`
    fn in_<I>(&self, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<Self::Value>,
    {
        let values = values
            .into_iter()
            .map(|v| self.wire(v.into()))
            .collect();
        Filter::compare(self.key(), Operator::Inside, Value::Array(values))
    }

    /// `<key> NOT IN $n`
    fn not_in<I>(&self, values: I) -> Filter<M>
    where
        I: IntoIterator,
        I::Item: Into<Self::Value>,
    {
        let values = values
            .into_iter()
            .map(|v| self.wire(v.into()))
            .collect();
        Filter::compare(self.key(), Operator::NotInside, Value::Array(values))
    }

    /// Compares against the host type's default value.
    fn zero(&self, is: bool) -> Filter<M>
    where
        Self::Value: Default,
    {
        let op = if is {
            Operator::Equal
        } else {
            Operator::NotEqual
        };
        Filter::compare(self.key(), op, self.wire(Self::Value::default()))
    }

    /// `<key> = <other>`
    fn equal_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::Equal, other.key())
    }

    /// `<key> != <other>`
    fn not_equal_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::NotEqual, other.key())
    }
}

impl<M, F: Field<M>> Comparison<M> for F {}

/// Ordering operators for kinds with a meaningful order.
pub trait Ordered<M>: Field<M> {
    /// `<key> < $n`
    fn less(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(self.key(), Operator::LessThan, self.wire(value.into()))
    }

    /// `<key> <= $n`
    fn less_equal(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(self.key(), Operator::LessThanOrEqual, self.wire(value.into()))
    }

    /// `<key> > $n`
    fn greater(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(self.key(), Operator::GreaterThan, self.wire(value.into()))
    }

    /// `<key> >= $n`
    fn greater_equal(&self, value: impl Into<Self::Value>) -> Filter<M> {
        Filter::compare(
            self.key(),
            Operator::GreaterThanOrEqual,
            self.wire(value.into()),
        )
    }

    /// `<key> < <other>`
    fn less_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::LessThan, other.key())
    }

    /// `<key> <= <other>`
    fn less_equal_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::LessThanOrEqual, other.key())
    }

    /// `<key> > <other>`
    fn greater_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::GreaterThan, other.key())
    }

    /// `<key> >= <other>`
    fn greater_equal_<F>(&self, other: &F) -> Filter<M>
    where
        F: Field<M, Value = Self::Value>,
    {
        Filter::compare_key(self.key(), Operator::GreaterThanOrEqual, other.key())
    }

    /// Ascending sort on this field.
    fn asc(&self) -> Sort<M> {
        Sort::asc(self.key())
    }

    /// Descending sort on this field.
    fn desc(&self) -> Sort<M> {
        Sort::desc(self.key())
    }
}

/// Plain field with a converter and no ordering.
pub struct Base<M, T> {
    key: Key<M>,
    convert: Converter<T>,
}

impl<M, T> Clone for Base<M, T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            convert: self.convert,
        }
    }
}

impl<M, T> fmt::Debug for Base<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Base").field("key", &self.key).finish()
    }
}

impl<M, T: Into<Value>> Base<M, T> {
    /// Field whose host type converts into [`Value`] directly.
    pub fn new(key: Key<M>) -> Self {
        Self::with_converter(key, <T as Into<Value>>::into)
    }
}

impl<M, T> Base<M, T> {
    /// Field with an explicit host-to-wire converter.
    pub fn with_converter(key: Key<M>, convert: Converter<T>) -> Self {
        Self { key, convert }
    }
}

impl<M, T> Field<M> for Base<M, T> {
    type Value = T;

    fn key(&self) -> &Key<M> {
        &self.key
    }

    fn wire(&self, value: T) -> Value {
        (self.convert)(value)
    }
}

impl<M, T: Into<Value>> FromKey<M> for Base<M, T> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

/// [`Base`] extended with ordering.
pub struct Comparable<M, T> {
    base: Base<M, T>,
}

impl<M, T> Clone for Comparable<M, T> {
    fn clone(&self) -> Self {
        Self {
            base: self.base.clone(),
        }
    }
}

impl<M, T> fmt::Debug for Comparable<M, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Comparable")
            .field("key", self.base.key())
            .finish()
    }
}

impl<M, T: Into<Value>> Comparable<M, T> {
    /// Ordered field whose host type converts into [`Value`] directly.
    pub fn new(key: Key<M>) -> Self {
        Self {
            base: Base::new(key),
        }
    }
}

impl<M, T> Comparable<M, T> {
    /// Ordered field with an explicit converter.
    pub fn with_converter(key: Key<M>, convert: Converter<T>) -> Self {
        Self {
            base: Base::with_converter(key, convert),
        }
    }
}

impl<M, T> Field<M> for Comparable<M, T> {
    type Value = T;

    fn key(&self) -> &Key<M> {
        self.base.key()
    }

    fn wire(&self, value: T) -> Value {
        self.base.wire(value)
    }
}

impl<M, T> Ordered<M> for Comparable<M, T> {}

impl<M, T: Into<Value>> FromKey<M> for Comparable<M, T> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

/// Optional field: adds absent-or-null checks to the wrapped kind.
///
/// Dereferences to the wrapped field so its operators stay available.
#[derive(Clone, Debug)]
pub struct Nillable<F> {
    inner: F,
}

impl<F> Nillable<F> {
    /// Wraps `inner`.
    pub fn new(inner: F) -> Self {
        Self { inner }
    }

    /// The wrapped field.
    pub fn value(&self) -> &F {
        &self.inner
    }

    /// `true`: field is absent or null; `false`: field is present and non-null.
    pub fn nil<M>(&self, is: bool) -> Filter<M>
    where
        F: Field<M>,
    {
        Filter::nil(self.inner.key(), is)
    }
}

impl<F> Deref for Nillable<F> {
    type Target = F;

    fn deref(&self) -> &F {
        &self.inner
    }
}

impl<M, F: Field<M>> Field<M> for Nillable<F> {
    type Value = Option<F::Value>;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: Option<F::Value>) -> Value {
        match value {
            Some(v) => self.inner.wire(v),
            None => Value::Null,
        }
    }
}

impl<M, F: FromKey<M>> FromKey<M> for Nillable<F> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(F::from_key(key))
    }
}
