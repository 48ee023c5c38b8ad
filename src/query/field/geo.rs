use std::fmt;

use crate::query::field::{Base, Field, FromKey, Numeric};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::value::{Geometry, Value};

/// Geometry field.
pub struct GeoField<M> {
    inner: Base<M, Geometry>,
}

impl<M> Clone for GeoField<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> fmt::Debug for GeoField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoField").field("key", self.key()).finish()
    }
}

impl<M> GeoField<M> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            inner: Base::new(key),
        }
    }

    fn op(&self, op: Operator, area: Geometry) -> Filter<M> {
        Filter::compare(self.key(), op, self.wire(area))
    }

    /// `<key> IN $n`
    pub fn inside(&self, area: Geometry) -> Filter<M> {
        self.op(Operator::Inside, area)
    }

    /// `<key> OUTSIDE $n`
    pub fn outside(&self, area: Geometry) -> Filter<M> {
        self.op(Operator::Outside, area)
    }

    /// `<key> INTERSECTS $n`
    pub fn intersects(&self, area: Geometry) -> Filter<M> {
        self.op(Operator::Intersects, area)
    }

    /// `geo::distance(<key>, $n)` in metres.
    pub fn distance(&self, point: Geometry) -> Numeric<M, f64> {
        Numeric::new(self.key().func("geo::distance", [self.wire(point)]))
    }
}

impl<M> Field<M> for GeoField<M> {
    type Value = Geometry;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: Geometry) -> Value {
        self.inner.wire(value)
    }
}

impl<M> FromKey<M> for GeoField<M> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}
