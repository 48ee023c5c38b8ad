use std::fmt;
use std::time::Duration;

use time::OffsetDateTime;

use crate::query::field::{Comparable, Field, FromKey, Numeric, Ordered};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::operator::Operator;
use crate::query::value::Value;

fn datetime_wire(value: OffsetDateTime) -> Value {
    Value::DateTime(value.unix_timestamp_nanos())
}

fn duration_wire(value: Duration) -> Value {
    Value::from(value)
}

/// Datetime field. Host values are [`OffsetDateTime`]; they are bound as
/// nanosecond datetimes rather than strings.
pub struct TimeField<M> {
    inner: Comparable<M, OffsetDateTime>,
}

impl<M> Clone for TimeField<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> fmt::Debug for TimeField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimeField").field("key", self.key()).finish()
    }
}

impl<M> TimeField<M> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            inner: Comparable::with_converter(key, datetime_wire),
        }
    }

    /// `<key> < $n`
    pub fn before(&self, value: OffsetDateTime) -> Filter<M> {
        self.less(value)
    }

    /// `<key> > $n`
    pub fn after(&self, value: OffsetDateTime) -> Filter<M> {
        self.greater(value)
    }

    /// `(<key> + $n)` with a duration operand.
    pub fn add(&self, offset: Duration) -> Self {
        Self::new(self.key().calc(Operator::Add, duration_wire(offset)))
    }

    /// `(<key> - $n)` with a duration operand.
    pub fn sub(&self, offset: Duration) -> Self {
        Self::new(self.key().calc(Operator::Sub, duration_wire(offset)))
    }

    fn part(&self, name: &str) -> Numeric<M, i64> {
        Numeric::new(self.key().func(name, Vec::<Value>::new()))
    }

    /// `time::year(<key>)`
    pub fn year(&self) -> Numeric<M, i64> {
        self.part("time::year")
    }

    /// `time::month(<key>)`
    pub fn month(&self) -> Numeric<M, i64> {
        self.part("time::month")
    }

    /// `time::day(<key>)`
    pub fn day(&self) -> Numeric<M, i64> {
        self.part("time::day")
    }

    /// `time::hour(<key>)`
    pub fn hour(&self) -> Numeric<M, i64> {
        self.part("time::hour")
    }

    /// `time::unix(<key>)`
    pub fn unix(&self) -> Numeric<M, i64> {
        self.part("time::unix")
    }
}

impl<M> Field<M> for TimeField<M> {
    type Value = OffsetDateTime;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: OffsetDateTime) -> Value {
        self.inner.wire(value)
    }
}

impl<M> Ordered<M> for TimeField<M> {}

impl<M> FromKey<M> for TimeField<M> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

/// Duration field, bound as nanosecond durations.
pub struct DurationField<M> {
    inner: Comparable<M, Duration>,
}

impl<M> Clone for DurationField<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<M> fmt::Debug for DurationField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DurationField")
            .field("key", self.key())
            .finish()
    }
}

impl<M> DurationField<M> {
    /// Wraps `key`.
    pub fn new(key: Key<M>) -> Self {
        Self {
            inner: Comparable::with_converter(key, duration_wire),
        }
    }

    fn unit(&self, name: &str) -> Numeric<M, i64> {
        Numeric::new(self.key().func(name, Vec::<Value>::new()))
    }

    /// `duration::days(<key>)`
    pub fn days(&self) -> Numeric<M, i64> {
        self.unit("duration::days")
    }

    /// `duration::hours(<key>)`
    pub fn hours(&self) -> Numeric<M, i64> {
        self.unit("duration::hours")
    }

    /// `duration::mins(<key>)`
    pub fn mins(&self) -> Numeric<M, i64> {
        self.unit("duration::mins")
    }

    /// `duration::secs(<key>)`
    pub fn secs(&self) -> Numeric<M, i64> {
        self.unit("duration::secs")
    }

    /// `duration::millis(<key>)`
    pub fn millis(&self) -> Numeric<M, i64> {
        self.unit("duration::millis")
    }
}

impl<M> Field<M> for DurationField<M> {
    type Value = Duration;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: Duration) -> Value {
        self.inner.wire(value)
    }
}

impl<M> Ordered<M> for DurationField<M> {}

impl<M> FromKey<M> for DurationField<M> {
    fn from_key(key: Key<M>) -> Self {
        Self::new(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::context::Context;
    use crate::query::field::Comparison;
    use time::macros::datetime;

    struct Movie;

    #[test]
    fn datetimes_bind_as_nanos() {
        let released = TimeField::<Movie>::new(Key::root().field("released"));
        let at = datetime!(1999-03-31 00:00 UTC);
        let mut ctx = Context::new();
        assert_eq!(released.after(at).render(&mut ctx), "released > $0");
        assert_eq!(
            ctx.vars().get("0"),
            Some(&Value::DateTime(at.unix_timestamp_nanos()))
        );
    }

    #[test]
    fn datetime_arithmetic_and_parts() {
        let released = TimeField::<Movie>::new(Key::root().field("released"));
        let mut ctx = Context::new();
        let shifted = released.add(Duration::from_secs(60));
        assert_eq!(
            shifted.year().equal(2000i64).render(&mut ctx),
            "time::year((released + $0)) = $1"
        );
        assert_eq!(ctx.vars().get("0"), Some(&Value::Duration(60_000_000_000)));
    }

    #[test]
    fn durations_compare_and_extract() {
        let runtime = DurationField::<Movie>::new(Key::root().field("runtime"));
        let mut ctx = Context::new();
        assert_eq!(
            runtime.greater(Duration::from_secs(7200)).render(&mut ctx),
            "runtime > $0"
        );
        assert_eq!(
            runtime.mins().less(90i64).render(&mut ctx),
            "duration::mins(runtime) < $1"
        );
        assert_eq!(runtime.zero(true).render(&mut ctx), "runtime = $2");
        assert_eq!(ctx.vars().get("2"), Some(&Value::Duration(0)));
    }
}
