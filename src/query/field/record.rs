use std::fmt;

use crate::query::field::{Base, Comparison, Field};
use crate::query::filter::Filter;
use crate::query::key::Key;
use crate::query::value::{RecordId, Value};

/// Record identifier field. Knows the table it points into so callers can
/// compare against bare keys.
pub struct IdField<M> {
    inner: Base<M, RecordId>,
    table: String,
}

impl<M> Clone for IdField<M> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            table: self.table.clone(),
        }
    }
}

impl<M> fmt::Debug for IdField<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdField")
            .field("key", self.key())
            .field("table", &self.table)
            .finish()
    }
}

impl<M> IdField<M> {
    /// Wraps `key`, pointing into `table`.
    pub fn new(key: Key<M>, table: impl Into<String>) -> Self {
        Self {
            inner: Base::new(key),
            table: table.into(),
        }
    }

    /// Table the identifiers point into.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Identifier for `key` within this field's table.
    pub fn record(&self, key: impl Into<String>) -> RecordId {
        RecordId::new(self.table.clone(), key)
    }

    /// `<key> = $n` for `table:key`.
    pub fn equal_key(&self, key: impl Into<String>) -> Filter<M> {
        self.equal(self.record(key))
    }

    /// `<key> IN $n` for a list of bare keys.
    pub fn in_keys<I, S>(&self, keys: I) -> Filter<M>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let records: Vec<RecordId> = keys.into_iter().map(|k| self.record(k)).collect();
        self.in_(records)
    }
}

impl<M> Field<M> for IdField<M> {
    type Value = RecordId;

    fn key(&self) -> &Key<M> {
        self.inner.key()
    }

    fn wire(&self, value: RecordId) -> Value {
        self.inner.wire(value)
    }
}
