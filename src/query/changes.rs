//! Change-feed statements.
//!
//! The `SINCE` clause does not accept parameters, so the cursor is written as
//! a literal. This is the only place a caller-supplied value ends up in the
//! statement text; it is either a formatted timestamp or an integer.

use time::OffsetDateTime;
use tracing::debug;

use crate::error::{Error, Result};
use crate::query::builder::LOG_TARGET;
use crate::query::context::{Context, Rendered};
use crate::query::value::datetime_literal;

/// Cursor for a change feed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Since {
    /// Changes after a point in time.
    Timestamp(OffsetDateTime),
    /// Changes after a versionstamp.
    Version(u64),
}

impl Since {
    fn literal(&self) -> String {
        match self {
            Since::Timestamp(at) => datetime_literal(at.unix_timestamp_nanos()),
            Since::Version(version) => version.to_string(),
        }
    }
}

impl From<OffsetDateTime> for Since {
    fn from(at: OffsetDateTime) -> Self {
        Since::Timestamp(at)
    }
}

impl From<u64> for Since {
    fn from(version: u64) -> Self {
        Since::Version(version)
    }
}

/// `SHOW CHANGES FOR TABLE ...` builder.
#[derive(Clone, Debug, PartialEq)]
pub struct ChangesQuery {
    table: String,
    since: Since,
    limit: Option<u64>,
}

impl ChangesQuery {
    /// Changes on `table` from the beginning of the retained history.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            since: Since::Version(0),
            limit: None,
        }
    }

    /// Sets the cursor.
    pub fn since(mut self, since: impl Into<Since>) -> Self {
        self.since = since.into();
        self
    }

    /// Caps the number of change sets returned. Zero clears the limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = (limit > 0).then_some(limit);
        self
    }

    /// Renders the statement. Fails when the table name is empty.
    pub fn build(&self) -> Result<Rendered> {
        if self.table.trim().is_empty() {
            return Err(Error::InvalidArgument(
                "changes table name must not be empty".into(),
            ));
        }
        let mut statement = format!(
            "SHOW CHANGES FOR TABLE {} SINCE {}",
            self.table,
            self.since.literal()
        );
        if let Some(limit) = self.limit {
            statement.push_str(&format!(" LIMIT {limit}"));
        }
        debug!(
            target: LOG_TARGET,
            table = %self.table,
            since = ?self.since,
            "query.changes.render"
        );
        Ok(Context::new().finish(statement))
    }
}
