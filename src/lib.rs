//! Typed builders that compile selections over a graph-oriented record store
//! into parameterized statements.
//!
//! ```
//! use querysmith::query::field::{Comparison, Ordered, StringField, Numeric};
//! use querysmith::query::{Key, Query};
//!
//! struct Movie;
//!
//! let title = StringField::<Movie>::new(Key::root().field("title"));
//! let year = Numeric::<Movie, i64>::new(Key::root().field("year"));
//! let rendered = Query::new("movie")
//!     .filter(title.equal("Matrix"))
//!     .filter(year.greater(1990i64))
//!     .limit(10)
//!     .build();
//! assert_eq!(
//!     rendered.statement,
//!     "SELECT * FROM movie WHERE (title = $0 AND year > $1) LIMIT 10"
//! );
//! ```

#![warn(missing_docs)]

/// Render defaults loaded from TOML.
pub mod config;
/// Crate-wide error type.
pub mod error;
pub mod query;

pub use config::CompilerConfig;
pub use error::{Error, Result};
pub use query::{Filter, Key, Query, Rendered};
