#![forbid(unsafe_code)]

//! Expression compiler for parameterized graph-store selections.
//!
//! Keys describe paths, filters and searches describe predicates over them,
//! sorts describe ordering, and [`Query`] assembles everything into one
//! statement whose literal values are carried separately as bound variables.

/// Fluent statement builder and render modes.
///
/// Assembles clauses in the fixed order the statement grammar requires.
pub mod builder;

/// Change-feed statements.
pub mod changes;

/// Binding context, variable map and rendered output.
pub mod context;

/// Typed field kinds and their operator capabilities.
pub mod field;

/// Predicate trees and AND/OR combinators.
pub mod filter;

/// Path expressions, graph traversal and computed keys.
pub mod key;

/// Operator symbol table.
pub mod operator;

/// Full-text search clauses and predicate refs.
pub mod search;

/// Ordering terms.
pub mod sort;

/// Wire values and literal rendering.
pub mod value;

pub use builder::{Query, SelectMode};
pub use changes::{ChangesQuery, Since};
pub use context::{Context, Rendered, Vars};
pub use filter::{all, any, Filter, Predicate};
pub use key::{Direction, Key, KeyPath};
pub use operator::Operator;
pub use search::{Search, SearchAll};
pub use sort::Sort;
pub use value::{Geometry, RecordId, Value};
