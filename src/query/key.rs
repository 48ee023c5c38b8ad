//! Path expressions describing navigation from a query root to a value.
//!
//! A [`KeyPath`] is an untyped, immutable sequence of [`KeyPart`] segments.
//! [`Key<M>`] wraps it with a phantom tag naming the record type the path is
//! evaluated against. The tag never changes along a path: crossing an edge
//! keeps the outer tag, and only the predicates inlined into the traversal
//! are typed over the edge's records.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use smallvec::SmallVec;

use crate::query::context::Context;
use crate::query::filter::{render_group, Filter, Predicate};
use crate::query::operator::{Logic, Operator};
use crate::query::value::Value;

/// Edge direction for graph traversal segments.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Direction {
    /// Follow edges pointing into the current record (`<-`).
    In,
    /// Follow edges leaving the current record (`->`).
    Out,
}

impl Direction {
    /// Separator emitted in front of the edge name.
    pub fn separator(self) -> &'static str {
        match self {
            Direction::In => "<-",
            Direction::Out => "->",
        }
    }
}

/// One navigation step.
#[derive(Clone, Debug, PartialEq)]
pub enum KeyPart {
    /// `.name`
    Field(String),
    /// `name(<inner>, $a, $b, ...)` with bound arguments.
    Call {
        /// Function name, e.g. `string::lowercase`.
        name: String,
        /// Arguments bound through the context.
        args: Vec<Value>,
        /// Path passed as the first argument.
        inner: Arc<KeyPath>,
    },
    /// `name(<inner>, <key>, ...)` with path arguments rendered in place.
    CallOnKeys {
        /// Function name.
        name: String,
        /// Paths rendered as additional arguments.
        args: Vec<KeyPath>,
        /// Path passed as the first argument.
        inner: Arc<KeyPath>,
    },
    /// `->edge[WHERE ...]` or `<-edge[WHERE ...]`.
    Traverse {
        /// Edge direction.
        direction: Direction,
        /// Edge (or target node) table name.
        edge: String,
        /// Predicates evaluated against the edge's records.
        filters: Vec<Arc<Predicate>>,
    },
    /// `count(<inner>)`
    Count {
        /// Counted path.
        inner: Arc<KeyPath>,
    },
    /// `(<inner> <op> $n)`
    Calc {
        /// Arithmetic operator.
        op: Operator,
        /// Right-hand operand, bound through the context.
        operand: Value,
        /// Left-hand path.
        inner: Arc<KeyPath>,
    },
    /// `<op><inner>`
    Prefix {
        /// Unary operator.
        op: Operator,
        /// Operand path.
        inner: Arc<KeyPath>,
    },
}

impl KeyPart {
    fn render(&self, ctx: &mut Context, out: &mut String) {
        match self {
            KeyPart::Field(name) => {
                out.push('.');
                out.push_str(name);
            }
            KeyPart::Call { name, args, inner } => {
                out.push_str(name);
                out.push('(');
                let mut first = push_inner(inner, ctx, out);
                for arg in args {
                    if !first {
                        out.push_str(", ");
                    }
                    out.push_str(&ctx.as_var(arg.clone()));
                    first = false;
                }
                out.push(')');
            }
            KeyPart::CallOnKeys { name, args, inner } => {
                out.push_str(name);
                out.push('(');
                let mut first = push_inner(inner, ctx, out);
                for arg in args {
                    if !first {
                        out.push_str(", ");
                    }
                    out.push_str(&arg.render_stripped(ctx));
                    first = false;
                }
                out.push(')');
            }
            KeyPart::Traverse {
                direction,
                edge,
                filters,
            } => {
                out.push_str(direction.separator());
                out.push_str(edge);
                let cond = render_group(Logic::And, filters.iter().map(Arc::as_ref), ctx);
                if !cond.is_empty() {
                    out.push_str("[WHERE ");
                    out.push_str(&cond);
                    out.push(']');
                }
            }
            KeyPart::Count { inner } => {
                out.push_str("count(");
                push_inner(inner, ctx, out);
                out.push(')');
            }
            KeyPart::Calc { op, operand, inner } => {
                out.push('(');
                push_inner(inner, ctx, out);
                out.push(' ');
                out.push_str(op.symbol());
                out.push(' ');
                out.push_str(&ctx.as_var(operand.clone()));
                out.push(')');
            }
            KeyPart::Prefix { op, inner } => {
                out.push_str(op.symbol());
                push_inner(inner, ctx, out);
            }
        }
    }
}

/// Renders `inner` without its leading separator; returns `true` when nothing
/// was written.
fn push_inner(inner: &KeyPath, ctx: &mut Context, out: &mut String) -> bool {
    let rendered = inner.render_stripped(ctx);
    let empty = rendered.is_empty();
    out.push_str(&rendered);
    empty
}

/// Removes a single leading `.` left by a field segment at the root.
pub fn strip_separator(rendered: String) -> String {
    match rendered.strip_prefix('.') {
        Some(rest) => rest.to_owned(),
        None => rendered,
    }
}

/// Untyped path expression.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct KeyPath {
    parts: SmallVec<[KeyPart; 2]>,
}

impl KeyPath {
    /// The empty path, i.e. the query root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Segments in navigation order.
    pub fn parts(&self) -> &[KeyPart] {
        &self.parts
    }

    /// Returns `true` for the root path.
    pub fn is_root(&self) -> bool {
        self.parts.is_empty()
    }

    /// Returns a copy of this path with `part` appended.
    pub fn with(&self, part: KeyPart) -> Self {
        let mut parts = self.parts.clone();
        parts.push(part);
        Self { parts }
    }

    /// Returns a path whose only segment wraps this whole path.
    pub fn wrap(&self, wrap: impl FnOnce(Arc<KeyPath>) -> KeyPart) -> Self {
        let mut parts = SmallVec::new();
        parts.push(wrap(Arc::new(self.clone())));
        Self { parts }
    }

    /// Concatenates every segment's rendering.
    pub fn render(&self, ctx: &mut Context) -> String {
        let mut out = String::new();
        for part in &self.parts {
            part.render(ctx, &mut out);
        }
        out
    }

    /// Renders the path for use at the root of an expression.
    pub fn render_stripped(&self, ctx: &mut Context) -> String {
        strip_separator(self.render(ctx))
    }

    /// Dotted field path when the key consists only of field segments.
    pub fn field_path(&self) -> Option<String> {
        let mut names = Vec::with_capacity(self.parts.len());
        for part in &self.parts {
            match part {
                KeyPart::Field(name) => names.push(name.as_str()),
                _ => return None,
            }
        }
        Some(names.join("."))
    }
}

/// Path expression evaluated against records of type `M`.
pub struct Key<M> {
    path: KeyPath,
    _model: PhantomData<fn() -> M>,
}

impl<M> Clone for Key<M> {
    fn clone(&self) -> Self {
        Self::from_path(self.path.clone())
    }
}

impl<M> fmt::Debug for Key<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Key").field(&self.path).finish()
    }
}

impl<M> PartialEq for Key<M> {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl<M> Default for Key<M> {
    fn default() -> Self {
        Self::root()
    }
}

impl<M> Key<M> {
    /// Key pointing at the query root.
    pub fn root() -> Self {
        Self::from_path(KeyPath::root())
    }

    /// Wraps an untyped path.
    pub fn from_path(path: KeyPath) -> Self {
        Self {
            path,
            _model: PhantomData,
        }
    }

    /// Untyped path.
    pub fn path(&self) -> &KeyPath {
        &self.path
    }

    /// Consumes the key into its untyped path.
    pub fn into_path(self) -> KeyPath {
        self.path
    }

    /// Appends a field access.
    pub fn field(&self, name: impl Into<String>) -> Key<M> {
        Key::from_path(self.path.with(KeyPart::Field(name.into())))
    }

    /// Crosses an edge relation; `filters` apply to the edge records.
    pub fn traverse<E, I>(&self, direction: Direction, edge: impl Into<String>, filters: I) -> Key<M>
    where
        I: IntoIterator<Item = Filter<E>>,
    {
        Key::from_path(self.path.with(KeyPart::Traverse {
            direction,
            edge: edge.into(),
            filters: filters.into_iter().map(Filter::into_predicate).collect(),
        }))
    }

    /// Follows outgoing edges named `edge`.
    pub fn out<E, I>(&self, edge: impl Into<String>, filters: I) -> Key<M>
    where
        I: IntoIterator<Item = Filter<E>>,
    {
        self.traverse(Direction::Out, edge, filters)
    }

    /// Follows incoming edges named `edge`.
    pub fn in_<E, I>(&self, edge: impl Into<String>, filters: I) -> Key<M>
    where
        I: IntoIterator<Item = Filter<E>>,
    {
        self.traverse(Direction::In, edge, filters)
    }

    /// Wraps the key in a function call with bound arguments.
    pub fn func<I, V>(&self, name: impl Into<String>, args: I) -> Key<M>
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        let name = name.into();
        let args = args.into_iter().map(Into::into).collect();
        Key::from_path(self.path.wrap(|inner| KeyPart::Call { name, args, inner }))
    }

    /// Wraps the key in a function call whose extra arguments are other keys.
    pub fn func_keys<I>(&self, name: impl Into<String>, keys: I) -> Key<M>
    where
        I: IntoIterator<Item = Key<M>>,
    {
        let name = name.into();
        let args = keys.into_iter().map(Key::into_path).collect();
        Key::from_path(self.path.wrap(|inner| KeyPart::CallOnKeys { name, args, inner }))
    }

    /// `count(<key>)`
    pub fn count(&self) -> Key<M> {
        Key::from_path(self.path.wrap(|inner| KeyPart::Count { inner }))
    }

    /// `(<key> <op> $n)`
    pub fn calc(&self, op: Operator, operand: impl Into<Value>) -> Key<M> {
        debug_assert!(op.is_arithmetic(), "{op} is not an arithmetic operator");
        let operand = operand.into();
        Key::from_path(self.path.wrap(|inner| KeyPart::Calc { op, operand, inner }))
    }

    /// `<op><key>`
    pub fn prefix(&self, op: Operator) -> Key<M> {
        debug_assert!(op.is_unary(), "{op} is not a prefix operator");
        Key::from_path(self.path.wrap(|inner| KeyPart::Prefix { op, inner }))
    }

    /// Raw rendering, including any leading separator.
    pub fn render(&self, ctx: &mut Context) -> String {
        self.path.render(ctx)
    }

    /// Rendering with the leading separator removed.
    pub fn render_stripped(&self, ctx: &mut Context) -> String {
        self.path.render_stripped(ctx)
    }
}
