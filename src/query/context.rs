//! Per-render binding state and the rendered statement it produces.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::Result;
use crate::query::value::Value;

/// Ordered variable map keyed by placeholder index (`"0"`, `"1"`, ...).
///
/// Indices are dense and allocated in call order, so the map is stored as a
/// vector and the keys are derived from positions.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Vars {
    values: Vec<Value>,
}

impl Vars {
    /// Number of bound variables.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing was bound.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Looks up a variable by its key (without the `$` prefix).
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.parse::<usize>().ok().and_then(|idx| self.values.get(idx))
    }

    /// Iterates `(key, value)` pairs in placeholder order.
    pub fn iter(&self) -> impl Iterator<Item = (String, &Value)> + '_ {
        self.values
            .iter()
            .enumerate()
            .map(|(idx, value)| (idx.to_string(), value))
    }

    /// Values in placeholder order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl Serialize for Vars {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(&key, value)?;
        }
        map.end()
    }
}

/// Binding context for one render pass.
///
/// This is the only mutable state involved in rendering. A context is created
/// by the terminal `build*` call, threaded through every key, filter, sort and
/// search expression, and consumed into a [`Rendered`] value.
#[derive(Debug, Default)]
pub struct Context {
    vars: Vars,
}

impl Context {
    /// Creates an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `value` to the next placeholder and returns it (`$0`, `$1`, ...).
    pub fn as_var(&mut self, value: impl Into<Value>) -> String {
        let idx = self.vars.values.len();
        self.vars.values.push(value.into());
        format!("${idx}")
    }

    /// Variables bound so far.
    pub fn vars(&self) -> &Vars {
        &self.vars
    }

    /// Pairs the context's bindings with a finished statement.
    pub fn finish(self, statement: String) -> Rendered {
        Rendered {
            statement,
            variables: self.vars,
        }
    }
}

/// Final output of a render: statement text plus bound variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Rendered {
    /// Parameterized statement text.
    pub statement: String,
    /// Values for every `$n` placeholder in `statement`.
    pub variables: Vars,
}

impl Rendered {
    /// Encodes the variables as a JSON object for transport.
    pub fn variables_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.variables)?)
    }

    /// Returns the statement with each placeholder replaced by the literal form
    /// of its value. Intended for logs and debugging only.
    ///
    /// Text inside single-quoted literals is copied as is, so a `$0` that is
    /// part of inlined search terms is left alone.
    pub fn describe(&self) -> String {
        let mut out = String::with_capacity(self.statement.len());
        let mut chars = self.statement.char_indices();
        let mut quoted = false;
        while let Some((pos, ch)) = chars.next() {
            match ch {
                '\\' if quoted => {
                    out.push(ch);
                    if let Some((_, escaped)) = chars.next() {
                        out.push(escaped);
                    }
                }
                '\'' => {
                    quoted = !quoted;
                    out.push(ch);
                }
                '$' if !quoted => {
                    let tail = &self.statement[pos + 1..];
                    let digits = tail.bytes().take_while(u8::is_ascii_digit).count();
                    match self.variables.get(&tail[..digits]) {
                        Some(value) if digits > 0 => out.push_str(&value.to_literal()),
                        _ => {
                            out.push('$');
                            out.push_str(&tail[..digits]);
                        }
                    }
                    for _ in 0..digits {
                        chars.next();
                    }
                }
                _ => out.push(ch),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholders_are_sequential() {
        let mut ctx = Context::new();
        assert_eq!(ctx.as_var("a"), "$0");
        assert_eq!(ctx.as_var(1i64), "$1");
        assert_eq!(ctx.as_var(true), "$2");
        assert_eq!(ctx.vars().len(), 3);
        assert_eq!(ctx.vars().get("1"), Some(&Value::Int(1)));
        assert_eq!(ctx.vars().get("3"), None);
    }

    #[test]
    fn variables_serialize_as_object() {
        let mut ctx = Context::new();
        ctx.as_var("Matrix");
        let rendered = ctx.finish("title = $0".into());
        assert_eq!(
            rendered.variables_json().unwrap(),
            r#"{"0":{"t":"String","v":"Matrix"}}"#
        );
    }

    #[test]
    fn describe_inlines_multi_digit_placeholders() {
        let mut ctx = Context::new();
        let mut parts = Vec::new();
        for i in 0..11i64 {
            parts.push(ctx.as_var(i));
        }
        let rendered = ctx.finish(parts.join(","));
        assert_eq!(rendered.describe(), "0,1,2,3,4,5,6,7,8,9,10");
    }

    #[test]
    fn describe_leaves_quoted_literals_alone() {
        let mut ctx = Context::new();
        let title = ctx.as_var("x");
        let statement = format!(r"title = {title} AND title @0@ 'cost $0 it\'s $1' AND year = $9");
        let rendered = ctx.finish(statement);
        assert_eq!(
            rendered.describe(),
            r"title = 'x' AND title @0@ 'cost $0 it\'s $1' AND year = $9"
        );
    }
}
