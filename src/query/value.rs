//! Canonical wire value representation for bound variables, plus the literal
//! forms used where the statement grammar forbids parameter substitution.
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_ENGINE;
use base64::Engine;
use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Typed value tagged with explicit type information so the wire format remains
/// unambiguous for values the store distinguishes (datetimes, durations, record
/// ids) but hosts usually expose as plain strings or integers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "t", content = "v")]
pub enum Value {
    /// Field-absent marker.
    None,
    /// Explicit null literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed 64-bit integer literal.
    Int(i64),
    /// 64-bit floating point literal.
    Float(f64),
    /// UTF-8 string literal.
    String(String),
    /// Arbitrary binary payload represented as bytes.
    Bytes(Vec<u8>),
    /// Nanoseconds since Unix epoch in UTC.
    #[serde(deserialize_with = "serde_nanos::deserialize")]
    DateTime(i128),
    /// Span of time in nanoseconds.
    #[serde(deserialize_with = "serde_nanos::deserialize")]
    Duration(i128),
    /// Reference to a record in another table.
    Record(RecordId),
    /// Ordered list of values.
    Array(Vec<Value>),
    /// Key/value object.
    Object(BTreeMap<String, Value>),
    /// Geographic value.
    Geometry(Geometry),
}

/// Table-qualified record identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId {
    /// Database-visible table name.
    pub table: String,
    /// Key within the table.
    pub key: String,
}

impl RecordId {
    /// Creates a record id for `table:key`.
    pub fn new(table: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
        }
    }
}

/// Geometry payload following the GeoJSON coordinate conventions
/// (`[longitude, latitude]`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "coordinates")]
pub enum Geometry {
    /// Single position.
    Point([f64; 2]),
    /// Open path of positions.
    LineString(Vec<[f64; 2]>),
    /// Exterior ring followed by optional interior rings.
    Polygon(Vec<Vec<[f64; 2]>>),
}

mod serde_nanos {
    use serde::de::{self, Deserializer, Visitor};
    use std::fmt;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<i128, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct NanosVisitor;

        impl<'de> Visitor<'de> for NanosVisitor {
            type Value = i128;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a string or number representing nanoseconds")
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value as i128)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value as i128)
            }

            fn visit_i128<E>(self, value: i128) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Ok(value)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<i128>()
                    .map_err(|err| E::custom(format!("invalid nanosecond literal '{value}': {err}")))
            }

            fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                self.visit_str(&value)
            }
        }

        deserializer.deserialize_any(NanosVisitor)
    }
}

impl Value {
    /// Builds an array value from anything convertible into values.
    pub fn array<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Value::Array(values.into_iter().map(Into::into).collect())
    }

    /// Renders the value as literal statement text.
    ///
    /// Only used where the grammar forbids substitution and for
    /// human-readable descriptions; statements sent to the store bind values
    /// through placeholders instead.
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut String) {
        match self {
            Value::None => out.push_str("NONE"),
            Value::Null => out.push_str("NULL"),
            Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Int(i) => {
                let _ = write!(out, "{i}");
            }
            Value::Float(f) => write_float(*f, out),
            Value::String(s) => out.push_str(&quote_literal(s)),
            Value::Bytes(bytes) => {
                let encoded = BASE64_ENGINE.encode(bytes);
                let _ = write!(out, "encoding::base64::decode('{encoded}')");
            }
            Value::DateTime(nanos) => out.push_str(&datetime_literal(*nanos)),
            Value::Duration(nanos) => {
                let nanos = u128::try_from(*nanos).unwrap_or(0);
                out.push_str(&format_nanos(nanos));
            }
            Value::Record(id) => {
                let _ = write!(
                    out,
                    "type::thing({}, {})",
                    quote_literal(&id.table),
                    quote_literal(&id.key)
                );
            }
            Value::Array(items) => {
                out.push('[');
                for (idx, item) in items.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out);
                }
                out.push(']');
            }
            Value::Object(fields) => {
                if fields.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{ ");
                for (idx, (name, item)) in fields.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&quote_literal(name));
                    out.push_str(": ");
                    item.write_literal(out);
                }
                out.push_str(" }");
            }
            Value::Geometry(geometry) => write_geometry(geometry, out),
        }
    }
}

fn write_float(f: f64, out: &mut String) {
    if f.is_nan() {
        out.push_str("math::nan");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "math::inf" } else { "math::neg_inf" });
    } else {
        let _ = write!(out, "{f:?}f");
    }
}

fn write_position(pos: &[f64; 2], out: &mut String) {
    out.push('[');
    write_float(pos[0], out);
    out.push_str(", ");
    write_float(pos[1], out);
    out.push(']');
}

fn write_geometry(geometry: &Geometry, out: &mut String) {
    match geometry {
        Geometry::Point([x, y]) => {
            out.push('(');
            write_float(*x, out);
            out.push_str(", ");
            write_float(*y, out);
            out.push(')');
        }
        Geometry::LineString(points) => {
            out.push_str("{ type: 'LineString', coordinates: [");
            for (idx, pos) in points.iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_position(pos, out);
            }
            out.push_str("] }");
        }
        Geometry::Polygon(rings) => {
            out.push_str("{ type: 'Polygon', coordinates: [");
            for (ridx, ring) in rings.iter().enumerate() {
                if ridx > 0 {
                    out.push_str(", ");
                }
                out.push('[');
                for (idx, pos) in ring.iter().enumerate() {
                    if idx > 0 {
                        out.push_str(", ");
                    }
                    write_position(pos, out);
                }
                out.push(']');
            }
            out.push_str("] }");
        }
    }
}

/// Escapes backslashes and quotes and wraps the text in single quotes.
pub fn quote_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            other => out.push(other),
        }
    }
    out.push('\'');
    out
}

/// Renders an RFC 3339 datetime literal (`d'...'`) for nanoseconds since the
/// Unix epoch.
pub fn datetime_literal(nanos: i128) -> String {
    let formatted = OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok());
    match formatted {
        Some(text) => format!("d'{text}'"),
        None => format!("time::from::nanos({nanos})"),
    }
}

const DURATION_UNITS: [(&str, u128); 7] = [
    ("d", 86_400_000_000_000),
    ("h", 3_600_000_000_000),
    ("m", 60_000_000_000),
    ("s", 1_000_000_000),
    ("ms", 1_000_000),
    ("us", 1_000),
    ("ns", 1),
];

/// Renders a duration in the compound unit form accepted by the statement
/// grammar, e.g. `1m30s` or `250ms`.
pub fn format_duration(duration: Duration) -> String {
    format_nanos(duration.as_nanos())
}

fn format_nanos(mut nanos: u128) -> String {
    if nanos == 0 {
        return "0ns".to_owned();
    }
    let mut out = String::new();
    for (unit, size) in DURATION_UNITS {
        let count = nanos / size;
        if count > 0 {
            let _ = write!(out, "{count}{unit}");
            nanos %= size;
        }
    }
    out
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Value::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Value::Int(value as i64)
    }
}

impl From<usize> for Value {
    fn from(value: usize) -> Self {
        Value::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        match i64::try_from(value) {
            Ok(v) => Value::Int(v),
            Err(_) => Value::Float(value as f64),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Value::Float(value as f64)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<&[u8]> for Value {
    fn from(value: &[u8]) -> Self {
        Value::Bytes(value.to_vec())
    }
}

impl From<OffsetDateTime> for Value {
    fn from(value: OffsetDateTime) -> Self {
        Value::DateTime(value.unix_timestamp_nanos())
    }
}

impl From<Duration> for Value {
    fn from(value: Duration) -> Self {
        Value::Duration(i128::try_from(value.as_nanos()).unwrap_or(i128::MAX))
    }
}

impl From<RecordId> for Value {
    fn from(value: RecordId) -> Self {
        Value::Record(value)
    }
}

impl From<Geometry> for Value {
    fn from(value: Geometry) -> Self {
        Value::Geometry(value)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
