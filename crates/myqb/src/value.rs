//! Bound values and literal rendering.
//!
//! [`Value`] is the closed set of scalars (plus lists) a statement can carry,
//! either as a named parameter or, on the unparameterized path, as an
//! escaped SQL literal.
//!
//! The literal path is a convenience for trusted, hard-coded values. Anything
//! that originates from user input should go through a named placeholder
//! (see [`bind`](crate::expr::bind)).

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;

use crate::error::{QbError, QbResult};

/// A value bound to a placeholder or embedded as a literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    /// SQL NULL
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    Bytes(Vec<u8>),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Json(serde_json::Value),
    #[cfg(feature = "rust_decimal")]
    Decimal(rust_decimal::Decimal),
    /// A list, expanded by the execution layer when bound to `IN (:name)`
    List(Vec<Value>),
}

impl Value {
    /// Create a binary value.
    pub fn bytes(data: impl Into<Vec<u8>>) -> Self {
        Value::Bytes(data.into())
    }

    /// Short type name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::Bytes(_) => "bytes",
            Value::Date(_) => "date",
            Value::DateTime(_) => "datetime",
            Value::Json(_) => "json",
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(_) => "decimal",
            Value::List(_) => "list",
        }
    }

    /// Whether this is a number.
    pub fn is_numeric(&self) -> bool {
        match self {
            Value::Int(_) | Value::UInt(_) | Value::Float(_) => true,
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(_) => true,
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Render as an SQL literal.
    ///
    /// Strings are single-quoted and escaped with [`escape_literal`].
    pub fn to_literal(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(true) => "TRUE".to_string(),
            Value::Bool(false) => "FALSE".to_string(),
            Value::Int(v) => v.to_string(),
            Value::UInt(v) => v.to_string(),
            Value::Float(v) if v.is_finite() => v.to_string(),
            Value::Float(_) => "NULL".to_string(),
            Value::Text(s) => quote_literal(s),
            Value::Bytes(b) => {
                let mut out = String::with_capacity(b.len() * 2 + 3);
                out.push_str("X'");
                for byte in b {
                    out.push_str(&format!("{byte:02X}"));
                }
                out.push('\'');
                out
            }
            Value::Date(d) => quote_literal(&d.format("%Y-%m-%d").to_string()),
            Value::DateTime(dt) => quote_literal(&dt.format("%Y-%m-%d %H:%M:%S%.f").to_string()),
            Value::Json(j) => quote_literal(&j.to_string()),
            #[cfg(feature = "rust_decimal")]
            Value::Decimal(d) => d.to_string(),
            Value::List(items) => items
                .iter()
                .map(Value::to_literal)
                .collect::<Vec<_>>()
                .join(","),
        }
    }
}

/// Escape a string for embedding between single quotes.
///
/// Backslash and single quote are escaped so the literal cannot terminate
/// early; `:` is doubled so the execution layer does not read it as a named
/// placeholder (`::` is collapsed back to `:` when binding).
pub fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    for ch in s.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("''"),
            ':' => out.push_str("::"),
            _ => out.push(ch),
        }
    }
    out
}

fn quote_literal(s: &str) -> String {
    format!("'{}'", escape_literal(s))
}

/// `["a", "b"]` → `'a','b'`. An empty slice yields an empty string.
pub fn string_in_list<S: AsRef<str>>(items: &[S]) -> String {
    items
        .iter()
        .map(|s| quote_literal(s.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// `[1, 2, 3]` → `1,2,3`.
///
/// Fails for a non-list input or a non-numeric element. An empty list yields an
/// empty string.
pub fn numeric_in_list(value: &Value) -> QbResult<String> {
    let Value::List(items) = value else {
        return Err(QbError::NotAList(value.kind()));
    };
    let mut parts = Vec::with_capacity(items.len());
    for item in items {
        if !item.is_numeric() {
            return Err(QbError::UnsupportedElement(item.kind()));
        }
        parts.push(item.to_literal());
    }
    Ok(parts.join(","))
}

/// Marker for values accepted by numeric-only combinators (`add`, `mul`, ...).
pub trait Numeric: Into<Value> + Copy {}

macro_rules! impl_numeric {
    ($variant:ident as $target:ty: $($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::$variant(v as $target)
                }
            }

            impl Numeric for $t {}
        )*
    };
}

impl_numeric!(Int as i64: i8, i16, i32, i64, isize, u8, u16, u32);
impl_numeric!(UInt as u64: u64, usize);
impl_numeric!(Float as f64: f32, f64);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::Text(v.clone())
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Date(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Value {
    fn from(v: DateTime<Tz>) -> Self {
        Value::DateTime(v.naive_utc())
    }
}

impl From<uuid::Uuid> for Value {
    fn from(v: uuid::Uuid) -> Self {
        Value::Text(v.hyphenated().to_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

#[cfg(feature = "rust_decimal")]
impl From<rust_decimal::Decimal> for Value {
    fn from(v: rust_decimal::Decimal) -> Self {
        Value::Decimal(v)
    }
}

#[cfg(feature = "rust_decimal")]
impl Numeric for rust_decimal::Decimal {}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value> + Clone> From<&[T]> for Value {
    fn from(v: &[T]) -> Self {
        Value::List(v.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(v: [T; N]) -> Self {
        Value::List(v.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_quotes_backslash_and_colon() {
        assert_eq!(escape_literal("it's"), "it''s");
        assert_eq!(escape_literal(r"a\b"), r"a\\b");
        assert_eq!(escape_literal("a:b"), "a::b");
        assert_eq!(escape_literal("plain"), "plain");
    }

    #[test]
    fn text_literal_cannot_break_out() {
        let lit = Value::from("x' OR '1'='1").to_literal();
        assert_eq!(lit, "'x'' OR ''1''=''1'");
    }

    #[test]
    fn string_list() {
        assert_eq!(string_in_list(&["233", "sdf", "er"]), "'233','sdf','er'");
        assert_eq!(string_in_list::<&str>(&[]), "");
        assert_eq!(string_in_list(&["a:b"]), "'a::b'");
    }

    #[test]
    fn numeric_list() {
        assert_eq!(numeric_in_list(&Value::from(vec![1, 2, 3])).unwrap(), "1,2,3");
        assert_eq!(numeric_in_list(&Value::from(vec![1.5f64, 2.0])).unwrap(), "1.5,2");
        assert_eq!(numeric_in_list(&Value::List(vec![])).unwrap(), "");
    }

    #[test]
    fn numeric_list_rejects_text_element() {
        let err = numeric_in_list(&Value::from(vec!["a"])).unwrap_err();
        assert_eq!(err, QbError::UnsupportedElement("text"));
    }

    #[test]
    fn numeric_list_rejects_scalar() {
        let err = numeric_in_list(&Value::from(5)).unwrap_err();
        assert_eq!(err, QbError::NotAList("int"));
    }

    #[test]
    fn literals() {
        assert_eq!(Value::Null.to_literal(), "NULL");
        assert_eq!(Value::from(true).to_literal(), "TRUE");
        assert_eq!(Value::from(-3i32).to_literal(), "-3");
        assert_eq!(Value::from(7u64).to_literal(), "7");
        assert_eq!(Value::from(f64::NAN).to_literal(), "NULL");
        assert_eq!(Value::bytes(vec![0xde, 0xad]).to_literal(), "X'DEAD'");
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        assert_eq!(Value::from(d).to_literal(), "'2024-01-02'");
        let dt = d.and_hms_opt(9, 30, 0).unwrap();
        assert_eq!(Value::from(dt).to_literal(), "'2024-01-02 09::30::00'");
    }

    #[test]
    fn option_and_collections() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("a")), Value::Text("a".into()));
        assert_eq!(
            Value::from([1, 2]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
        let ids: &[i64] = &[4, 5];
        assert_eq!(Value::from(ids).to_literal(), "4,5");
    }

    #[test]
    fn serializes_untagged() {
        let v = Value::from(vec![Value::from(1), Value::from("a"), Value::Null]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"[1,"a",null]"#);
    }
}
