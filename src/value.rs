//! Candidate values: the loosely-typed data an options structure is made of.
use std::fmt;
use indexmap::IndexMap;
use serde::{Serialize, Serializer};

use crate::descriptor::TypeTag;

/// An options structure: field name → value, in the order the caller supplied them.
pub type Options = IndexMap<String, Value>;

#[derive(Debug, Clone)]
pub enum Value {
    /// An explicit "undefined", distinct from an absent key.
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(IndexMap<String, Value>),
    /// A value of a user-defined nominal type.
    Instance {
        class: String,
        fields: IndexMap<String, Value>,
    },
}

impl Value {
    pub fn instance(class: impl Into<String>) -> Self {
        Value::Instance { class: class.into(), fields: IndexMap::new() }
    }

    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(xs) => Some(xs),
            _ => None,
        }
    }

    /// Runtime nominal type. `None` for undefined, which has no type.
    pub fn nominal_tag(&self) -> Option<TypeTag> {
        let tag = match self {
            Value::Undefined => return None,
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Boolean,
            Value::Number(_) => TypeTag::Number,
            Value::String(_) => TypeTag::String,
            Value::Array(_) => TypeTag::Array,
            Value::Object(_) => TypeTag::Object,
            Value::Instance { class, .. } => TypeTag::Custom(class.clone()),
        };
        Some(tag)
    }
}

// Strict equality: numbers compare as f64 (so NaN != NaN), composites structurally.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) => true,
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (
                Value::Instance { class: ca, fields: fa },
                Value::Instance { class: cb, fields: fb },
            ) => ca == cb && fa == fb,
            _ => false,
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONVERSIONS
// ————————————————————————————————————————————————————————————————————————————

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            // u64/i64 beyond 2^53 lose precision, same as any f64 number
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(xs) => Value::Array(xs.into_iter().map(Value::from).collect()),
            serde_json::Value::Object(m) => {
                Value::Object(m.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self { Value::Bool(b) }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self { Value::Number(n) }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self { Value::Number(n as f64) }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self { Value::Number(n as f64) }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self { Value::String(s.to_string()) }
}

impl From<String> for Value {
    fn from(s: String) -> Self { Value::String(s) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(xs: Vec<T>) -> Self {
        Value::Array(xs.into_iter().map(Into::into).collect())
    }
}

/// Convert a JSON document into an options structure. Non-objects yield `None`.
pub fn options_from_json(v: serde_json::Value) -> Option<Options> {
    match Value::from(v) {
        Value::Object(m) => Some(m),
        _ => None,
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        match self {
            Value::Undefined | Value::Null => s.serialize_unit(),
            Value::Bool(b) => s.serialize_bool(*b),
            Value::Number(n) if n.fract() == 0.0 && n.abs() < 9.0e15 => s.serialize_i64(*n as i64),
            Value::Number(n) => s.serialize_f64(*n),
            Value::String(x) => s.serialize_str(x),
            Value::Array(xs) => xs.serialize(s),
            Value::Object(m) => m.serialize(s),
            Value::Instance { class, fields } => {
                let mut map = s.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("$class", class)?;
                for (k, v) in fields {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// DISPLAY (inspect-style)
// ————————————————————————————————————————————————————————————————————————————

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Undefined => f.write_str("undefined"),
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => f.write_str(&format_number(*n)),
            Value::String(s) => write!(f, "'{}'", s.replace('\'', "\\'")),
            Value::Array(xs) if xs.is_empty() => f.write_str("[]"),
            Value::Array(xs) => {
                f.write_str("[ ")?;
                for (i, x) in xs.iter().enumerate() {
                    if i > 0 { f.write_str(", ")?; }
                    write!(f, "{x}")?;
                }
                f.write_str(" ]")
            }
            Value::Object(m) => fmt_fields(f, None, m),
            Value::Instance { class, fields } => fmt_fields(f, Some(class.as_str()), fields),
        }
    }
}

fn fmt_fields(f: &mut fmt::Formatter<'_>, class: Option<&str>, m: &IndexMap<String, Value>) -> fmt::Result {
    if let Some(class) = class {
        write!(f, "{class} ")?;
    }
    if m.is_empty() {
        return f.write_str("{}");
    }
    f.write_str("{ ")?;
    for (i, (k, v)) in m.iter().enumerate() {
        if i > 0 { f.write_str(", ")?; }
        write!(f, "{k}: {v}")?;
    }
    f.write_str(" }")
}

pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_string() } else { "-Infinity".to_string() }
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i128)
    } else {
        format!("{n}")
    }
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nominal_tags() {
        assert_eq!(Value::Undefined.nominal_tag(), None);
        assert_eq!(Value::Null.nominal_tag(), Some(TypeTag::Null));
        assert_eq!(Value::from(1).nominal_tag(), Some(TypeTag::Number));
        assert_eq!(Value::from("a").nominal_tag(), Some(TypeTag::String));
        assert_eq!(Value::from(vec![1, 2]).nominal_tag(), Some(TypeTag::Array));
        assert_eq!(
            Value::instance("Port").nominal_tag(),
            Some(TypeTag::Custom("Port".into()))
        );
    }

    #[test]
    fn strict_equality() {
        assert_eq!(Value::from(1), Value::from(1.0));
        assert_ne!(Value::from(1), Value::from("1"));
        assert_ne!(Value::Number(f64::NAN), Value::Number(f64::NAN));
        assert_ne!(Value::Null, Value::Undefined);
        assert_ne!(Value::instance("A"), Value::instance("B"));
    }

    #[test]
    fn from_json_keeps_key_order() {
        let opts = options_from_json(json!({"b": 1, "a": [true, null]})).unwrap();
        let keys: Vec<_> = opts.keys().cloned().collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(opts["a"], Value::Array(vec![Value::Bool(true), Value::Null]));
        assert!(options_from_json(json!([1])).is_none());
    }

    #[test]
    fn inspect_style_display() {
        let v = Value::from(json!({"names": ["x", 2], "on": true, "n": 1.5}));
        assert_eq!(v.to_string(), "{ names: [ 'x', 2 ], on: true, n: 1.5 }");
        assert_eq!(Value::Undefined.to_string(), "undefined");
        assert_eq!(Value::Array(vec![]).to_string(), "[]");
        assert_eq!(Value::instance("Port").to_string(), "Port {}");
    }

    #[test]
    fn serializes_back_to_json() {
        let v = Value::Array(vec![Value::from(2), Value::Undefined, Value::from(0.5)]);
        assert_eq!(serde_json::to_value(&v).unwrap(), json!([2, null, 0.5]));
    }
}
