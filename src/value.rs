//! The values a configuration can hold.
//!
//! [`Value::Map`] is a plain mapping that has not been inserted anywhere yet;
//! inserting it (or a [`Value::Config`]) into a configuration turns it into a
//! sub-configuration with the host's policy. The JSON conversions and the
//! serde impls are the bridge to file codecs and command-line parsing.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::config::Config;
use crate::key::Key;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A mutable sequence.
    List(Vec<Value>),
    /// An immutable sequence; what lists become inside frozen configurations.
    Tuple(Vec<Value>),
    /// An ordered plain mapping. Dotted keys are paths.
    Map(Vec<(String, Value)>),
    Config(Config),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Mappings and configurations: values that get wrapped on insertion and
    /// merged recursively in unions.
    pub fn is_mapping(&self) -> bool {
        matches!(self, Value::Map(_) | Value::Config(_))
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_config(&self) -> Option<&Config> {
        match self {
            Value::Config(c) => Some(c),
            _ => None,
        }
    }

    pub fn into_config(self) -> Option<Config> {
        match self {
            Value::Config(c) => Some(c),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Integer(_) => "int",
            Value::Float(_) => "float",
            Value::String(_) => "str",
            Value::List(_) => "list",
            Value::Tuple(_) => "tuple",
            Value::Map(_) => "dict",
            Value::Config(c) => c.policy().type_name(),
        }
    }

    /// Entries of a mapping-like value, keyed for insertion; any other value
    /// is handed back unchanged.
    ///
    /// Plain mapping keys may be dotted paths; configuration keys are always
    /// literal.
    pub(crate) fn mapping_entries(self) -> Result<Vec<(Key, Value)>, Value> {
        match self {
            Value::Map(entries) => Ok(entries
                .into_iter()
                .map(|(k, v)| (Key::Single(k), v))
                .collect()),
            Value::Config(c) => Ok(c
                .entries()
                .into_iter()
                .map(|(k, v)| (Key::Path(vec![k]), v))
                .collect()),
            other => Err(other),
        }
    }

    /// Convert into a plain JSON value.
    ///
    /// Tuples become arrays and non-finite floats become `null`.
    pub fn to_json(&self) -> serde_json::Value {
        use serde_json::Value as J;
        match self {
            Value::Null => J::Null,
            Value::Bool(b) => J::Bool(*b),
            Value::Integer(i) => J::from(*i),
            Value::Float(f) => serde_json::Number::from_f64(*f).map_or(J::Null, J::Number),
            Value::String(s) => J::String(s.clone()),
            Value::List(items) | Value::Tuple(items) => {
                J::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Map(entries) => J::Object(
                entries
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            Value::Config(c) => J::Object(c.to_json_map()),
        }
    }
}

/// Order-insensitive comparison of two mappings.
pub(crate) fn mapping_eq(a: &[(String, Value)], b: &[(String, Value)]) -> bool {
    a.len() == b.len()
        && a.iter().all(|(k, v)| {
            b.iter()
                .find(|(other, _)| other == k)
                .is_some_and(|(_, w)| v == w)
        })
}

fn snapshot(value: &Value) -> Option<Vec<(String, Value)>> {
    match value {
        Value::Map(entries) => Some(entries.clone()),
        Value::Config(c) => Some(c.entries()),
        _ => None,
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::List(a), Value::List(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Config(a), Value::Config(b)) => a == b,
            (a, b) => match (snapshot(a), snapshot(b)) {
                (Some(a), Some(b)) => mapping_eq(&a, &b),
                _ => false,
            },
        }
    }
}

impl PartialEq<serde_json::Value> for Value {
    fn eq(&self, other: &serde_json::Value) -> bool {
        *self == Value::from(other.clone())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x:?}"),
            Value::String(s) => write!(f, "{s}"),
            Value::List(items) => write_seq(f, "[", items, "]"),
            Value::Tuple(items) => write_seq(f, "(", items, ")"),
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            Value::Config(c) => write!(f, "{c}"),
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, items: &[Value], close: &str) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

// --- conversions ---

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Config> for Value {
    fn from(c: Config) -> Self {
        Value::Config(c)
    }
}

impl From<&Config> for Value {
    fn from(c: &Config) -> Self {
        Value::Config(c.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value as J;
        match v {
            J::Null => Value::Null,
            J::Bool(b) => Value::Bool(b),
            J::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            J::String(s) => Value::String(s),
            J::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            J::Object(map) => Value::from(map),
        }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for Value {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
    }
}

// --- serde ---

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Integer(i) => serializer.serialize_i64(*i),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::String(s) => serializer.serialize_str(s),
            Value::List(items) | Value::Tuple(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Value::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(k, v)?;
                }
                map.end()
            }
            Value::Config(c) => c.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ValueVisitor)
    }
}

struct ValueVisitor;

impl<'de> Visitor<'de> for ValueVisitor {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "any configuration value")
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Integer(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
        Ok(i64::try_from(v).map_or(Value::Float(v as f64), Value::Integer))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
        Ok(Value::Float(v))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        Value::deserialize(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(item) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::List(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries: Vec<(String, Value)> = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((k, v)) = map.next_entry::<String, Value>()? {
            match entries.iter_mut().find(|(existing, _)| *existing == k) {
                Some(slot) => slot.1 = v,
                None => entries.push((k, v)),
            }
        }
        Ok(Value::Map(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_object_becomes_ordered_map() {
        let v = Value::from(json!({"b": 1, "a": {"c": true}}));
        match v {
            Value::Map(entries) => {
                let keys: Vec<&str> = entries.iter().map(|(k, _)| k.as_str()).collect();
                assert_eq!(keys, vec!["b", "a"]);
                assert!(entries[1].1.is_mapping());
            }
            other => panic!("Expected Map, got {other:?}"),
        }
    }

    #[test]
    fn json_numbers_keep_their_kind() {
        assert_eq!(Value::from(json!(3)), Value::Integer(3));
        assert_eq!(Value::from(json!(0.5)), Value::Float(0.5));
    }

    #[test]
    fn to_json_round_trips_plain_values() {
        let original = json!({"a": [1, 2.5, "x", null], "b": {"c": false}});
        assert_eq!(Value::from(original.clone()).to_json(), original);
    }

    #[test]
    fn tuple_exports_as_array() {
        let t = Value::Tuple(vec![Value::from(1), Value::from(2)]);
        assert_eq!(t.to_json(), json!([1, 2]));
    }

    #[test]
    fn non_finite_float_exports_as_null() {
        assert_eq!(Value::Float(f64::NAN).to_json(), serde_json::Value::Null);
    }

    #[test]
    fn maps_compare_without_order() {
        let a = Value::from(json!({"x": 1, "y": 2}));
        let b = Value::from(json!({"y": 2, "x": 1}));
        assert_eq!(a, b);
        assert_ne!(a, Value::from(json!({"x": 1})));
    }

    #[test]
    fn list_and_tuple_differ() {
        let items = vec![Value::from(1)];
        assert_ne!(Value::List(items.clone()), Value::Tuple(items));
    }

    #[test]
    fn display_formats_nested_values() {
        let v = Value::from(json!({"a": [1, "b"], "c": null}));
        assert_eq!(v.to_string(), "{a: [1, b], c: null}");
        assert_eq!(Value::Float(1.0).to_string(), "1.0");
    }

    #[test]
    fn deserializes_from_toml() {
        let v: Value = toml::from_str("port = 8080\n[db]\nurl = \"pg://\"\n").unwrap();
        assert_eq!(v, json!({"port": 8080, "db": {"url": "pg://"}}));
    }

    #[test]
    fn type_names() {
        assert_eq!(Value::Null.type_name(), "null");
        assert_eq!(Value::from("x").type_name(), "str");
        assert_eq!(Value::Map(vec![]).type_name(), "dict");
    }
}
