//! Keys: the three equivalent ways of addressing an entry.
//!
//! `"a.b.c"`, `["a", "b", "c"]` and a chain of single lookups all reach the
//! same leaf. A [`Key::Single`] is split on `.` when it is resolved; a
//! [`Key::Path`] is taken segment by segment as given.

use std::fmt;

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    /// A plain or dot-separated string.
    Single(String),
    /// Explicit path segments.
    Path(Vec<String>),
}

impl Key {
    /// The path segments this key resolves through.
    ///
    /// An empty path is rejected; the segments themselves are not validated.
    pub fn segments(&self) -> Result<Vec<&str>, ConfigError> {
        match self {
            Key::Single(s) => Ok(s.split('.').collect()),
            Key::Path(p) if p.is_empty() => Err(ConfigError::invalid_key("()", "empty tuple")),
            Key::Path(p) => Ok(p.iter().map(String::as_str).collect()),
        }
    }

    pub fn is_dotted(&self) -> bool {
        match self {
            Key::Single(s) => s.contains('.'),
            Key::Path(p) => p.len() > 1,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Single(s) => write!(f, "{s}"),
            Key::Path(p) => write!(f, "{}", p.join(".")),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::Single(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::Single(s)
    }
}

impl From<&String> for Key {
    fn from(s: &String) -> Self {
        Key::Single(s.clone())
    }
}

impl From<&[&str]> for Key {
    fn from(p: &[&str]) -> Self {
        Key::Path(p.iter().map(|s| s.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Key {
    fn from(p: [&str; N]) -> Self {
        Key::Path(p.iter().map(|s| s.to_string()).collect())
    }
}

impl From<Vec<String>> for Key {
    fn from(p: Vec<String>) -> Self {
        Key::Path(p)
    }
}

impl From<&Key> for Key {
    fn from(k: &Key) -> Self {
        k.clone()
    }
}

/// Keys arriving as data (decoded files, RPC payloads) rather than code.
///
/// Strings and arrays of strings are accepted; anything else, including an
/// array with a non-string element, is a type error naming the offending type.
impl TryFrom<&serde_json::Value> for Key {
    type Error = ConfigError;

    fn try_from(value: &serde_json::Value) -> Result<Self, Self::Error> {
        use serde_json::Value as J;
        match value {
            J::String(s) => Ok(Key::Single(s.clone())),
            J::Array(items) => items
                .iter()
                .map(|item| match item {
                    J::String(s) => Ok(s.clone()),
                    other => Err(ConfigError::InvalidKeyType(json_type_name(other).into())),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Key::Path),
            other => Err(ConfigError::InvalidKeyType(json_type_name(other).into())),
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value as J;
    match value {
        J::Null => "null",
        J::Bool(_) => "bool",
        J::Number(n) if n.is_f64() => "float",
        J::Number(_) => "int",
        J::String(_) => "str",
        J::Array(_) => "list",
        J::Object(_) => "dict",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn plain_string_is_one_segment() {
        let key = Key::from("alpha");
        assert_eq!(key.segments().unwrap(), vec!["alpha"]);
        assert!(!key.is_dotted());
    }

    #[test]
    fn dotted_string_splits() {
        let key = Key::from("a.b.c");
        assert_eq!(key.segments().unwrap(), vec!["a", "b", "c"]);
        assert!(key.is_dotted());
    }

    #[test]
    fn path_segments_used_as_is() {
        let key = Key::from(["a.b", "c"]);
        assert_eq!(key.segments().unwrap(), vec!["a.b", "c"]);
    }

    #[test]
    fn empty_path_is_invalid() {
        let err = Key::Path(vec![]).segments().unwrap_err();
        assert!(err.to_string().contains("empty tuple"));
    }

    #[test]
    fn display_joins_with_dots() {
        assert_eq!(Key::from(["sub", "a"]).to_string(), "sub.a");
    }

    #[test]
    fn json_string_and_array_convert() {
        assert_eq!(Key::try_from(&json!("a.b")).unwrap(), Key::from("a.b"));
        assert_eq!(
            Key::try_from(&json!(["sub", "a"])).unwrap(),
            Key::from(["sub", "a"])
        );
    }

    #[test]
    fn json_non_string_rejected_with_type_name() {
        let err = Key::try_from(&json!(1)).unwrap_err();
        assert!(err.is_type_error());
        assert!(err.to_string().contains("'int'"));

        let err = Key::try_from(&json!(["a", 2.5])).unwrap_err();
        assert!(err.to_string().contains("'float'"));

        let err = Key::try_from(&json!({"a": 1})).unwrap_err();
        assert!(err.to_string().contains("'dict'"));
    }
}
