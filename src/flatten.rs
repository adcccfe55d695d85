//! Flattened traversal and the live key, value and item views.
//!
//! Flattening walks sub-configurations depth-first and joins the path with
//! dots: `{a: 1, sub: {b: 2}}` becomes `[("a", 1), ("sub.b", 2)]`. Empty
//! sub-configurations have no leaves and therefore contribute nothing.

use crate::config::Config;
use crate::value::Value;

/// Flatten `config` into dotted key-value pairs, in insertion order.
pub fn flat_items(config: &Config) -> Vec<(String, Value)> {
    let mut out = Vec::new();
    collect(config, "", &mut out);
    out
}

fn collect(config: &Config, prefix: &str, out: &mut Vec<(String, Value)>) {
    for (key, value) in config.entries() {
        let dotted = if prefix.is_empty() {
            key
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Config(sub) => collect(&sub, &dotted, out),
            leaf => out.push((dotted, leaf)),
        }
    }
}

fn snapshot(config: &Config, flat: bool) -> Vec<(String, Value)> {
    if flat {
        flat_items(config)
    } else {
        config.entries()
    }
}

/// The keys of a configuration. Reflects later mutations.
#[derive(Clone)]
pub struct Keys {
    config: Config,
    flat: bool,
}

impl Keys {
    pub(crate) fn new(config: Config, flat: bool) -> Self {
        Keys { config, flat }
    }

    pub fn len(&self) -> usize {
        if self.flat {
            flat_items(&self.config).len()
        } else {
            self.config.len()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        if self.flat {
            flat_items(&self.config).iter().any(|(k, _)| k == key)
        } else {
            self.config.raw_get(key).is_some()
        }
    }

    pub fn iter(&self) -> std::vec::IntoIter<String> {
        snapshot(&self.config, self.flat)
            .into_iter()
            .map(|(k, _)| k)
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// The values of a configuration. Reflects later mutations.
#[derive(Clone)]
pub struct Values {
    config: Config,
    flat: bool,
}

impl Values {
    pub(crate) fn new(config: Config, flat: bool) -> Self {
        Values { config, flat }
    }

    pub fn len(&self) -> usize {
        Keys::new(self.config.clone(), self.flat).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, value: &Value) -> bool {
        snapshot(&self.config, self.flat)
            .iter()
            .any(|(_, v)| v == value)
    }

    pub fn iter(&self) -> std::vec::IntoIter<Value> {
        snapshot(&self.config, self.flat)
            .into_iter()
            .map(|(_, v)| v)
            .collect::<Vec<_>>()
            .into_iter()
    }
}

/// The key-value pairs of a configuration. Reflects later mutations.
#[derive(Clone)]
pub struct Items {
    config: Config,
    flat: bool,
}

impl Items {
    pub(crate) fn new(config: Config, flat: bool) -> Self {
        Items { config, flat }
    }

    pub fn len(&self) -> usize {
        Keys::new(self.config.clone(), self.flat).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str, value: &Value) -> bool {
        snapshot(&self.config, self.flat)
            .iter()
            .any(|(k, v)| k == key && v == value)
    }

    pub fn iter(&self) -> std::vec::IntoIter<(String, Value)> {
        snapshot(&self.config, self.flat).into_iter()
    }
}

impl IntoIterator for &Keys {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Values {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for &Items {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::plain;
    use serde_json::json;

    fn keys(c: &Config, flat: bool) -> Vec<String> {
        c.keys(flat).iter().collect()
    }

    #[test]
    fn flat_keys_are_dotted_paths() {
        let c = plain(json!({"a": 1, "sub": {"b": 2, "c": 3}}));
        assert_eq!(keys(&c, true), vec!["a", "sub.b", "sub.c"]);
        assert_eq!(keys(&c, false), vec!["a", "sub"]);
    }

    #[test]
    fn deep_nesting() {
        let c = plain(json!({"a": {"b": {"c": {"d": 42}}}}));
        let items: Vec<(String, Value)> = c.items(true).iter().collect();
        assert_eq!(items, vec![("a.b.c.d".to_string(), Value::from(42))]);
    }

    #[test]
    fn empty_sub_config_contributes_nothing() {
        let c = plain(json!({"a": 1, "empty": {}}));
        assert_eq!(keys(&c, true), vec!["a"]);
        assert_eq!(c.keys(true).len(), 1);
        assert_eq!(c.keys(false).len(), 2);
    }

    #[test]
    fn flat_values_skip_sub_configs() {
        let c = plain(json!({"a": 1, "sub": {"b": "x"}}));
        let values: Vec<Value> = c.values(true).iter().collect();
        assert_eq!(values, vec![Value::from(1), Value::from("x")]);
        assert!(c.values(true).contains(&Value::from("x")));
        assert!(!c.values(false).contains(&Value::from("x")));
    }

    #[test]
    fn contains_respects_flat_mode() {
        let c = plain(json!({"sub": {"b": 2}}));
        assert!(c.keys(true).contains("sub.b"));
        assert!(!c.keys(true).contains("sub"));
        assert!(c.keys(false).contains("sub"));
        assert!(c.items(true).contains("sub.b", &Value::from(2)));
    }

    #[test]
    fn views_are_live() {
        let c = plain(json!({"a": 1}));
        let view = c.keys(true);
        c.set("sub.b", 2).unwrap();
        assert_eq!(view.len(), 2);
        assert!(view.contains("sub.b"));
        c.delete("a").unwrap();
        assert_eq!(view.iter().collect::<Vec<_>>(), vec!["sub.b"]);
    }

    #[test]
    fn views_iterate_by_reference() {
        let c = plain(json!({"x": 1, "y": 2}));
        let mut seen = Vec::new();
        for key in &c.keys(false) {
            seen.push(key);
        }
        assert_eq!(seen, vec!["x", "y"]);
    }
}
