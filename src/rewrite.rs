//! Key rewriting for import and export.
//!
//! A [`KeyMods`] maps substrings to replacements, e.g. `{" ": "_"}` to turn
//! `"key 1"` into `"key_1"`. All patterns are applied in a single pass,
//! longest pattern first, so replacements are never rewritten again and the
//! result does not depend on the order the modifiers were given in.

use regex::{Captures, Regex};

use crate::error::ConfigError;
use crate::value::Value;

#[derive(Debug, Clone)]
pub struct KeyMods {
    pairs: Vec<(String, String)>,
    matcher: Option<Regex>,
}

impl KeyMods {
    /// Build from `(pattern, replacement)` pairs. Empty patterns are
    /// rejected; a repeated pattern keeps its last replacement.
    pub fn new<I, P, R>(mods: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (P, R)>,
        P: Into<String>,
        R: Into<String>,
    {
        let mut pairs: Vec<(String, String)> = Vec::new();
        for (pattern, replacement) in mods {
            let pattern = pattern.into();
            if pattern.is_empty() {
                return Err(ConfigError::InvalidKeyMod(
                    "patterns must not be empty".into(),
                ));
            }
            let replacement = replacement.into();
            match pairs.iter_mut().find(|(p, _)| *p == pattern) {
                Some(slot) => slot.1 = replacement,
                None => pairs.push((pattern, replacement)),
            }
        }
        pairs.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let matcher = if pairs.is_empty() {
            None
        } else {
            let alternation = pairs
                .iter()
                .map(|(p, _)| regex::escape(p))
                .collect::<Vec<_>>()
                .join("|");
            Some(
                Regex::new(&alternation)
                    .map_err(|e| ConfigError::InvalidKeyMod(e.to_string()))?,
            )
        };

        Ok(KeyMods { pairs, matcher })
    }

    /// The modifiers in matching order.
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Swap patterns and replacements, e.g. to undo an import rewrite on
    /// export.
    pub fn invert(&self) -> Result<KeyMods, ConfigError> {
        KeyMods::new(self.pairs.iter().map(|(p, r)| (r.clone(), p.clone())))
    }

    pub fn rewrite(&self, key: &str) -> String {
        let Some(matcher) = &self.matcher else {
            return key.to_string();
        };
        matcher
            .replace_all(key, |caps: &Captures| {
                let found = &caps[0];
                self.pairs
                    .iter()
                    .find(|(p, _)| p == found)
                    .map_or_else(|| found.to_string(), |(_, r)| r.clone())
            })
            .into_owned()
    }

    /// Rewrite every key of `map`, descending into nested objects.
    pub fn rewrite_keys(
        &self,
        map: &serde_json::Map<String, serde_json::Value>,
    ) -> serde_json::Map<String, serde_json::Value> {
        map.iter()
            .map(|(k, v)| {
                let v = match v {
                    serde_json::Value::Object(inner) => {
                        serde_json::Value::Object(self.rewrite_keys(inner))
                    }
                    other => other.clone(),
                };
                (self.rewrite(k), v)
            })
            .collect()
    }

    /// Rewrite the keys of a mapping or configuration value into a plain
    /// mapping, descending the same way as [`rewrite_keys`](Self::rewrite_keys).
    pub(crate) fn rewrite_value(&self, value: Value) -> Value {
        let entries = match value {
            Value::Map(entries) => entries,
            Value::Config(config) => config.entries(),
            other => return other,
        };
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (self.rewrite(&k), self.rewrite_value(v)))
                .collect(),
        )
    }
}
