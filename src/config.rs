//! The hierarchical configuration object.
//!
//! A [`Config`] is a handle to a node of ordered key-value entries. Cloning
//! the handle shares the node, so a sub-configuration fetched with
//! [`Config::get`] is the one stored in its parent and mutations through
//! either handle are visible through both. [`Config::shallow_copy`] and
//! [`Config::deep_copy`] create new nodes.
//!
//! How a node reacts to invalid keys, repeated assignments and unhashable
//! values is decided by its [`Policy`]. Sub-configurations take on the policy
//! of the configuration they are inserted into.

use std::cell::RefCell;
use std::fmt;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::rc::Rc;

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::ConfigError;
use crate::flatten::{self, Items, Keys, Values};
use crate::key::Key;
use crate::merge;
use crate::normalize::fix;
use crate::policy::{OverwritePolicy, Policy};
use crate::resolve::{Resolved, resolve, resolve_or_create};
use crate::rewrite::KeyMods;
use crate::validate::{RESERVED_NAMES, validate_key};
use crate::value::{Value, mapping_eq};

struct Node {
    policy: Policy,
    entries: Vec<(String, Value)>,
}

/// A handle to a configuration node. Cloning shares the node.
#[derive(Clone)]
pub struct Config(Rc<RefCell<Node>>);

/// Anything that can be inserted entry by entry: configurations, JSON
/// objects and lists of key-value pairs.
pub trait IntoEntries {
    fn into_entries(self) -> Vec<(Key, Value)>;
}

impl IntoEntries for &Config {
    fn into_entries(self) -> Vec<(Key, Value)> {
        self.entries()
            .into_iter()
            .map(|(k, v)| (Key::Path(vec![k]), v))
            .collect()
    }
}

impl IntoEntries for Config {
    fn into_entries(self) -> Vec<(Key, Value)> {
        (&self).into_entries()
    }
}

impl IntoEntries for serde_json::Map<String, serde_json::Value> {
    fn into_entries(self) -> Vec<(Key, Value)> {
        self.into_iter()
            .map(|(k, v)| (Key::Single(k), Value::from(v)))
            .collect()
    }
}

impl IntoEntries for &serde_json::Map<String, serde_json::Value> {
    fn into_entries(self) -> Vec<(Key, Value)> {
        self.clone().into_entries()
    }
}

impl<K: Into<Key>, V: Into<Value>> IntoEntries for Vec<(K, V)> {
    fn into_entries(self) -> Vec<(Key, Value)> {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

impl<K: Into<Key>, V: Into<Value>, const N: usize> IntoEntries for [(K, V); N] {
    fn into_entries(self) -> Vec<(Key, Value)> {
        self.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
    }
}

/// Read-only configurations can still be built; during construction a
/// repeated key simply replaces the earlier value.
fn construction_mode(policy: Policy) -> OverwritePolicy {
    match policy.overwrite {
        OverwritePolicy::ReadOnly => OverwritePolicy::Silent,
        other => other,
    }
}

impl Config {
    /// An empty configuration.
    pub fn new(policy: Policy) -> Self {
        Config(Rc::new(RefCell::new(Node {
            policy,
            entries: Vec::new(),
        })))
    }

    /// Build a configuration from key-value pairs.
    ///
    /// Keys may be dotted paths; repeated keys follow the policy, except that
    /// read-only configurations accept them during construction.
    pub fn from_pairs(policy: Policy, pairs: impl IntoEntries) -> Result<Self, ConfigError> {
        Self::build(policy, pairs.into_entries())
    }

    pub(crate) fn build(policy: Policy, entries: Vec<(Key, Value)>) -> Result<Self, ConfigError> {
        let config = Config::new(policy);
        let overwrite = construction_mode(policy);
        for (key, value) in entries {
            config.store(&key, value, overwrite)?;
        }
        Ok(config)
    }

    /// Build a configuration from a JSON object, optionally rewriting keys
    /// first.
    pub fn from_dict(
        policy: Policy,
        map: &serde_json::Map<String, serde_json::Value>,
        key_mods: Option<&KeyMods>,
    ) -> Result<Self, ConfigError> {
        match key_mods {
            Some(mods) => Self::from_pairs(policy, mods.rewrite_keys(map)),
            None => Self::from_pairs(policy, map),
        }
    }

    /// Export as a JSON object.
    ///
    /// With `flat`, nested entries become dotted keys (empty sub-configurations
    /// disappear). Key modifiers are applied to the exported keys, after
    /// flattening.
    pub fn to_dict(
        &self,
        key_mods: Option<&KeyMods>,
        flat: bool,
    ) -> serde_json::Map<String, serde_json::Value> {
        let map = if flat {
            flatten::flat_items(self)
                .into_iter()
                .map(|(k, v)| (k, v.to_json()))
                .collect()
        } else {
            self.to_json_map()
        };
        match key_mods {
            Some(mods) => mods.rewrite_keys(&map),
            None => map,
        }
    }

    /// The policy this configuration was created with.
    pub fn policy(&self) -> Policy {
        self.0.borrow().policy
    }

    /// Whether both handles refer to the same node.
    pub fn ptr_eq(&self, other: &Config) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Number of top-level entries.
    pub fn len(&self) -> usize {
        self.0.borrow().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().entries.is_empty()
    }

    /// The value at `key`; sub-configurations are returned as live handles.
    pub fn get(&self, key: impl Into<Key>) -> Result<Value, ConfigError> {
        let key = key.into();
        let Resolved { host, leaf } = resolve(self, &key)?;
        host.raw_get(&leaf).ok_or(ConfigError::KeyNotFound(leaf))
    }

    pub fn contains(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_ok()
    }

    /// Assign `value` to `key`, creating intermediate sub-configurations.
    ///
    /// A mapping assigned over an existing sub-configuration is merged into
    /// it. Whether replacing an existing value is allowed is up to the policy.
    pub fn set(&self, key: impl Into<Key>, value: impl Into<Value>) -> Result<(), ConfigError> {
        let key = key.into();
        let policy = self.policy();
        if policy.is_read_only() {
            return Err(self.read_only_error(&key));
        }
        self.store(&key, value.into(), policy.overwrite)
    }

    /// Remove `key` and return its value.
    pub fn delete(&self, key: impl Into<Key>) -> Result<Value, ConfigError> {
        let key = key.into();
        if self.policy().is_read_only() {
            return Err(self.read_only_error(&key));
        }
        let Resolved { host, leaf } = resolve(self, &key)?;
        host.raw_remove(&leaf).ok_or(ConfigError::KeyNotFound(leaf))
    }

    /// Replace the value at `key` regardless of the duplicate policy.
    ///
    /// Returns the previous value, if any. When both the old and the new
    /// value are mappings, the sub-configuration is overwritten entry by entry
    /// and the result maps each overwritten sub-key to its previous value
    /// (`null` for sub-keys that did not exist).
    pub fn overwrite(
        &self,
        key: impl Into<Key>,
        value: impl Into<Value>,
    ) -> Result<Option<Value>, ConfigError> {
        let key = key.into();
        let mut value = value.into();
        if self.policy().is_read_only() {
            return Err(self.read_only_error(&key));
        }

        let Resolved { host, leaf } = resolve_or_create(self, &key)?;
        let policy = host.policy();
        validate_key(&leaf, policy.keys)?;

        let old = host.raw_get(&leaf);
        if let Some(Value::Config(sub)) = &old {
            match value.mapping_entries() {
                Ok(entries) => {
                    let previous = sub.overwrite_entries(entries)?;
                    return Ok(Some(Value::Map(
                        previous
                            .into_iter()
                            .map(|(k, v)| (k, v.unwrap_or(Value::Null)))
                            .collect(),
                    )));
                }
                Err(v) => value = v,
            }
        }

        host.raw_insert(leaf, fix(policy, value)?);
        Ok(old)
    }

    /// [`overwrite`](Self::overwrite) every pair in order, returning the
    /// previous value for each key as given.
    pub fn overwrite_all(
        &self,
        pairs: impl IntoEntries,
    ) -> Result<Vec<(String, Option<Value>)>, ConfigError> {
        self.overwrite_entries(pairs.into_entries())
    }

    fn overwrite_entries(
        &self,
        entries: Vec<(Key, Value)>,
    ) -> Result<Vec<(String, Option<Value>)>, ConfigError> {
        entries
            .into_iter()
            .map(|(key, value)| {
                let name = key.to_string();
                self.overwrite(key, value).map(|old| (name, old))
            })
            .collect()
    }

    /// [`set`](Self::set) every pair in order.
    pub fn update(&self, pairs: impl IntoEntries) -> Result<(), ConfigError> {
        for (key, value) in pairs.into_entries() {
            self.set(key, value)?;
        }
        Ok(())
    }

    /// A new node whose entries are the same values; sub-configurations are
    /// shared with `self`.
    pub fn shallow_copy(&self) -> Config {
        let node = self.0.borrow();
        Config(Rc::new(RefCell::new(Node {
            policy: node.policy,
            entries: node.entries.clone(),
        })))
    }

    /// A fully independent copy, sub-configurations included.
    pub fn deep_copy(&self) -> Config {
        let node = self.0.borrow();
        let entries = node
            .entries
            .iter()
            .map(|(k, v)| {
                let v = match v {
                    Value::Config(sub) => Value::Config(sub.deep_copy()),
                    other => other.clone(),
                };
                (k.clone(), v)
            })
            .collect();
        Config(Rc::new(RefCell::new(Node {
            policy: node.policy,
            entries,
        })))
    }

    /// Merge `other` into a deep copy of `self`.
    ///
    /// Sub-configurations present on both sides are merged recursively; for
    /// other keys `other` wins, unless the policy rejects duplicates, in which
    /// case any overlap is a conflict.
    pub fn union(&self, other: impl IntoEntries) -> Result<Config, ConfigError> {
        merge::union(self, other.into_entries())
    }

    /// Merge `other` into `self` in place.
    ///
    /// Read-only configurations cannot change, so the handle is rebound to a
    /// new merged configuration instead; other handles keep the old one.
    pub fn union_assign(&mut self, other: impl IntoEntries) -> Result<(), ConfigError> {
        let entries = other.into_entries();
        if self.policy().is_read_only() {
            *self = merge::union(self, entries)?;
            Ok(())
        } else {
            merge::union_assign(self, entries)
        }
    }

    /// `base` merged with `self` on top, as a configuration of this policy.
    pub fn rev_union(&self, base: impl IntoEntries) -> Result<Config, ConfigError> {
        merge::rev_union(self, base.into_entries())
    }

    /// Top-level keys, or dotted leaf paths with `flat`. The view stays live.
    pub fn keys(&self, flat: bool) -> Keys {
        Keys::new(self.clone(), flat)
    }

    /// Top-level values, or leaf values with `flat`.
    pub fn values(&self, flat: bool) -> Values {
        Values::new(self.clone(), flat)
    }

    /// Key-value pairs, keyed by dotted path with `flat`.
    pub fn items(&self, flat: bool) -> Items {
        Items::new(self.clone(), flat)
    }

    /// A snapshot of the top-level entries in insertion order.
    pub fn iter(&self) -> std::vec::IntoIter<(String, Value)> {
        self.entries().into_iter()
    }

    /// Order-independent content hash. Only read-only configurations are
    /// hashable.
    pub fn try_hash(&self) -> Result<u64, ConfigError> {
        let policy = self.policy();
        if !policy.is_read_only() {
            return Err(ConfigError::Unhashable(policy.type_name().to_string()));
        }
        let entries = self.entries();
        let mut acc: u64 = 0;
        for (k, v) in &entries {
            let mut h = DefaultHasher::new();
            k.hash(&mut h);
            hash_value(v, &mut h)?;
            acc = acc.wrapping_add(h.finish());
        }
        let mut h = DefaultHasher::new();
        entries.len().hash(&mut h);
        acc.hash(&mut h);
        Ok(h.finish())
    }

    // --- attribute-style access ---

    /// Look up a single top-level entry by name.
    pub fn get_attr(&self, name: &str) -> Result<Value, ConfigError> {
        check_attr_name(name)?;
        let Resolved { host, leaf } = resolve(self, &Key::Path(vec![name.to_string()]))?;
        host.raw_get(&leaf)
            .ok_or_else(|| ConfigError::Attribute(format!("no config entry with key '{name}'")))
    }

    /// Assign a single top-level entry; rejected values surface as attribute
    /// errors.
    pub fn set_attr(&self, name: &str, value: impl Into<Value>) -> Result<(), ConfigError> {
        check_attr_name(name)?;
        let key = Key::Path(vec![name.to_string()]);
        if self.policy().is_read_only() {
            return Err(self.read_only_error(&key));
        }
        self.set(key, value).map_err(|e| {
            if e.is_value_error() {
                ConfigError::Attribute(format!("config entry with key {e}"))
            } else {
                e
            }
        })
    }

    /// Remove a single top-level entry.
    pub fn del_attr(&self, name: &str) -> Result<Value, ConfigError> {
        check_attr_name(name)?;
        let key = Key::Path(vec![name.to_string()]);
        self.delete(key).map_err(|e| match e {
            ConfigError::KeyNotFound(_) => {
                ConfigError::Attribute(format!("no config entry with key '{name}'"))
            }
            other => other,
        })
    }

    /// Interface names and stored keys, sorted.
    pub fn attr_names(&self) -> Vec<String> {
        let mut names: Vec<String> = RESERVED_NAMES
            .iter()
            .map(|s| s.to_string())
            .chain(self.entries().into_iter().map(|(k, _)| k))
            .collect();
        names.sort();
        names.dedup();
        names
    }

    // --- node internals ---

    /// Insert without the read-only check.
    pub(crate) fn store(
        &self,
        key: &Key,
        value: Value,
        overwrite: OverwritePolicy,
    ) -> Result<(), ConfigError> {
        let Resolved { host, leaf } = resolve_or_create(self, key)?;
        let policy = host.policy();
        validate_key(&leaf, policy.keys)?;

        let old = host.raw_get(&leaf);
        if old.is_some() && overwrite == OverwritePolicy::RejectDuplicate {
            return Err(ConfigError::AlreadyDefined(key.to_string()));
        }

        match (old, fix(policy, value)?) {
            (Some(Value::Config(old)), Value::Config(new)) => {
                merge::merge_into(&old, &new, OverwritePolicy::Silent)
            }
            (_, new) => {
                host.raw_insert(leaf, new);
                Ok(())
            }
        }
    }

    fn read_only_error(&self, key: &Key) -> ConfigError {
        match resolve(self, key) {
            Ok(Resolved { host, leaf }) if host.raw_get(&leaf).is_some() => {
                ConfigError::ReadOnly(key.to_string())
            }
            _ => ConfigError::NoAttribute(key.to_string()),
        }
    }

    /// A snapshot of the top-level entries.
    pub(crate) fn entries(&self) -> Vec<(String, Value)> {
        self.0.borrow().entries.clone()
    }

    pub(crate) fn raw_get(&self, key: &str) -> Option<Value> {
        self.0
            .borrow()
            .entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    }

    /// Replace in place if the key exists, append otherwise.
    pub(crate) fn raw_insert(&self, key: String, value: Value) {
        let mut node = self.0.borrow_mut();
        match node.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => node.entries.push((key, value)),
        }
    }

    pub(crate) fn raw_remove(&self, key: &str) -> Option<Value> {
        let mut node = self.0.borrow_mut();
        let pos = node.entries.iter().position(|(k, _)| k == key)?;
        Some(node.entries.remove(pos).1)
    }

    pub(crate) fn to_json_map(&self) -> serde_json::Map<String, serde_json::Value> {
        self.entries()
            .into_iter()
            .map(|(k, v)| (k, v.to_json()))
            .collect()
    }
}

fn check_attr_name(name: &str) -> Result<(), ConfigError> {
    if name.contains('.') {
        return Err(ConfigError::Attribute(format!(
            "dot-string '{name}' cannot be used as attribute name, use indexing instead"
        )));
    }
    Ok(())
}

fn hash_value(value: &Value, h: &mut DefaultHasher) -> Result<(), ConfigError> {
    std::mem::discriminant(value).hash(h);
    match value {
        Value::Null => {}
        Value::Bool(b) => b.hash(h),
        Value::Integer(i) => i.hash(h),
        Value::Float(f) => canonical_bits(*f).hash(h),
        Value::String(s) => s.hash(h),
        Value::Tuple(items) => {
            for item in items {
                hash_value(item, h)?;
            }
        }
        Value::Config(c) => c.try_hash()?.hash(h),
        Value::List(_) | Value::Map(_) => {
            return Err(ConfigError::Unhashable(value.type_name().to_string()));
        }
    }
    Ok(())
}

/// Bit pattern of `f` with `-0.0` folded into `0.0` and every NaN into one.
fn canonical_bits(f: f64) -> u64 {
    if f == 0.0 {
        0.0f64.to_bits()
    } else if f.is_nan() {
        f64::NAN.to_bits()
    } else {
        f.to_bits()
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(Policy::PLAIN)
    }
}

impl PartialEq for Config {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || mapping_eq(&self.entries(), &other.entries())
    }
}

impl PartialEq<serde_json::Map<String, serde_json::Value>> for Config {
    fn eq(&self, other: &serde_json::Map<String, serde_json::Value>) -> bool {
        Value::Config(self.clone()) == Value::from(other.clone())
    }
}

impl PartialEq<Config> for serde_json::Map<String, serde_json::Value> {
    fn eq(&self, other: &Config) -> bool {
        other == self
    }
}

impl<'a> IntoIterator for &'a Config {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for Config {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in &entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// `{a: 1, sub: {b: 2}}`
impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (k, v)) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}: {v}")?;
        }
        write!(f, "}}")
    }
}

/// `PlainConfig(a=1, sub=PlainConfig(b="x"))`
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.policy().type_name())?;
        for (i, (k, v)) in self.entries().iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{k}=")?;
            write_repr(f, v)?;
        }
        write!(f, ")")
    }
}

fn write_repr(f: &mut fmt::Formatter<'_>, value: &Value) -> fmt::Result {
    match value {
        Value::String(s) => write!(f, "{s:?}"),
        Value::Config(c) => write!(f, "{c:?}"),
        Value::List(items) => {
            write!(f, "[")?;
            write_items(f, items)?;
            write!(f, "]")
        }
        Value::Tuple(items) => {
            write!(f, "(")?;
            write_items(f, items)?;
            write!(f, ")")
        }
        Value::Map(entries) => {
            write!(f, "{{")?;
            for (i, (k, v)) in entries.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{k:?}: ")?;
                write_repr(f, v)?;
            }
            write!(f, "}}")
        }
        other => write!(f, "{other}"),
    }
}

fn write_items(f: &mut fmt::Formatter<'_>, items: &[Value]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write_repr(f, item)?;
    }
    Ok(())
}
