//! Key validation: decide whether a string may serve as a configuration key.
//!
//! Three rules are checked in order, with [`KeyPolicy`] deciding which of them
//! reject and which merely warn:
//!
//! 1. The key starts with a letter.
//! 2. The key is an identifier (letters, digits, underscores) and not a keyword.
//! 3. The key does not shadow a name of the configuration interface.
//!
//! Keys that fail rule 2 under a lenient policy are still stored; they stay
//! reachable through paths and indexing but not through attribute-style access.

use crate::error::ConfigError;
use crate::policy::KeyPolicy;

/// Names that make up the public interface of [`Config`](crate::Config).
///
/// Sorted, so it can be binary-searched and merged into attribute listings.
pub const RESERVED_NAMES: &[&str] = &[
    "attr_names",
    "contains",
    "deep_copy",
    "del_attr",
    "delete",
    "from_dict",
    "get",
    "get_attr",
    "is_empty",
    "items",
    "iter",
    "keys",
    "len",
    "overwrite",
    "overwrite_all",
    "policy",
    "ptr_eq",
    "rev_union",
    "set",
    "set_attr",
    "shallow_copy",
    "to_dict",
    "try_hash",
    "union",
    "union_assign",
    "update",
    "values",
];

const KEYWORDS: &[&str] = &[
    "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
    "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
    "mut", "pub", "ref", "return", "self", "static", "struct", "super", "trait", "true", "type",
    "unsafe", "use", "where", "while",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED_NAMES.binary_search(&name).is_ok()
}

/// Whether `key` is usable as a bare attribute name.
pub fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || c == '_') && !KEYWORDS.contains(&key)
}

/// Validate `key` under `policy`.
///
/// Returns `Ok(true)` when the key passes every rule and `Ok(false)` when it
/// was accepted with a warning.
pub fn validate_key(key: &str, policy: KeyPolicy) -> Result<bool, ConfigError> {
    let starts_with_letter = key.chars().next().is_some_and(char::is_alphabetic);
    match policy {
        KeyPolicy::Permissive if key.is_empty() => {
            return Err(ConfigError::invalid_key(key, "does not start with a letter"));
        }
        KeyPolicy::Strict | KeyPolicy::Careful if !starts_with_letter => {
            return Err(ConfigError::invalid_key(key, "does not start with a letter"));
        }
        _ => {}
    }

    let identifier = is_identifier(key);
    if !identifier && policy == KeyPolicy::Strict {
        return Err(ConfigError::invalid_key(
            key,
            "contains symbols that are not allowed",
        ));
    }

    if policy != KeyPolicy::Permissive && is_reserved(key) {
        return Err(ConfigError::invalid_key(
            key,
            "is not allowed as key, it would break the interface of this object",
        ));
    }

    if !identifier {
        tracing::warn!(
            key,
            "key is not a valid identifier and can only be accessed by indexing"
        );
    }
    Ok(identifier)
}
