//! Value normalisation on insertion.
//!
//! Mappings never enter a configuration as-is: they are rebuilt as a fresh
//! sub-configuration carrying the host's policy. Inserting a configuration
//! therefore copies it, which also rules out reference cycles. Read-only
//! policies additionally turn lists into tuples.

use crate::config::Config;
use crate::error::ConfigError;
use crate::policy::{Policy, ValuePolicy};
use crate::value::Value;

/// Normalise `value` for storage in a configuration with `policy`.
pub(crate) fn fix(policy: Policy, value: Value) -> Result<Value, ConfigError> {
    match policy.values {
        ValuePolicy::WrapMappings => wrap(policy, value),
        ValuePolicy::RequireHashable => freeze(policy, value),
    }
}

fn wrap(policy: Policy, value: Value) -> Result<Value, ConfigError> {
    match value.mapping_entries() {
        Ok(entries) => Ok(Value::Config(Config::build(policy, entries)?)),
        Err(value) => Ok(value),
    }
}

fn freeze(policy: Policy, value: Value) -> Result<Value, ConfigError> {
    match value {
        Value::List(items) | Value::Tuple(items) => Ok(Value::Tuple(
            items
                .into_iter()
                .map(|item| freeze(policy, item))
                .collect::<Result<_, _>>()?,
        )),
        other => wrap(policy, other),
    }
}
