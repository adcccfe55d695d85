//! Key resolution: walk a [`Key`] down to the configuration that holds its
//! last segment.
//!
//! Every access path (indexing, dotted strings, key paths, attribute access,
//! overwrite) goes through here, so they all agree on what a key means.

use crate::config::Config;
use crate::error::ConfigError;
use crate::key::Key;
use crate::validate::validate_key;
use crate::value::Value;

/// The configuration holding a key's last segment, and that segment.
#[derive(Debug)]
pub(crate) struct Resolved {
    pub host: Config,
    pub leaf: String,
}

/// Walk every segment of `key` but the last.
///
/// Missing intermediate segments are an error naming that segment.
pub(crate) fn resolve(root: &Config, key: &Key) -> Result<Resolved, ConfigError> {
    walk(root, key, false)
}

/// Walk every segment of `key` but the last, creating empty sub-configurations
/// (with the parent's policy) for missing segments.
pub(crate) fn resolve_or_create(root: &Config, key: &Key) -> Result<Resolved, ConfigError> {
    walk(root, key, true)
}

fn walk(root: &Config, key: &Key, create: bool) -> Result<Resolved, ConfigError> {
    let segments = key.segments()?;
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(ConfigError::invalid_key(&key.to_string(), "empty tuple"));
    };

    let mut host = root.clone();
    for segment in parents {
        let next = match host.raw_get(segment) {
            Some(Value::Config(sub)) => sub,
            Some(_) => return Err(ConfigError::NotAConfig(segment.to_string())),
            None if create => {
                let policy = host.policy();
                validate_key(segment, policy.keys)?;
                let sub = Config::new(policy);
                host.raw_insert(segment.to_string(), Value::Config(sub.clone()));
                sub
            }
            None => return Err(ConfigError::KeyNotFound(segment.to_string())),
        };
        host = next;
    }

    Ok(Resolved {
        host,
        leaf: leaf.to_string(),
    })
}
