//! Loading and saving configurations as files.
//!
//! The format is chosen from the file extension:
//!
//! | Extension | Format |
//! |-----------|--------|
//! | `.json` | JSON |
//! | `.toml` | TOML |
//! | `.yaml`, `.yml` | YAML (feature `yaml`) |
//!
//! Decoded documents must be mappings at the top level. Their keys go through
//! the normal insertion path, so dotted keys become nested sub-configurations
//! and the configuration's policy validates every key. TOML has no null, so
//! encoding a configuration that holds one anywhere (an entry or a list item)
//! as TOML fails and names the path to it.
//!
//! Loading and saving optionally take [`KeyMods`], applied to every key of
//! the document: after decoding on load, before encoding on save.

use std::path::Path;

use serde::ser::Error as _;

use crate::config::Config;
use crate::error::ConfigError;
use crate::policy::Policy;
use crate::rewrite::KeyMods;
use crate::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
    #[cfg(feature = "yaml")]
    Yaml,
}

impl Format {
    /// Pick the format from `path`'s extension.
    pub fn from_path(path: &Path) -> Result<Format, ConfigError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        match ext.as_str() {
            "json" => Ok(Format::Json),
            "toml" => Ok(Format::Toml),
            #[cfg(feature = "yaml")]
            "yaml" | "yml" => Ok(Format::Yaml),
            _ => Err(ConfigError::UnknownFormat(ext)),
        }
    }
}

/// Decode `content` into a configuration with `policy`, rewriting keys with
/// `key_mods` first.
pub fn read_str(
    content: &str,
    format: Format,
    policy: Policy,
    key_mods: Option<&KeyMods>,
) -> Result<Config, ConfigError> {
    let value: Value = match format {
        Format::Json => serde_json::from_str(content)?,
        Format::Toml => toml::from_str(content)?,
        #[cfg(feature = "yaml")]
        Format::Yaml => serde_yaml::from_str(content)?,
    };
    let value = match key_mods {
        Some(mods) => mods.rewrite_value(value),
        None => value,
    };
    match value {
        // An empty YAML document decodes as null.
        Value::Null => Ok(Config::new(policy)),
        map @ Value::Map(_) => Config::build(policy, map.mapping_entries().unwrap_or_default()),
        other => Err(ConfigError::NotAMapping(other.type_name().to_string())),
    }
}

/// Encode `config` in `format`, rewriting keys with `key_mods` first.
pub fn write_string(
    config: &Config,
    format: Format,
    key_mods: Option<&KeyMods>,
) -> Result<String, ConfigError> {
    let tree = match key_mods {
        Some(mods) => mods.rewrite_value(Value::Config(config.clone())),
        None => Value::Config(config.clone()),
    };
    let out = match format {
        Format::Json => {
            let mut s = serde_json::to_string_pretty(&tree)?;
            s.push('\n');
            s
        }
        Format::Toml => {
            if let Some(path) = find_null(&tree, "") {
                return Err(ConfigError::TomlSer(toml::ser::Error::custom(format!(
                    "null value at '{path}' has no TOML representation"
                ))));
            }
            toml::to_string(&tree)?
        }
        #[cfg(feature = "yaml")]
        Format::Yaml => serde_yaml::to_string(&tree)?,
    };
    Ok(out)
}

/// Path of the first null in `value`, e.g. `sub.list[1]`.
fn find_null(value: &Value, path: &str) -> Option<String> {
    let child = |key: &str| {
        if path.is_empty() {
            key.to_string()
        } else {
            format!("{path}.{key}")
        }
    };
    match value {
        Value::Null => Some(path.to_string()),
        Value::List(items) | Value::Tuple(items) => items
            .iter()
            .enumerate()
            .find_map(|(i, item)| find_null(item, &format!("{path}[{i}]"))),
        Value::Map(entries) => entries
            .iter()
            .find_map(|(k, v)| find_null(v, &child(k.as_str()))),
        Value::Config(config) => config
            .entries()
            .iter()
            .find_map(|(k, v)| find_null(v, &child(k.as_str()))),
        _ => None,
    }
}

/// Read the file at `path` into a configuration with `policy`.
///
/// `key_mods` rewrites the document's keys before they are inserted, e.g.
/// `{" ": "_"}` to make `"learning rate"` reachable as `learning_rate`.
pub fn load_config(
    path: &Path,
    policy: Policy,
    key_mods: Option<&KeyMods>,
) -> Result<Config, ConfigError> {
    let format = Format::from_path(path)?;
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    tracing::debug!(path = %path.display(), ?format, "loading configuration");
    read_str(&content, format, policy, key_mods)
}

/// Write `config` to `path`, replacing any existing file. `key_mods`
/// rewrites the written keys.
pub fn save_config(
    config: &Config,
    path: &Path,
    key_mods: Option<&KeyMods>,
) -> Result<(), ConfigError> {
    let format = Format::from_path(path)?;
    let content = write_string(config, format, key_mods)?;
    tracing::debug!(path = %path.display(), ?format, "saving configuration");
    std::fs::write(path, content).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
