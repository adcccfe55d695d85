use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("'{key}' {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("Key not found: '{0}'")]
    KeyNotFound(String),

    #[error("Key '{0}' does not refer to a sub-configuration")]
    NotAConfig(String),

    #[error("index must be string or tuple of strings, not '{0}'")]
    InvalidKeyType(String),

    #[error("unhashable type: '{0}'")]
    Unhashable(String),

    #[error("key '{0}' already defined, use 'overwrite' methods instead")]
    AlreadyDefined(String),

    #[error("conflicting values for key '{0}' in union, use 'overwrite' methods instead")]
    MergeConflict(String),

    #[error("'{0}' is read-only")]
    ReadOnly(String),

    #[error("object has no attribute '{0}'")]
    NoAttribute(String),

    #[error("{0}")]
    Attribute(String),

    #[error("Invalid key modifier: {0}")]
    InvalidKeyMod(String),

    #[error("Invalid override '{0}': expected KEY=VALUE")]
    InvalidOverride(String),

    #[error("Unknown config file extension: '{0}'")]
    UnknownFormat(String),

    #[error("Top-level document is a {0}, expected a mapping")]
    NotAMapping(String),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid TOML: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Failed to encode TOML: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[cfg(feature = "yaml")]
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl ConfigError {
    /// Missing keys, including paths running through a leaf value.
    pub fn is_key_error(&self) -> bool {
        matches!(self, Self::KeyNotFound(_) | Self::NotAConfig(_))
    }

    /// Unsupported key types and values that cannot be made hashable.
    pub fn is_type_error(&self) -> bool {
        matches!(self, Self::InvalidKeyType(_) | Self::Unhashable(_))
    }

    /// Rejected keys, duplicate assignments and conflicting unions.
    pub fn is_value_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidKey { .. } | Self::AlreadyDefined(_) | Self::MergeConflict(_)
        )
    }

    /// Errors raised through attribute-style access or on read-only configs.
    pub fn is_attribute_error(&self) -> bool {
        matches!(
            self,
            Self::ReadOnly(_) | Self::NoAttribute(_) | Self::Attribute(_)
        )
    }

    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_key_formats_correctly() {
        let err = ConfigError::invalid_key("1abc", "does not start with a letter");
        assert_eq!(err.to_string(), "'1abc' does not start with a letter");
        assert!(err.is_value_error());
    }

    #[test]
    fn already_defined_points_at_overwrite() {
        let err = ConfigError::AlreadyDefined("lr".into());
        let msg = err.to_string();
        assert!(msg.contains("lr"));
        assert!(msg.contains("overwrite"));
    }

    #[test]
    fn key_not_found_names_segment() {
        let err = ConfigError::KeyNotFound("sub".into());
        assert!(err.to_string().contains("'sub'"));
        assert!(err.is_key_error());
        assert!(!err.is_type_error());
    }

    #[test]
    fn invalid_key_type_mentions_string() {
        let err = ConfigError::InvalidKeyType("int".into());
        assert!(err.to_string().contains("string"));
        assert!(err.is_type_error());
    }

    #[test]
    fn read_only_is_attribute_error() {
        let err = ConfigError::ReadOnly("a".into());
        assert_eq!(err.to_string(), "'a' is read-only");
        assert!(err.is_attribute_error());
    }
}
