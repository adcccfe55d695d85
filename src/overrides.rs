//! `KEY=VALUE` assignments, typically from the command line.
//!
//! Values are read as JSON literals when they parse as one (`3`, `true`,
//! `[1, 2]`, `{"a": 1}`) and kept as plain strings otherwise, so
//! `model.name=resnet` needs no quoting. Keys may be dotted paths.

use crate::config::Config;
use crate::error::ConfigError;
use crate::key::Key;
use crate::value::Value;

/// Split `KEY=VALUE` at the first `=` and decode the value.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), ConfigError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(ConfigError::InvalidOverride(raw.to_string()));
    }
    let value = match serde_json::from_str::<serde_json::Value>(value) {
        Ok(json) => Value::from(json),
        Err(_) => Value::String(value.to_string()),
    };
    Ok((key.to_string(), value))
}

/// Overwrite `config` with each assignment in order.
///
/// Overrides replace values regardless of the duplicate policy; the last
/// assignment to a key wins.
pub fn apply_overrides<S: AsRef<str>>(config: &Config, raw: &[S]) -> Result<(), ConfigError> {
    let pairs = raw
        .iter()
        .map(|s| parse_assignment(s.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;
    for (key, value) in &pairs {
        tracing::debug!(key = %key, value = %value, "applying override");
    }
    config.overwrite_all(
        pairs
            .into_iter()
            .map(|(k, v)| (Key::from(k), v))
            .collect::<Vec<_>>(),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::careful;
    use serde_json::json;
    use tracing_test::traced_test;

    #[test]
    fn flat_key_with_string() {
        let (k, v) = parse_assignment("host=0.0.0.0").unwrap();
        assert_eq!(k, "host");
        assert_eq!(v, Value::from("0.0.0.0"));
    }

    #[test]
    fn json_literals_are_decoded() {
        assert_eq!(parse_assignment("port=3000").unwrap().1, Value::from(3000));
        assert_eq!(parse_assignment("debug=true").unwrap().1, Value::from(true));
        assert_eq!(parse_assignment("lr=0.1").unwrap().1, Value::from(0.1));
        assert_eq!(
            parse_assignment("dims=[1, 2]").unwrap().1,
            Value::from(json!([1, 2]))
        );
    }

    #[test]
    fn value_may_contain_equals() {
        let (k, v) = parse_assignment("db.url=pg://u:p@h/db?x=1").unwrap();
        assert_eq!(k, "db.url");
        assert_eq!(v, Value::from("pg://u:p@h/db?x=1"));
    }

    #[test]
    fn empty_value_is_empty_string() {
        assert_eq!(parse_assignment("name=").unwrap().1, Value::from(""));
    }

    #[test]
    fn missing_equals_rejected() {
        let err = parse_assignment("no_equals").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride(_)));
    }

    #[test]
    fn empty_key_rejected() {
        assert!(parse_assignment("=3").is_err());
    }

    #[traced_test]
    #[test]
    fn overrides_bypass_duplicate_protection() {
        let config = careful(json!({"model": {"depth": 18}, "lr": 0.1}));
        apply_overrides(&config, &["model.depth=50", "lr=0.01", "seed=7"]).unwrap();
        assert_eq!(config.get("model.depth").unwrap(), Value::from(50));
        assert_eq!(config.get("lr").unwrap(), Value::from(0.01));
        assert_eq!(config.get("seed").unwrap(), Value::from(7));
        assert!(logs_contain("applying override"));
    }

    #[test]
    fn last_assignment_wins() {
        let config = careful(json!({}));
        apply_overrides(&config, &["port=3000", "port=5000"]).unwrap();
        assert_eq!(config.get("port").unwrap(), Value::from(5000));
    }

    #[test]
    fn bad_assignment_leaves_config_untouched() {
        let config = careful(json!({"a": 1}));
        assert!(apply_overrides(&config, &["a=2", "oops"]).is_err());
        assert_eq!(config.get("a").unwrap(), Value::from(1));
    }
}
