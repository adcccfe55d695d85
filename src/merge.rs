use crate::config::Config;
use crate::error::ConfigError;
use crate::key::Key;
use crate::policy::{OverwritePolicy, Policy};
use crate::value::Value;

/// Deep-merge `source` on top of `target`, in place.
///
/// If both sides hold a sub-configuration for the same key, recurse.
/// Otherwise `source`'s value wins, or, when duplicates are rejected, the
/// overlap is a conflict reported with its dotted path. Nodes of `source` are
/// moved into `target`, so `source` must be a tree nobody else holds.
pub(crate) fn merge_into(
    target: &Config,
    source: &Config,
    overwrite: OverwritePolicy,
) -> Result<(), ConfigError> {
    merge_at(target, source, overwrite, "")
}

fn merge_at(
    target: &Config,
    source: &Config,
    overwrite: OverwritePolicy,
    prefix: &str,
) -> Result<(), ConfigError> {
    for (key, value) in source.entries() {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match (target.raw_get(&key), value) {
            (Some(Value::Config(base)), Value::Config(overlay)) => {
                merge_at(&base, &overlay, overwrite, &path)?;
            }
            (Some(_), _) if overwrite == OverwritePolicy::RejectDuplicate => {
                return Err(ConfigError::MergeConflict(path));
            }
            (_, value) => {
                tracing::trace!(key = %path, "merge");
                target.raw_insert(key, value);
            }
        }
    }
    Ok(())
}

/// Mode for merging into a configuration with `policy`.
fn merge_mode(policy: Policy) -> OverwritePolicy {
    if policy.rejects_duplicates() {
        OverwritePolicy::RejectDuplicate
    } else {
        OverwritePolicy::Silent
    }
}

/// A fresh configuration with `base`'s policy holding `other`.
///
/// Dotted keys in `other` become nested sub-configurations here, before any
/// merging happens.
fn overlay(base: &Config, other: Vec<(Key, Value)>) -> Result<Config, ConfigError> {
    Config::build(base.policy(), other)
}

pub(crate) fn union(base: &Config, other: Vec<(Key, Value)>) -> Result<Config, ConfigError> {
    let overlay = overlay(base, other)?;
    let result = base.deep_copy();
    tracing::debug!(
        left = base.len(),
        right = overlay.len(),
        "union of configurations"
    );
    merge_into(&result, &overlay, merge_mode(base.policy()))?;
    Ok(result)
}

pub(crate) fn union_assign(base: &Config, other: Vec<(Key, Value)>) -> Result<(), ConfigError> {
    let overlay = overlay(base, other)?;
    merge_into(base, &overlay, merge_mode(base.policy()))
}

pub(crate) fn rev_union(top: &Config, base: Vec<(Key, Value)>) -> Result<Config, ConfigError> {
    let result = overlay(top, base)?;
    merge_into(&result, &top.deep_copy(), merge_mode(top.policy()))?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::error::ConfigError;
    use crate::fixtures::test::{careful, frozen, plain};
    use crate::value::Value;
    use serde_json::json;

    fn table(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn disjoint_keys_merge() {
        let base = plain(json!({"host": "localhost"}));
        let merged = base.union(table(json!({"port": 3000}))).unwrap();
        assert_eq!(merged, table(json!({"host": "localhost", "port": 3000})));
    }

    #[test]
    fn same_scalar_key_overlay_wins() {
        let base = plain(json!({"port": 8080}));
        let merged = base.union(table(json!({"port": 3000}))).unwrap();
        assert_eq!(merged.get("port").unwrap(), Value::from(3000));
    }

    #[test]
    fn nested_configs_recurse() {
        let base = plain(json!({"foo": 1, "baz": {"a": 0.1}}));
        let merged = base.union(table(json!({"baz": {"b": 0.2}}))).unwrap();
        assert_eq!(merged, table(json!({"foo": 1, "baz": {"a": 0.1, "b": 0.2}})));
    }

    #[test]
    fn overlay_scalar_replaces_config() {
        let base = plain(json!({"database": {"url": "x"}}));
        let merged = base.union(table(json!({"database": "flat_string"}))).unwrap();
        assert_eq!(merged.get("database").unwrap(), Value::from("flat_string"));
    }

    #[test]
    fn dotted_overlay_key_replaces_leaf() {
        let base = plain(json!({"sub": 123}));
        let merged = base.union(table(json!({"sub.b": "foo"}))).unwrap();
        assert_eq!(merged, table(json!({"sub": {"b": "foo"}})));
    }

    #[test]
    fn union_leaves_operands_untouched() {
        let a = plain(json!({"sub": {"a": 1}}));
        let b = plain(json!({"sub": {"b": 2}}));
        let merged = a.union(&b).unwrap();
        assert_eq!(a, table(json!({"sub": {"a": 1}})));
        assert_eq!(b, table(json!({"sub": {"b": 2}})));

        let merged_sub = merged.get("sub").unwrap().into_config().unwrap();
        let a_sub = a.get("sub").unwrap().into_config().unwrap();
        assert!(!merged_sub.ptr_eq(&a_sub));
    }

    #[test]
    fn empty_overlay_returns_equal_copy() {
        let base = plain(json!({"port": 8080}));
        let merged = base.union(Config::default()).unwrap();
        assert_eq!(merged, base);
        assert!(!merged.ptr_eq(&base));
    }

    #[test]
    fn empty_left_operand_returns_equal_copy() {
        let cfg = plain(json!({"a": 1, "sub": {"b": 2}}));
        let merged = Config::default().union(&cfg).unwrap();
        assert_eq!(merged, cfg);
        let merged_sub = merged.get("sub").unwrap().into_config().unwrap();
        let cfg_sub = cfg.get("sub").unwrap().into_config().unwrap();
        assert!(!merged_sub.ptr_eq(&cfg_sub));
    }

    #[test]
    fn deeply_nested_three_levels() {
        let base = plain(json!({"a": {"b": {"c": {"val": 1, "other": "keep"}}}}));
        let merged = base
            .union(table(json!({"a": {"b": {"c": {"val": 99}}}})))
            .unwrap();
        assert_eq!(merged.get("a.b.c.val").unwrap(), Value::from(99));
        assert_eq!(merged.get("a.b.c.other").unwrap(), Value::from("keep"));
    }

    #[test]
    fn union_assign_mutates_shared_sub_configs() {
        let mut base = plain(json!({"sub": {"a": 1}}));
        let sub = base.get("sub").unwrap().into_config().unwrap();
        base.union_assign(table(json!({"sub": {"b": 2}}))).unwrap();
        assert_eq!(sub, table(json!({"a": 1, "b": 2})));
    }

    #[test]
    fn union_assign_with_self() {
        let mut base = plain(json!({"a": 1, "sub": {"b": 2}}));
        let same = base.clone();
        base.union_assign(&same).unwrap();
        assert_eq!(base, table(json!({"a": 1, "sub": {"b": 2}})));
    }

    #[test]
    fn rev_union_puts_config_on_top() {
        let cfg = plain(json!({"a": 1, "sub": {"b": 2}}));
        let merged = cfg
            .rev_union(table(json!({"a": 0, "c": 3, "sub": {"d": 4}})))
            .unwrap();
        assert_eq!(
            merged,
            table(json!({"a": 1, "c": 3, "sub": {"b": 2, "d": 4}}))
        );
        let keys: Vec<String> = merged.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a", "c", "sub"]);
    }

    #[test]
    fn multiple_sequential_merges() {
        let merged = plain(json!({"host": "a"}))
            .union(table(json!({"port": 1000})))
            .unwrap()
            .union(table(json!({"host": "c"})))
            .unwrap();
        assert_eq!(merged, table(json!({"host": "c", "port": 1000})));
    }

    // --- careful ---

    #[test]
    fn careful_union_of_disjoint_configs() {
        let a = careful(json!({"x": 1, "sub": {"a": 1}}));
        let b = careful(json!({"y": 2, "sub": {"b": 2}}));
        let merged = a.union(&b).unwrap();
        assert_eq!(merged, table(json!({"x": 1, "y": 2, "sub": {"a": 1, "b": 2}})));
    }

    #[test]
    fn careful_union_rejects_leaf_overlap() {
        let a = careful(json!({"x": 1}));
        let err = a.union(&a).unwrap_err();
        assert!(err.to_string().contains("overwrite"));
    }

    #[test]
    fn careful_union_rejects_nested_overlap_from_dotted_keys() {
        let a = careful(json!({"sub": {"a": 1}}));
        let err = a.union(table(json!({"sub.a": 2}))).unwrap_err();
        assert!(err.is_value_error());
    }

    #[test]
    fn conflict_names_full_path() {
        let a = careful(json!({"x": 1, "sub": {"inner": {"a": 1}}}));
        let err = a
            .union(table(json!({"sub": {"inner": {"a": 2}}})))
            .unwrap_err();
        assert!(matches!(err, ConfigError::MergeConflict(ref k) if k == "sub.inner.a"));
        assert!(err.to_string().contains("'sub.inner.a'"));
    }

    #[test]
    fn careful_union_assign_rejects_overlap() {
        let mut a = careful(json!({"x": 1}));
        assert!(a.union_assign(table(json!({"x": 2}))).is_err());
    }

    #[test]
    fn careful_rev_union_rejects_overlap() {
        let a = careful(json!({"x": 1}));
        assert!(a.rev_union(table(json!({"x": 0}))).is_err());
    }

    // --- frozen ---

    #[test]
    fn frozen_union_assign_rebinds() {
        let original = frozen(json!({"a": 1}));
        let mut handle = original.clone();
        handle.union_assign(table(json!({"b": [1, 2]}))).unwrap();
        assert!(!handle.ptr_eq(&original));
        assert_eq!(original, table(json!({"a": 1})));
        assert!(matches!(handle.get("b").unwrap(), Value::Tuple(_)));
        assert_eq!(handle.policy(), original.policy());
    }

    #[test]
    fn frozen_union_overlay_wins() {
        let a = frozen(json!({"a": 1, "sub": {"x": 1}}));
        let merged = a.union(table(json!({"a": 2, "sub": {"y": 2}}))).unwrap();
        assert_eq!(merged, table(json!({"a": 2, "sub": {"x": 1, "y": 2}})));
        assert!(merged.set("a", 3).is_err());
    }
}
