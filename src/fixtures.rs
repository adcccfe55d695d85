#[cfg(test)]
pub mod test {
    use serde_json::json;

    use crate::config::Config;
    use crate::policy::Policy;

    fn build(policy: Policy, value: serde_json::Value) -> Config {
        let map = value.as_object().expect("fixture must be a JSON object");
        Config::from_dict(policy, map, None).unwrap()
    }

    pub fn plain(value: serde_json::Value) -> Config {
        build(Policy::PLAIN, value)
    }

    pub fn careful(value: serde_json::Value) -> Config {
        build(Policy::CAREFUL, value)
    }

    pub fn frozen(value: serde_json::Value) -> Config {
        build(Policy::FROZEN, value)
    }

    /// A small plain configuration with one level of nesting.
    pub fn sample() -> Config {
        plain(json!({
            "foo": 1,
            "bar": "text",
            "sub": {"a": 0.5, "b": [1, 2]}
        }))
    }

    #[test]
    fn sample_has_nested_config() {
        let config = sample();
        assert_eq!(config.len(), 3);
        assert!(config.get("sub").unwrap().as_config().is_some());
    }
}
