//! The shared variable mapping and the arguments passed to every loader.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

/// Template variables accumulated across loaders. Later writes shadow
/// earlier ones.
pub type Variables = Map<String, Value>;

/// Arguments handed unchanged to every loader during one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraArgs {
    /// Device hostname being rendered
    pub hostname: Option<String>,
    /// `key=value` pairs supplied by the user
    pub values: BTreeMap<String, String>,
}

impl ExtraArgs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the hostname.
    pub fn with_hostname(mut self, hostname: impl Into<String>) -> Self {
        self.hostname = Some(hostname.into());
        self
    }

    /// Add a `key=value` pair.
    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    /// Parse a `key=value` expression. Returns `None` if there is no `=`
    /// or the key is empty.
    pub fn parse_pair(expr: &str) -> Option<(String, String)> {
        let (key, value) = expr.split_once('=')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key.to_string(), value.to_string()))
    }

    /// Get a user-supplied value.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(|s| s.as_str())
    }
}

/// Copy every top-level key of `source` into `vars`, overwriting.
pub fn merge_into(vars: &mut Variables, source: &Variables) {
    for (key, value) in source {
        vars.insert(key.clone(), value.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            ExtraArgs::parse_pair("vlan=100"),
            Some(("vlan".to_string(), "100".to_string()))
        );
        assert_eq!(
            ExtraArgs::parse_pair("banner=a=b"),
            Some(("banner".to_string(), "a=b".to_string()))
        );
        assert_eq!(ExtraArgs::parse_pair("novalue"), None);
        assert_eq!(ExtraArgs::parse_pair("=x"), None);
    }

    #[test]
    fn test_merge_overwrites() {
        let mut vars = Variables::new();
        vars.insert("a".into(), json!(1));
        vars.insert("b".into(), json!(2));

        let mut source = Variables::new();
        source.insert("b".into(), json!({ "nested": true }));

        merge_into(&mut vars, &source);
        assert_eq!(vars["a"], json!(1));
        assert_eq!(vars["b"], json!({ "nested": true }));
    }
}
