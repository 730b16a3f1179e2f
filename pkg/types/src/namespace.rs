use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A namespace record as seen by the namespace directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Namespace {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    #[serde(default = "Utc::now", alias = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl Namespace {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            labels: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    pub fn with_label(mut self, key: &str, value: &str) -> Self {
        self.labels.insert(key.to_string(), value.to_string());
        self
    }
}

/// Load a YAML list of namespaces, e.g.
/// ```yaml
/// - name: ns1
///   labels:
///     env: prod
/// - name: ns2
/// ```
pub fn load_namespaces_file(path: &str) -> anyhow::Result<Vec<Namespace>> {
    let content = std::fs::read_to_string(path)?;
    let namespaces: Vec<Namespace> = serde_yaml::from_str(&content)?;
    Ok(namespaces)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn created_at_defaults_when_absent() {
        let parsed: Vec<Namespace> =
            serde_yaml::from_str("- name: ns1\n  labels:\n    env: prod\n- name: ns2\n").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].labels.get("env").map(String::as_str), Some("prod"));
        assert!(parsed[1].labels.is_empty());
    }
}
