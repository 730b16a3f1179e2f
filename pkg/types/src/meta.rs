use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

// --- Object metadata ---

/// Subset of Kubernetes `ObjectMeta` carried by produced objects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub owner_references: Vec<OwnerReference>,
}

// --- Owner reference ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    /// Empty when the owner has not been persisted yet.
    #[serde(default)]
    pub uid: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_owner_deletion: Option<bool>,
}

// --- Label selector ---

/// Equality-based label query. Only `matchLabels` is supported.
///
/// A selector whose `matchLabels` is present but empty matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelector {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_labels: Option<BTreeMap<String, String>>,
}

impl LabelSelector {
    pub fn from_labels<I, K, V>(labels: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            match_labels: Some(
                labels
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    /// Whether this selector is in use at all.
    pub fn is_set(&self) -> bool {
        self.match_labels.is_some()
    }

    /// Check whether every required label is present with the same value.
    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        match &self.match_labels {
            Some(required) => required
                .iter()
                .all(|(key, value)| labels.get(key) == Some(value)),
            None => false,
        }
    }
}

impl std::fmt::Display for LabelSelector {
    /// Renders as `k1=v1,k2=v2` with keys sorted.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let Some(labels) = &self.match_labels else {
            return Ok(());
        };
        let rendered: Vec<String> = labels.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        write!(f, "{}", rendered.join(","))
    }
}

impl std::str::FromStr for LabelSelector {
    type Err = anyhow::Error;

    /// Parses `k1=v1,k2=v2`. An empty string selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut labels = BTreeMap::new();
        for pair in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let Some((key, value)) = pair.split_once('=') else {
                anyhow::bail!("invalid label selector term '{}', expected key=value", pair);
            };
            let key = key.trim();
            if key.is_empty() {
                anyhow::bail!("invalid label selector term '{}', empty key", pair);
            }
            labels.insert(key.to_string(), value.trim().to_string());
        }
        Ok(Self {
            match_labels: Some(labels),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn selector_matches_subset() {
        let selector = LabelSelector::from_labels([("env", "prod")]);
        assert!(selector.matches(&labels(&[("env", "prod"), ("team", "a")])));
        assert!(!selector.matches(&labels(&[("env", "dev")])));
        assert!(!selector.matches(&labels(&[])));
    }

    #[test]
    fn empty_match_labels_matches_everything() {
        let selector = LabelSelector {
            match_labels: Some(BTreeMap::new()),
        };
        assert!(selector.is_set());
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn unset_selector_matches_nothing() {
        let selector = LabelSelector::default();
        assert!(!selector.is_set());
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn selector_display_is_sorted() {
        let selector = LabelSelector::from_labels([("team", "a"), ("env", "prod")]);
        assert_eq!(selector.to_string(), "env=prod,team=a");
        assert_eq!(LabelSelector::default().to_string(), "");
    }

    #[test]
    fn selector_parses_terms() {
        let selector: LabelSelector = "env=prod, team=a".parse().unwrap();
        assert_eq!(selector, LabelSelector::from_labels([("env", "prod"), ("team", "a")]));

        let all: LabelSelector = "".parse().unwrap();
        assert_eq!(all.match_labels, Some(BTreeMap::new()));

        assert!("env".parse::<LabelSelector>().is_err());
        assert!("=prod".parse::<LabelSelector>().is_err());
    }

    #[test]
    fn object_meta_omits_empty_fields() {
        let meta = ObjectMeta {
            name: "sa1".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_value(&meta).unwrap();
        assert_eq!(json, serde_json::json!({ "name": "sa1" }));
    }
}
