//! Namespace directory: resolves a label selector to the ordered set of
//! matching namespace names.
//!
//! The resolver only talks to the [`NamespaceDirectory`] trait. Two backends
//! are provided: a fixed in-memory list and the SlateDB state store.

use async_trait::async_trait;
use pkg_constants::state::NAMESPACE_PREFIX;
use pkg_types::meta::LabelSelector;
use pkg_types::namespace::Namespace;
use thiserror::Error;
use tracing::debug;

use crate::client::StateStore;

/// Failure to answer a namespace query.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The backing store could not be read.
    #[error("namespace store unavailable: {0}")]
    Store(String),

    /// A stored namespace record could not be decoded.
    #[error("invalid namespace record at {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Lookup of namespaces by label selector.
#[async_trait]
pub trait NamespaceDirectory: Send + Sync {
    /// Names of all namespaces matching `selector`, sorted and without duplicates.
    async fn list(&self, selector: &LabelSelector) -> Result<Vec<String>, DirectoryError>;
}

fn matching_names<'a, I>(namespaces: I, selector: &LabelSelector) -> Vec<String>
where
    I: IntoIterator<Item = &'a Namespace>,
{
    let mut names: Vec<String> = namespaces
        .into_iter()
        .filter(|ns| selector.matches(&ns.labels))
        .map(|ns| ns.name.clone())
        .collect();
    names.sort();
    names.dedup();
    names
}

// --- In-memory directory ---

/// Directory over a fixed namespace list.
#[derive(Debug, Clone, Default)]
pub struct StaticNamespaceDirectory {
    namespaces: Vec<Namespace>,
}

impl StaticNamespaceDirectory {
    pub fn new(namespaces: Vec<Namespace>) -> Self {
        Self { namespaces }
    }
}

#[async_trait]
impl NamespaceDirectory for StaticNamespaceDirectory {
    async fn list(&self, selector: &LabelSelector) -> Result<Vec<String>, DirectoryError> {
        let names = matching_names(&self.namespaces, selector);
        debug!("selector '{}' matched {} namespace(s)", selector, names.len());
        Ok(names)
    }
}

// --- Store-backed directory ---

/// Directory reading JSON namespace records under `/registry/namespaces/`.
#[derive(Clone)]
pub struct StoreNamespaceDirectory {
    store: StateStore,
}

impl StoreNamespaceDirectory {
    pub fn new(store: StateStore) -> Self {
        Self { store }
    }

    /// Write (or overwrite) a namespace record.
    pub async fn register(&self, namespace: &Namespace) -> anyhow::Result<()> {
        let key = format!("{}{}", NAMESPACE_PREFIX, namespace.name);
        let data = serde_json::to_vec(namespace)?;
        self.store.put(&key, &data).await
    }

    async fn load_all(&self) -> Result<Vec<Namespace>, DirectoryError> {
        let entries = self
            .store
            .list_prefix(NAMESPACE_PREFIX)
            .await
            .map_err(|e| DirectoryError::Store(format!("{:#}", e)))?;

        entries
            .into_iter()
            .map(|(key, value)| {
                serde_json::from_slice::<Namespace>(&value)
                    .map_err(|source| DirectoryError::Decode { key, source })
            })
            .collect()
    }
}

#[async_trait]
impl NamespaceDirectory for StoreNamespaceDirectory {
    async fn list(&self, selector: &LabelSelector) -> Result<Vec<String>, DirectoryError> {
        let namespaces = self.load_all().await?;
        let names = matching_names(&namespaces, selector);
        debug!(
            "selector '{}' matched {}/{} stored namespace(s)",
            selector,
            names.len(),
            namespaces.len()
        );
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn fixture() -> StaticNamespaceDirectory {
        StaticNamespaceDirectory::new(vec![
            Namespace::new("ns2").with_label("env", "prod"),
            Namespace::new("ns1").with_label("env", "prod").with_label("team", "a"),
            Namespace::new("dev").with_label("env", "dev"),
            Namespace::new("bare"),
        ])
    }

    #[tokio::test]
    async fn test_static_list_is_sorted() {
        let dir = fixture();
        let names = dir
            .list(&LabelSelector::from_labels([("env", "prod")]))
            .await
            .unwrap();
        assert_eq!(names, vec!["ns1".to_string(), "ns2".to_string()]);
    }

    #[tokio::test]
    async fn test_static_requires_all_labels() {
        let dir = fixture();
        let names = dir
            .list(&LabelSelector::from_labels([("env", "prod"), ("team", "a")]))
            .await
            .unwrap();
        assert_eq!(names, vec!["ns1".to_string()]);
    }

    #[tokio::test]
    async fn test_static_no_match() {
        let dir = fixture();
        let names = dir
            .list(&LabelSelector::from_labels([("env", "staging")]))
            .await
            .unwrap();
        assert!(names.is_empty());
    }

    #[tokio::test]
    async fn test_static_empty_selector_matches_all() {
        let dir = fixture();
        let selector = LabelSelector {
            match_labels: Some(BTreeMap::new()),
        };
        let names = dir.list(&selector).await.unwrap();
        assert_eq!(names.len(), 4);
        assert_eq!(names[0], "bare");
    }

    #[tokio::test]
    async fn test_store_directory_roundtrip() {
        let path = std::env::temp_dir().join(format!("rbac-manager-test-{}", uuid::Uuid::new_v4()));
        let path = path.to_string_lossy().to_string();
        let store = StateStore::new(&path).await.unwrap();
        let dir = StoreNamespaceDirectory::new(store.clone());

        dir.register(&Namespace::new("team-b").with_label("env", "prod"))
            .await
            .unwrap();
        dir.register(&Namespace::new("team-a").with_label("env", "prod"))
            .await
            .unwrap();
        dir.register(&Namespace::new("sandbox").with_label("env", "dev"))
            .await
            .unwrap();

        let names = dir
            .list(&LabelSelector::from_labels([("env", "prod")]))
            .await
            .unwrap();
        assert_eq!(names, vec!["team-a".to_string(), "team-b".to_string()]);

        store.close().await.unwrap();
        let _ = std::fs::remove_dir_all(&path);
    }

    #[tokio::test]
    async fn test_store_directory_rejects_corrupt_record() {
        let path = std::env::temp_dir().join(format!("rbac-manager-test-{}", uuid::Uuid::new_v4()));
        let path = path.to_string_lossy().to_string();
        let store = StateStore::new(&path).await.unwrap();
        store
            .put(&format!("{}broken", NAMESPACE_PREFIX), b"not json")
            .await
            .unwrap();

        let dir = StoreNamespaceDirectory::new(store.clone());
        let err = dir
            .list(&LabelSelector::from_labels([("env", "prod")]))
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::Decode { ref key, .. } if key.ends_with("broken")));

        store.close().await.unwrap();
        let _ = std::fs::remove_dir_all(&path);
    }
}
