use slatedb::Db;
use slatedb::object_store::local::LocalFileSystem;
use slatedb::object_store::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Key-value store backed by SlateDB on a local filesystem.
///
/// rbac-manager only keeps namespace records here (see
/// [`crate::namespaces::StoreNamespaceDirectory`]); produced RBAC objects are
/// never persisted.
#[derive(Clone)]
pub struct StateStore {
    db: Db,
}

impl StateStore {
    /// Open (or create) the store rooted at `data_dir`.
    pub async fn new(data_dir: &str) -> anyhow::Result<Self> {
        info!("Opening namespace state store at {}", data_dir);

        std::fs::create_dir_all(data_dir)
            .map_err(|e| anyhow::anyhow!("Failed to create data directory {}: {}", data_dir, e))?;

        let object_store = Arc::new(
            LocalFileSystem::new_with_prefix(data_dir)
                .map_err(|e| anyhow::anyhow!("Failed to create local object store: {}", e))?,
        );
        let db = Db::open(Path::from("/"), object_store)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to open SlateDB at {}: {}", data_dir, e))?;
        Ok(Self { db })
    }

    pub async fn put(&self, key: &str, value: &[u8]) -> anyhow::Result<()> {
        debug!("put {} ({} bytes)", key, value.len());
        self.db
            .put(key.as_bytes(), value)
            .await
            .map(|_| ())
            .map_err(|e| anyhow::anyhow!("SlateDB put {} failed: {}", key, e))
    }

    /// All `(key, raw_bytes)` pairs under `prefix`, in key order.
    pub async fn list_prefix(&self, prefix: &str) -> anyhow::Result<Vec<(String, Vec<u8>)>> {
        let mut iter = self
            .db
            .scan_prefix(prefix.as_bytes())
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan of {} failed: {}", prefix, e))?;

        let mut entries = Vec::new();
        while let Some(kv) = iter
            .next()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB scan of {} failed: {}", prefix, e))?
        {
            entries.push((String::from_utf8_lossy(&kv.key).into_owned(), kv.value.to_vec()));
        }
        debug!("scanned {} key(s) under {}", entries.len(), prefix);
        Ok(entries)
    }

    /// Flush and close the store.
    pub async fn close(self) -> anyhow::Result<()> {
        info!("Closing namespace state store");
        self.db
            .close()
            .await
            .map_err(|e| anyhow::anyhow!("SlateDB close failed: {}", e))
    }
}
