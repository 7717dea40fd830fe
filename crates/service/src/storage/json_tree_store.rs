use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use common::observability::{
    PERSIST_FAILURES_TOTAL, STORE_DELETES_TOTAL, STORE_MUTATIONS_TOTAL, STORE_READS_TOTAL,
};
use serde::Serialize;
use serde_json::{ser::PrettyFormatter, Map, Value};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::ServiceError;
use crate::storage::merge::deep_merge;
use crate::store::BoxStore;

/// Subdirectory of the host storage root that holds the store file.
pub const STORE_DIR: &str = "storeroom";
pub const STORE_FILE: &str = "db.json";

/// `<storage_root>/storeroom/db.json`
pub fn store_file_path(storage_root: &Path) -> PathBuf {
    storage_root.join(STORE_DIR).join(STORE_FILE)
}

/// JSON file-backed hierarchical store.
///
/// The whole tree is kept in memory and rewritten to disk after every
/// mutation. Mutation and write happen under the same write lock, so a
/// caller that got `Ok` from [`BoxStore::merge`] or [`BoxStore::delete_box`]
/// knows the file reflects it (unless persistence is lenient and the write
/// failed, which is only logged).
pub struct JsonTreeStore {
    inner: RwLock<Map<String, Value>>,
    file_path: PathBuf,
    strict: bool,
}

impl JsonTreeStore {
    /// Open the store under a host storage root. Never fails: an absent or
    /// corrupt file yields an empty store.
    pub async fn open(storage_root: impl AsRef<Path>, strict: bool) -> Arc<Self> {
        Self::from_file(store_file_path(storage_root.as_ref()), strict).await
    }

    pub async fn from_file(file_path: PathBuf, strict: bool) -> Arc<Self> {
        let root = load(&file_path).await;
        debug!(path = %file_path.display(), boxes = root.len(), "store loaded");
        Arc::new(Self { inner: RwLock::new(root), file_path, strict })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    async fn save(&self, root: &Map<String, Value>) -> Result<(), ServiceError> {
        let data = encode(root)?;
        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::storage("create store directory", e))?;
        }
        fs::write(&self.file_path, data)
            .await
            .map_err(|e| ServiceError::storage("write store file", e))?;
        Ok(())
    }

    /// Save and apply the persistence policy to a failure.
    async fn persist(&self, root: &Map<String, Value>) -> Result<(), ServiceError> {
        match self.save(root).await {
            Ok(()) => Ok(()),
            Err(e) => {
                PERSIST_FAILURES_TOTAL.inc();
                debug!(path = %self.file_path.display(), error = %e, "store save failed");
                if self.strict {
                    Err(e)
                } else {
                    Ok(())
                }
            }
        }
    }
}

#[async_trait]
impl BoxStore for JsonTreeStore {
    async fn get(&self, key: Option<&str>) -> Value {
        STORE_READS_TOTAL.inc();
        let root = self.inner.read().await;
        match key {
            None => Value::Object(root.clone()),
            Some(k) => root.get(k).cloned().unwrap_or(Value::Null),
        }
    }

    async fn merge(&self, payload: Map<String, Value>) -> Result<(), ServiceError> {
        let mut root = self.inner.write().await;
        deep_merge(&mut root, &payload);
        STORE_MUTATIONS_TOTAL.inc();
        self.persist(&root).await
    }

    async fn delete_box(&self, key: &str) -> Result<bool, ServiceError> {
        let mut root = self.inner.write().await;
        if root.remove(key).is_none() {
            return Ok(false);
        }
        STORE_DELETES_TOTAL.inc();
        self.persist(&root).await?;
        Ok(true)
    }
}

async fn load(file_path: &Path) -> Map<String, Value> {
    let bytes = match fs::read(file_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!(path = %file_path.display(), error = %e, "store file not readable, starting empty");
            return Map::new();
        }
    };
    match serde_json::from_slice::<Value>(&bytes) {
        Ok(Value::Object(map)) => map,
        Ok(_) => {
            debug!(path = %file_path.display(), "store file root is not an object, starting empty");
            Map::new()
        }
        Err(e) => {
            debug!(path = %file_path.display(), error = %e, "store file is not valid JSON, starting empty");
            Map::new()
        }
    }
}

/// Pretty-print with 4-space indentation.
fn encode(root: &Map<String, Value>) -> Result<Vec<u8>, ServiceError> {
    let mut buf = Vec::new();
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    root.serialize(&mut ser)?;
    Ok(buf)
}
