//! Local durable cache: the whole state as one JSON blob on disk.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use domain::seed;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::{Collection, Collections, PersistenceAdapter, Record, Result};

/// Namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "inventory-storage";

/// Format version written into every blob.
const BLOB_VERSION: u32 = 1;

/// Adapter writing all collections to `<dir>/<namespace>.json`.
///
/// Every save or remove rewrites the whole blob. On load, each collection is
/// validated on its own: a collection that is missing or not a list is
/// replaced by its seed data while the others are kept. Within a list,
/// malformed records are skipped and the rest are loaded.
pub struct LocalFileAdapter {
    path: PathBuf,
    mirror: Mutex<Option<Collections>>,
}

impl LocalFileAdapter {
    /// Creates an adapter storing under `dir` with the given namespace.
    pub fn new(dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            path: dir.as_ref().join(format!("{namespace}.json")),
            mirror: Mutex::new(None),
        }
    }

    /// Returns the path of the blob file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_blob(&self) -> Result<Collections> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(decode_blob(&bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no stored data, using seed");
                Ok(Collections::seeded())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write_blob(&self, collections: &Collections) -> Result<()> {
        let blob = serde_json::json!({
            "version": BLOB_VERSION,
            "products": collections.products,
            "customers": collections.customers,
            "sales": collections.sales,
        });
        let bytes = serde_json::to_vec_pretty(&blob)?;

        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Applies `change` to the mirrored state and rewrites the blob.
    async fn modify(&self, change: impl FnOnce(&mut Collections) + Send) -> Result<()> {
        let mut mirror = self.mirror.lock().await;
        if mirror.is_none() {
            *mirror = Some(self.read_blob().await?);
        }
        let collections = mirror.get_or_insert_with(Collections::seeded);

        let mut next = collections.clone();
        change(&mut next);
        self.write_blob(&next).await?;
        *collections = next;
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for LocalFileAdapter {
    fn name(&self) -> &'static str {
        "local-file"
    }

    #[tracing::instrument(skip(self), fields(path = %self.path.display()))]
    async fn load(&self) -> Result<Collections> {
        let collections = self.read_blob().await?;
        *self.mirror.lock().await = Some(collections.clone());
        Ok(collections)
    }

    #[tracing::instrument(skip(self, record), fields(collection = %record.collection(), id = record.id()))]
    async fn save(&self, record: &Record) -> Result<()> {
        let record = record.clone();
        self.modify(move |collections| collections.upsert(record)).await
    }

    #[tracing::instrument(skip(self))]
    async fn remove(&self, collection: Collection, id: &str) -> Result<()> {
        self.modify(|collections| {
            collections.remove(collection, id);
        })
        .await
    }
}

/// Decodes a stored blob, validating each collection independently.
///
/// Blobs wrapped in a `{"state": {...}}` envelope are accepted too.
pub fn decode_blob(bytes: &[u8]) -> Collections {
    let blob: Value = match serde_json::from_slice(bytes) {
        Ok(blob) => blob,
        Err(e) => {
            tracing::warn!(error = %e, "stored data is not valid JSON, using seed");
            return Collections::seeded();
        }
    };
    let root = blob
        .get("state")
        .filter(|state| state.is_object())
        .unwrap_or(&blob);

    Collections {
        products: decode_collection(root, Collection::Products, seed::default_products),
        customers: decode_collection(root, Collection::Customers, seed::default_customers),
        sales: decode_collection(root, Collection::Sales, seed::default_sales),
    }
}

fn decode_collection<T: DeserializeOwned>(
    root: &Value,
    collection: Collection,
    seed: fn() -> Vec<T>,
) -> Vec<T> {
    match root.get(collection.as_str()) {
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| match T::deserialize(item) {
                Ok(record) => Some(record),
                Err(e) => {
                    tracing::warn!(%collection, index, error = %e, "skipping malformed stored record");
                    None
                }
            })
            .collect(),
        Some(_) => {
            tracing::warn!(%collection, "stored collection is not a list, using seed");
            seed()
        }
        None => seed(),
    }
}
