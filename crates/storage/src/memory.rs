use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{Collection, Collections, PersistenceAdapter, Record, Result, StorageError};

/// Volatile adapter keeping the collections in memory.
///
/// Nothing survives a restart. Used when no durable storage is configured
/// and in tests, where failures can be switched on at will.
#[derive(Clone, Default)]
pub struct InMemoryAdapter {
    collections: Arc<RwLock<Collections>>,
    fail_loads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryAdapter {
    /// Creates an adapter with empty collections.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an adapter holding the built-in seed data.
    pub fn seeded() -> Self {
        Self::with_collections(Collections::seeded())
    }

    /// Creates an adapter holding the given collections.
    pub fn with_collections(collections: Collections) -> Self {
        Self {
            collections: Arc::new(RwLock::new(collections)),
            ..Self::default()
        }
    }

    /// Makes subsequent loads fail.
    pub fn set_fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    /// Makes subsequent saves and removes fail.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of the stored collections.
    pub async fn collections(&self) -> Collections {
        self.collections.read().await.clone()
    }

    /// Returns the number of write attempts seen, failed ones included.
    pub fn write_attempts(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn check_write(&self) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "in-memory adapter is failing writes".to_string(),
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryAdapter {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<Collections> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable(
                "in-memory adapter is failing loads".to_string(),
            ));
        }
        Ok(self.collections.read().await.clone())
    }

    async fn save(&self, record: &Record) -> Result<()> {
        self.check_write()?;
        self.collections.write().await.upsert(record.clone());
        Ok(())
    }

    async fn remove(&self, collection: Collection, id: &str) -> Result<()> {
        self.check_write()?;
        self.collections.write().await.remove(collection, id);
        Ok(())
    }
}
