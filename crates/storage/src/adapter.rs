use async_trait::async_trait;

use crate::{Collection, Collections, Record, Result};

/// Core trait for persistence adapters.
///
/// An adapter mirrors the store's collections to durable storage and reads
/// them back on startup. All implementations must be thread-safe
/// (Send + Sync).
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Returns the name of this adapter, for logs.
    fn name(&self) -> &'static str;

    /// Loads all three collections in full.
    async fn load(&self) -> Result<Collections>;

    /// Creates or replaces a single record.
    async fn save(&self, record: &Record) -> Result<()>;

    /// Deletes a record by id. Deleting an absent record is not an error.
    async fn remove(&self, collection: Collection, id: &str) -> Result<()>;
}

/// Extension trait providing convenience methods for persistence adapters.
#[async_trait]
pub trait PersistenceAdapterExt: PersistenceAdapter {
    /// Loads the collections, falling back to empty ones on any failure.
    ///
    /// Never fails: the store must always be able to render something.
    async fn load_or_empty(&self) -> Collections {
        match self.load().await {
            Ok(collections) => collections,
            Err(e) => {
                tracing::error!(adapter = self.name(), error = %e, "load failed, starting empty");
                metrics::counter!("persistence_load_failures_total").increment(1);
                Collections::empty()
            }
        }
    }

    /// Saves every record of the given collections, in replay order.
    async fn save_all(&self, collections: &Collections) -> Result<()> {
        for record in collections.records() {
            self.save(&record).await?;
        }
        Ok(())
    }
}

// Blanket implementation for all PersistenceAdapter implementations
impl<T: PersistenceAdapter + ?Sized> PersistenceAdapterExt for T {}
