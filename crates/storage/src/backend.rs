//! Selection of the persistence strategy at startup.

use std::path::PathBuf;
use std::sync::Arc;

use crate::{
    InMemoryAdapter, LocalFileAdapter, PersistenceAdapter, PostgresAdapter, Result, StorageError,
};

/// The configured persistence strategy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Volatile, seeded on every start.
    Memory,
    /// JSON blob under `dir`, named after `namespace`.
    LocalFile { dir: PathBuf, namespace: String },
    /// PostgreSQL document table.
    Postgres { url: String },
}

impl StorageBackend {
    /// Returns the short name of the strategy.
    pub fn kind(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::LocalFile { .. } => "file",
            StorageBackend::Postgres { .. } => "postgres",
        }
    }
}

/// Builds the adapter for a backend. Postgres migrations are applied on connect.
pub async fn connect(backend: &StorageBackend) -> Result<Arc<dyn PersistenceAdapter>> {
    let adapter: Arc<dyn PersistenceAdapter> = match backend {
        StorageBackend::Memory => Arc::new(InMemoryAdapter::seeded()),
        StorageBackend::LocalFile { dir, namespace } => {
            if namespace.is_empty() {
                return Err(StorageError::InvalidConfig(
                    "local storage namespace must not be empty".to_string(),
                ));
            }
            Arc::new(LocalFileAdapter::new(dir, namespace))
        }
        StorageBackend::Postgres { url } => {
            let adapter = PostgresAdapter::connect(url).await?;
            adapter.run_migrations().await?;
            Arc::new(adapter)
        }
    };

    tracing::info!(backend = backend.kind(), adapter = adapter.name(), "storage ready");
    Ok(adapter)
}
