pub mod adapter;
pub mod backend;
pub mod collection;
pub mod error;
pub mod local;
pub mod memory;
pub mod postgres;

pub use adapter::{PersistenceAdapter, PersistenceAdapterExt};
pub use backend::{StorageBackend, connect};
pub use collection::{Collection, Collections, Record};
pub use error::{Result, StorageError};
pub use local::{DEFAULT_NAMESPACE, LocalFileAdapter};
pub use memory::InMemoryAdapter;
pub use postgres::PostgresAdapter;
