//! The inventory domain store.
//!
//! [`InventoryStore`] is the single owner of products, customers, sales and
//! notifications. Readers take [`StoreSnapshot`]s or subscribe to changes;
//! writers call its operations, which apply in memory immediately and are
//! mirrored to a [`storage::PersistenceAdapter`] by a background worker.

pub mod config;
pub mod error;
pub mod snapshot;
pub mod store;
pub mod subscription;
mod worker;

pub use config::{DEFAULT_PERSIST_BACKOFF, DEFAULT_PERSIST_MAX_ATTEMPTS, StoreConfig};
pub use error::{Result, StoreError};
pub use snapshot::StoreSnapshot;
pub use store::InventoryStore;
pub use subscription::{Listener, SubscriptionId};
