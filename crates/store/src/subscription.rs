//! Observers notified with a fresh snapshot after every change.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::RwLock;

use crate::StoreSnapshot;

/// Callback receiving the store state after a change.
///
/// Listeners run on the task that made the change, while the store is
/// locked: they must return quickly and must not call back into the store.
pub type Listener = Arc<dyn Fn(&StoreSnapshot) + Send + Sync>;

/// Handle returned by `subscribe`, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct Subscribers {
    listeners: RwLock<BTreeMap<SubscriptionId, Listener>>,
    next_id: AtomicU64,
}

impl Subscribers {
    pub(crate) async fn add(&self, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().await.insert(id, listener);
        id
    }

    pub(crate) async fn remove(&self, id: SubscriptionId) -> bool {
        self.listeners.write().await.remove(&id).is_some()
    }

    /// Calls every listener, in subscription order. The snapshot is only
    /// built when someone is listening.
    pub(crate) async fn publish(&self, snapshot: impl FnOnce() -> StoreSnapshot) {
        let listeners = self.listeners.read().await;
        if listeners.is_empty() {
            return;
        }
        let snapshot = snapshot();
        for listener in listeners.values() {
            listener(&snapshot);
        }
    }
}
