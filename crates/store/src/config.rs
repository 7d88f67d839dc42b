use std::time::Duration;

use domain::notification::DEFAULT_NOTIFICATION_CAPACITY;

/// Write attempts made before a persistence failure is reported.
pub const DEFAULT_PERSIST_MAX_ATTEMPTS: u32 = 3;

/// Pause between two attempts of the same write.
pub const DEFAULT_PERSIST_BACKOFF: Duration = Duration::from_millis(200);

/// Tuning knobs of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Attempts per write, at least one.
    pub persist_max_attempts: u32,
    pub persist_backoff: Duration,
    /// Notifications kept before the oldest is dropped; 0 keeps them all.
    pub notification_capacity: usize,
}

impl StoreConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.persist_max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.persist_backoff = backoff;
        self
    }

    pub fn with_notification_capacity(mut self, capacity: usize) -> Self {
        self.notification_capacity = capacity;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            persist_max_attempts: DEFAULT_PERSIST_MAX_ATTEMPTS,
            persist_backoff: DEFAULT_PERSIST_BACKOFF,
            notification_capacity: DEFAULT_NOTIFICATION_CAPACITY,
        }
    }
}
