//! Transient user-facing notifications.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use common::NotificationId;
use serde::{Deserialize, Serialize};

/// Default number of notifications kept before the oldest is dropped.
pub const DEFAULT_NOTIFICATION_CAPACITY: usize = 100;

/// How serious a notification is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A message shown to the user once, then discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: NotificationId,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// FIFO queue of notifications.
///
/// The head of the queue is the one currently on display. There is no
/// deduplication and no priority ordering. When the queue is full the
/// oldest entry is dropped; a capacity of 0 means unbounded.
#[derive(Debug, Clone)]
pub struct NotificationQueue {
    items: VecDeque<Notification>,
    capacity: usize,
}

impl NotificationQueue {
    /// Creates an empty queue holding at most `capacity` notifications.
    pub fn new(capacity: usize) -> Self {
        Self {
            items: VecDeque::new(),
            capacity,
        }
    }

    /// Appends a notification with a fresh id and timestamp.
    pub fn push(&mut self, severity: Severity, message: impl Into<String>) -> Notification {
        let notification = Notification {
            id: NotificationId::new(),
            severity,
            message: message.into(),
            created_at: Utc::now(),
        };
        if self.capacity > 0 && self.items.len() >= self.capacity {
            self.items.pop_front();
        }
        self.items.push_back(notification.clone());
        notification
    }

    /// Removes a notification by id, returning it if it was queued.
    pub fn remove(&mut self, id: NotificationId) -> Option<Notification> {
        let index = self.items.iter().position(|n| n.id == id)?;
        self.items.remove(index)
    }

    /// Returns the notification that should be displayed now.
    pub fn current(&self) -> Option<&Notification> {
        self.items.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Copies the queue contents in display order.
    pub fn to_vec(&self) -> Vec<Notification> {
        self.items.iter().cloned().collect()
    }
}

impl Default for NotificationQueue {
    fn default() -> Self {
        Self::new(DEFAULT_NOTIFICATION_CAPACITY)
    }
}
