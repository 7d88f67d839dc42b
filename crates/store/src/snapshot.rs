use domain::{Customer, Notification, Product, Sale};
use serde::Serialize;

/// Immutable copy of everything the store holds, handed to readers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSnapshot {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    /// Newest first.
    pub sales: Vec<Sale>,
    /// Oldest first; the head is the one to display.
    pub notifications: Vec<Notification>,
}

impl StoreSnapshot {
    /// Returns the notification to display, if any.
    pub fn current_notification(&self) -> Option<&Notification> {
        self.notifications.first()
    }
}
