//! Shared types for the inventory dashboard workspace.

mod types;

pub use types::{CustomerId, NotificationId, ProductId, SaleId};
