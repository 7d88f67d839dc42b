//! Domain layer for the inventory dashboard.
//!
//! This crate provides the entities the store holds and the rules applied
//! when they are written:
//! - Products, customers, and sale orders with their drafts and patches
//! - Money in integer cents with decimal wire format
//! - Lenient numeric coercion (malformed input becomes zero)
//! - The FIFO notification queue
//! - Built-in seed data

pub mod coerce;
pub mod customer;
pub mod error;
pub mod money;
pub mod notification;
pub mod product;
pub mod sale;
pub mod seed;

pub use common::{CustomerId, NotificationId, ProductId, SaleId};
pub use customer::{Customer, CustomerDraft, CustomerPatch};
pub use error::DomainError;
pub use money::Money;
pub use notification::{Notification, NotificationQueue, Severity};
pub use product::{Product, ProductDraft, ProductPatch, StockStatus};
pub use sale::{LineItem, LineItemDraft, PaymentStatus, Sale, SaleDraft};
