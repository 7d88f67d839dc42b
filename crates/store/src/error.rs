//! Store error types.

use domain::{CustomerId, ProductId, SaleId};
use projections::SaleIssue;
use storage::StorageError;
use thiserror::Error;

/// Errors returned by store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No product has the given id.
    #[error("Product not found: {0}")]
    ProductNotFound(ProductId),

    /// No customer has the given id.
    #[error("Customer not found: {0}")]
    CustomerNotFound(CustomerId),

    /// No sale has the given id.
    #[error("Sale not found: {0}")]
    SaleNotFound(SaleId),

    /// The input is missing a required field.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The sale draft does not fit the current stock or catalogue.
    #[error("Sale rejected with {} issue(s)", .0.len())]
    InvalidSale(Vec<SaleIssue>),

    /// Durable storage could not be set up.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// The store has been shut down and accepts no more changes.
    #[error("Store is closed")]
    Closed,
}

/// Convenience type alias for store results.
pub type Result<T> = std::result::Result<T, StoreError>;
