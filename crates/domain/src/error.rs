//! Domain error types.

use thiserror::Error;

/// Errors raised when parsing domain values from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Unknown stock status name.
    #[error("Unknown stock status: {0} (expected in-stock, low-stock or out-of-stock)")]
    UnknownStockStatus(String),

    /// Unknown payment status name.
    #[error("Unknown payment status: {0} (expected paid, pending or partial)")]
    UnknownPaymentStatus(String),
}
