//! Product list filtering.

use domain::{Product, StockStatus};
use serde::{Deserialize, Serialize};

/// Criteria for narrowing the product list. Absent criteria match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilters {
    /// Case-insensitive substring of the product name.
    #[serde(default)]
    pub search: String,
    /// Exact category.
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<StockStatus>,
}

impl ProductFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = term.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn status(mut self, status: StockStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Returns true if the product satisfies every criterion.
    pub fn matches(&self, product: &Product) -> bool {
        let search = self.search.to_lowercase();
        (search.is_empty() || product.name.to_lowercase().contains(&search))
            && self
                .category
                .as_deref()
                .is_none_or(|category| product.category == category)
            && self
                .status
                .is_none_or(|status| product.stock_status() == status)
    }
}

/// Returns the products matching all filters, in collection order.
pub fn filter_products(products: &[Product], filters: &ProductFilters) -> Vec<Product> {
    products
        .iter()
        .filter(|p| filters.matches(p))
        .cloned()
        .collect()
}

/// Products with at least one unit but no more than their threshold.
pub fn low_stock(products: &[Product]) -> Vec<Product> {
    with_status(products, StockStatus::LowStock)
}

/// Products with no units left.
pub fn out_of_stock(products: &[Product]) -> Vec<Product> {
    with_status(products, StockStatus::OutOfStock)
}

fn with_status(products: &[Product], status: StockStatus) -> Vec<Product> {
    products
        .iter()
        .filter(|p| p.stock_status() == status)
        .cloned()
        .collect()
}
