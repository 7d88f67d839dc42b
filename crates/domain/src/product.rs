//! Products and their stock status.

use common::ProductId;
use serde::{Deserialize, Serialize};

use crate::coerce;
use crate::error::DomainError;
use crate::Money;

/// Threshold used when a new product does not specify one.
pub const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 5;

fn default_threshold() -> u32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

/// Stock status derived from quantity and low-stock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StockStatus {
    /// More units than the threshold.
    InStock,
    /// At least one unit, but no more than the threshold.
    LowStock,
    /// No units left.
    OutOfStock,
}

impl StockStatus {
    /// Classifies a quantity against a low-stock threshold.
    pub fn classify(quantity: u32, low_stock_threshold: u32) -> Self {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity <= low_stock_threshold {
            StockStatus::LowStock
        } else {
            StockStatus::InStock
        }
    }

    /// Returns the status name as used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "in-stock",
            StockStatus::LowStock => "low-stock",
            StockStatus::OutOfStock => "out-of-stock",
        }
    }
}

impl std::fmt::Display for StockStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for StockStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "in-stock" => Ok(StockStatus::InStock),
            "low-stock" => Ok(StockStatus::LowStock),
            "out-of-stock" => Ok(StockStatus::OutOfStock),
            other => Err(DomainError::UnknownStockStatus(other.to_string())),
        }
    }
}

/// A product held in inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "coerce::price")]
    pub price: Money,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub low_stock_threshold: u32,
}

impl Product {
    /// Returns the stock status of this product.
    pub fn stock_status(&self) -> StockStatus {
        StockStatus::classify(self.quantity, self.low_stock_threshold)
    }

    /// Returns the value of the units on hand (price × quantity).
    pub fn stock_value(&self) -> Money {
        self.price.multiply(self.quantity)
    }

    /// Removes sold units from stock, never going below zero.
    pub fn take_stock(&mut self, quantity: u32) {
        self.quantity = self.quantity.saturating_sub(quantity);
    }
}

/// Input for creating a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDraft {
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: u32,
    #[serde(default, deserialize_with = "coerce::price")]
    pub price: Money,
    #[serde(default = "default_threshold", deserialize_with = "coerce::quantity")]
    pub low_stock_threshold: u32,
}

impl ProductDraft {
    /// Creates a draft with the default low-stock threshold.
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        price: Money,
    ) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
            price,
            low_stock_threshold: DEFAULT_LOW_STOCK_THRESHOLD,
        }
    }

    /// Sets the low-stock threshold.
    pub fn with_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = threshold;
        self
    }

    /// Turns the draft into a product with the given identifier.
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            category: self.category,
            quantity: self.quantity,
            price: self.price.non_negative(),
            low_stock_threshold: self.low_stock_threshold,
        }
    }
}

/// Partial update for a product. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(
        default,
        deserialize_with = "coerce::optional_quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub quantity: Option<u32>,
    #[serde(
        default,
        deserialize_with = "coerce::optional_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Money>,
    #[serde(
        default,
        deserialize_with = "coerce::optional_quantity",
        skip_serializing_if = "Option::is_none"
    )]
    pub low_stock_threshold: Option<u32>,
}

impl ProductPatch {
    /// Creates an empty patch.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn quantity(mut self, quantity: u32) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }

    pub fn low_stock_threshold(mut self, threshold: u32) -> Self {
        self.low_stock_threshold = Some(threshold);
        self
    }

    /// Merges the present fields onto a product.
    pub fn apply(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(category) = &self.category {
            product.category = category.clone();
        }
        if let Some(quantity) = self.quantity {
            product.quantity = quantity;
        }
        if let Some(price) = self.price {
            product.price = price.non_negative();
        }
        if let Some(threshold) = self.low_stock_threshold {
            product.low_stock_threshold = threshold;
        }
    }
}
