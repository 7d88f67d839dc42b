use domain::{Money, Product, StockStatus};
use serde::{Deserialize, Serialize};

/// Aggregate figures over the product catalogue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryStats {
    pub total_products: usize,
    /// Σ price × quantity.
    pub total_value: Money,
    pub low_stock_count: usize,
    pub out_of_stock_count: usize,
}

/// Computes the inventory statistics in a single pass.
pub fn inventory_stats(products: &[Product]) -> InventoryStats {
    products
        .iter()
        .fold(InventoryStats::default(), |mut stats, product| {
            stats.total_products += 1;
            stats.total_value += product.stock_value();
            match product.stock_status() {
                StockStatus::LowStock => stats.low_stock_count += 1,
                StockStatus::OutOfStock => stats.out_of_stock_count += 1,
                StockStatus::InStock => {}
            }
            stats
        })
}
