//! Derivations over the inventory collections.
//!
//! Every function here is pure: it takes slices of the current products,
//! customers and sales and returns a fresh view, leaving its input untouched.
//! - Product filtering and stock classification
//! - Inventory statistics
//! - Sales ranking, daily trend, and payment breakdown
//! - Customer and sale search
//! - Sale draft validation

pub mod customers;
pub mod filter;
pub mod report;
pub mod sales;
pub mod stats;
pub mod validation;

pub use customers::search_customers;
pub use filter::{ProductFilters, filter_products, low_stock, out_of_stock};
pub use report::{DEFAULT_TOP_PRODUCTS, KeyMetrics, SalesReport, key_metrics, sales_report};
pub use sales::{
    PaymentShare, ProductRevenue, TrendPoint, UNKNOWN_PRODUCT, payment_breakdown, recent_sales,
    sales_trend, search_sales, top_products_by_revenue,
};
pub use stats::{InventoryStats, inventory_stats};
pub use validation::{SaleIssue, validate_sale};
