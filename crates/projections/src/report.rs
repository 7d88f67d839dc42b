//! The reports page: headline figures plus the sales derivations.

use domain::{Customer, Money, Product, Sale};
use serde::{Deserialize, Serialize};

use crate::sales::{
    PaymentShare, ProductRevenue, TrendPoint, payment_breakdown, sales_trend,
    top_products_by_revenue,
};

/// Number of products ranked in a report unless asked otherwise.
pub const DEFAULT_TOP_PRODUCTS: usize = 5;

/// Headline figures of the business.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyMetrics {
    pub total_revenue: Money,
    pub total_sales: usize,
    pub total_customers: usize,
    pub total_products: usize,
}

/// Everything the reports view shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    pub metrics: KeyMetrics,
    pub trend: Vec<TrendPoint>,
    pub top_products: Vec<ProductRevenue>,
    pub payment_breakdown: Vec<PaymentShare>,
}

pub fn key_metrics(products: &[Product], customers: &[Customer], sales: &[Sale]) -> KeyMetrics {
    KeyMetrics {
        total_revenue: sales.iter().map(|s| s.total_amount).sum(),
        total_sales: sales.len(),
        total_customers: customers.len(),
        total_products: products.len(),
    }
}

/// Builds the full report, ranking the `top_n` best-selling products.
pub fn sales_report(
    products: &[Product],
    customers: &[Customer],
    sales: &[Sale],
    top_n: usize,
) -> SalesReport {
    SalesReport {
        metrics: key_metrics(products, customers, sales),
        trend: sales_trend(sales),
        top_products: top_products_by_revenue(sales, products, top_n),
        payment_breakdown: payment_breakdown(sales),
    }
}
