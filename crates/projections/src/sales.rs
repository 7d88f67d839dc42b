//! Sales history derivations: revenue ranking, daily trend, payment mix.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use domain::{Money, PaymentStatus, Product, ProductId, Sale};
use serde::{Deserialize, Serialize};

/// Name shown for products that can no longer be resolved.
pub const UNKNOWN_PRODUCT: &str = "Unknown";

/// Revenue earned by one product across all sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRevenue {
    pub product_id: ProductId,
    pub name: String,
    pub quantity_sold: u64,
    pub revenue: Money,
}

/// Sales total for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    pub date: NaiveDate,
    pub total: Money,
    pub sales_count: usize,
}

/// Number of sales and amount collected under one payment status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentShare {
    pub status: PaymentStatus,
    pub count: usize,
    pub amount: Money,
}

/// Ranks products by revenue over every line item, highest first.
///
/// Equal revenues are ordered by product id. Names come from the current
/// catalogue when the product still exists, otherwise from the line item.
pub fn top_products_by_revenue(
    sales: &[Sale],
    products: &[Product],
    limit: usize,
) -> Vec<ProductRevenue> {
    let mut by_product: HashMap<&ProductId, ProductRevenue> = HashMap::new();

    for item in sales.iter().flat_map(|sale| &sale.items) {
        let entry = by_product
            .entry(&item.product_id)
            .or_insert_with(|| ProductRevenue {
                product_id: item.product_id.clone(),
                name: String::new(),
                quantity_sold: 0,
                revenue: Money::zero(),
            });
        entry.quantity_sold += u64::from(item.quantity);
        entry.revenue += item.total();
        if entry.name.is_empty() {
            entry.name.clone_from(&item.product_name);
        }
    }

    let mut ranked: Vec<ProductRevenue> = by_product
        .into_values()
        .map(|mut revenue| {
            match products.iter().find(|p| p.id == revenue.product_id) {
                Some(product) => revenue.name.clone_from(&product.name),
                None if revenue.name.is_empty() => revenue.name = UNKNOWN_PRODUCT.to_string(),
                None => {}
            }
            revenue
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.revenue
            .cmp(&a.revenue)
            .then_with(|| a.product_id.cmp(&b.product_id))
    });
    ranked.truncate(limit);
    ranked
}

/// Sums sale totals per day, oldest day first.
pub fn sales_trend(sales: &[Sale]) -> Vec<TrendPoint> {
    let mut days: BTreeMap<NaiveDate, (Money, usize)> = BTreeMap::new();
    for sale in sales {
        let day = days.entry(sale.date).or_default();
        day.0 += sale.total_amount;
        day.1 += 1;
    }

    days.into_iter()
        .map(|(date, (total, sales_count))| TrendPoint {
            date,
            total,
            sales_count,
        })
        .collect()
}

/// Counts sales per payment status. Every status is listed, even when unused.
pub fn payment_breakdown(sales: &[Sale]) -> Vec<PaymentShare> {
    [
        PaymentStatus::Paid,
        PaymentStatus::Pending,
        PaymentStatus::Partial,
    ]
    .into_iter()
    .map(|status| {
        let matching = sales.iter().filter(|s| s.payment_status == status);
        PaymentShare {
            status,
            count: matching.clone().count(),
            amount: matching.map(|s| s.total_amount).sum(),
        }
    })
    .collect()
}

/// Sales whose customer name, id or notes contain `term`, ignoring case.
pub fn search_sales(sales: &[Sale], term: &str) -> Vec<Sale> {
    let term = term.trim();
    sales
        .iter()
        .filter(|s| term.is_empty() || s.matches(term))
        .cloned()
        .collect()
}

/// The `limit` most recently created sales, newest first.
pub fn recent_sales(sales: &[Sale], limit: usize) -> Vec<Sale> {
    let mut recent = sales.to_vec();
    recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    recent.truncate(limit);
    recent
}
