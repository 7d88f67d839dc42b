//! Checks run on a sale draft before it is recorded.

use std::collections::BTreeMap;
use std::fmt;

use domain::{Product, ProductId, SaleDraft};
use serde::{Deserialize, Serialize};

/// A reason a sale draft cannot be recorded as is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum SaleIssue {
    /// The draft has no line items.
    NoItems,
    /// A line item asks for zero units.
    ZeroQuantity { product_id: ProductId },
    /// A line item references a product that does not exist.
    UnknownProduct { product_id: ProductId },
    /// More units were requested than are in stock.
    InsufficientStock {
        product_id: ProductId,
        requested: u64,
        available: u32,
    },
}

impl fmt::Display for SaleIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleIssue::NoItems => write!(f, "Add at least one item"),
            SaleIssue::ZeroQuantity { product_id } => {
                write!(f, "Quantity for product {product_id} must be greater than 0")
            }
            SaleIssue::UnknownProduct { product_id } => {
                write!(f, "Product {product_id} does not exist")
            }
            SaleIssue::InsufficientStock {
                product_id,
                requested,
                available,
            } => write!(
                f,
                "Only {available} units of product {product_id} in stock, {requested} requested"
            ),
        }
    }
}

/// Lists every problem with the draft. An empty list means it can be recorded.
///
/// Quantities requested for the same product on several lines are added up
/// before comparing with the stock on hand.
pub fn validate_sale(draft: &SaleDraft, products: &[Product]) -> Vec<SaleIssue> {
    if draft.items.is_empty() {
        return vec![SaleIssue::NoItems];
    }

    let mut issues = Vec::new();
    let mut requested: BTreeMap<&ProductId, u64> = BTreeMap::new();
    for item in &draft.items {
        if item.quantity == 0 {
            issues.push(SaleIssue::ZeroQuantity {
                product_id: item.product_id.clone(),
            });
        }
        *requested.entry(&item.product_id).or_default() += u64::from(item.quantity);
    }

    for (product_id, requested) in requested {
        match products.iter().find(|p| &p.id == product_id) {
            None => issues.push(SaleIssue::UnknownProduct {
                product_id: product_id.clone(),
            }),
            Some(product) if requested > u64::from(product.quantity) => {
                issues.push(SaleIssue::InsufficientStock {
                    product_id: product_id.clone(),
                    requested,
                    available: product.quantity,
                })
            }
            Some(_) => {}
        }
    }
    issues
}
