//! Sale orders and their line items.

use chrono::{DateTime, NaiveDate, Utc};
use common::{CustomerId, ProductId, SaleId};
use serde::{Deserialize, Deserializer, Serialize};

use crate::coerce;
use crate::error::DomainError;
use crate::{Customer, Money, Product};

/// Name recorded on sales that have no customer.
pub const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

/// Payment status of a sale.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    #[default]
    Paid,
    Pending,
    Partial,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Paid => "paid",
            PaymentStatus::Pending => "pending",
            PaymentStatus::Partial => "partial",
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "paid" => Ok(PaymentStatus::Paid),
            "pending" => Ok(PaymentStatus::Pending),
            "partial" => Ok(PaymentStatus::Partial),
            _ => Err(DomainError::UnknownPaymentStatus(s.to_string())),
        }
    }
}

/// Reads a customer reference, treating `null` and `""` as walk-in.
fn optional_customer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<CustomerId>, D::Error> {
    let id = Option::<CustomerId>::deserialize(deserializer)?;
    Ok(id.filter(|id| !id.as_str().trim().is_empty()))
}

/// One product-quantity-price tuple within a sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: u32,
    /// Unit price captured when the sale was made.
    #[serde(default, deserialize_with = "coerce::price")]
    pub price: Money,
}

impl LineItem {
    pub fn new(
        product_id: impl Into<ProductId>,
        product_name: impl Into<String>,
        quantity: u32,
        price: Money,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            product_name: product_name.into(),
            quantity,
            price,
        }
    }

    /// Returns quantity × unit price.
    pub fn total(&self) -> Money {
        self.price.multiply(self.quantity)
    }
}

/// A completed sale order. Sales are never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: SaleId,
    #[serde(default, deserialize_with = "optional_customer")]
    pub customer_id: Option<CustomerId>,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default, deserialize_with = "coerce::price")]
    pub total_amount: Money,
    #[serde(default, alias = "status")]
    pub payment_status: PaymentStatus,
    pub date: NaiveDate,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl Sale {
    /// Sums the line item totals.
    pub fn compute_total(items: &[LineItem]) -> Money {
        items.iter().map(LineItem::total).sum()
    }

    /// Builds a sale from a draft, capturing names and prices from the
    /// current catalogue.
    ///
    /// A line item price given in the draft wins over the catalogue price;
    /// items referencing unknown products keep their draft values (price 0
    /// when none was given).
    pub fn capture(
        draft: SaleDraft,
        id: SaleId,
        products: &[Product],
        customers: &[Customer],
        now: DateTime<Utc>,
    ) -> Sale {
        let items: Vec<LineItem> = draft
            .items
            .into_iter()
            .map(|item| {
                let product = products.iter().find(|p| p.id == item.product_id);
                LineItem {
                    product_name: item
                        .product_name
                        .filter(|name| !name.is_empty())
                        .or_else(|| product.map(|p| p.name.clone()))
                        .unwrap_or_default(),
                    price: item
                        .price
                        .or_else(|| product.map(|p| p.price))
                        .unwrap_or_default()
                        .non_negative(),
                    product_id: item.product_id,
                    quantity: item.quantity,
                }
            })
            .collect();

        let customer_name = draft
            .customer_name
            .filter(|name| !name.is_empty())
            .or_else(|| {
                draft.customer_id.as_ref().and_then(|id| {
                    customers
                        .iter()
                        .find(|c| &c.id == id)
                        .map(|c| c.name.clone())
                })
            })
            .unwrap_or_else(|| WALK_IN_CUSTOMER.to_string());

        Sale {
            id,
            customer_id: draft.customer_id,
            customer_name,
            total_amount: Self::compute_total(&items),
            items,
            payment_status: draft.payment_status,
            date: now.date_naive(),
            created_at: now,
            notes: draft.notes.filter(|n| !n.trim().is_empty()),
        }
    }

    /// Returns true if the sale has no customer attached.
    pub fn is_walk_in(&self) -> bool {
        self.customer_id.is_none()
    }

    /// Returns true if the customer name, id or notes contain `term`, ignoring case.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.customer_name.to_lowercase().contains(&term)
            || self.id.as_str().to_lowercase().contains(&term)
            || self
                .notes
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains(&term))
    }
}

/// Requested line item of a new sale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub product_id: ProductId,
    #[serde(default, deserialize_with = "coerce::quantity")]
    pub quantity: u32,
    /// Overrides the catalogue price when present.
    #[serde(
        default,
        deserialize_with = "coerce::optional_price",
        skip_serializing_if = "Option::is_none"
    )]
    pub price: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,
}

impl LineItemDraft {
    pub fn new(product_id: impl Into<ProductId>, quantity: u32) -> Self {
        Self {
            product_id: product_id.into(),
            quantity,
            price: None,
            product_name: None,
        }
    }

    pub fn at_price(mut self, price: Money) -> Self {
        self.price = Some(price);
        self
    }
}

/// Input for creating a sale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleDraft {
    #[serde(default, deserialize_with = "optional_customer")]
    pub customer_id: Option<CustomerId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub items: Vec<LineItemDraft>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl SaleDraft {
    /// Creates an empty walk-in sale draft.
    pub fn walk_in() -> Self {
        Self::default()
    }

    /// Creates an empty sale draft for a customer.
    pub fn for_customer(customer_id: impl Into<CustomerId>) -> Self {
        Self {
            customer_id: Some(customer_id.into()),
            ..Self::default()
        }
    }

    pub fn item(mut self, item: LineItemDraft) -> Self {
        self.items.push(item);
        self
    }

    pub fn payment_status(mut self, status: PaymentStatus) -> Self {
        self.payment_status = status;
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}
