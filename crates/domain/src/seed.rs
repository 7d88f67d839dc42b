//! Built-in data used when no usable stored data exists.

use common::{CustomerId, ProductId};

use crate::{Customer, Money, Product, Sale};

fn product(
    id: &str,
    name: &str,
    category: &str,
    quantity: u32,
    price_cents: i64,
    threshold: u32,
) -> Product {
    Product {
        id: ProductId::new(id),
        name: name.to_string(),
        category: category.to_string(),
        quantity,
        price: Money::from_cents(price_cents),
        low_stock_threshold: threshold,
    }
}

/// Default product catalogue.
pub fn default_products() -> Vec<Product> {
    vec![
        product("1", "iPhone 14 Pro", "Electronics", 50, 99_900, 10),
        product("2", "MacBook Air M2", "Electronics", 5, 119_900, 10),
        product("3", "AirPods Pro", "Audio", 0, 24_900, 10),
        product("4", "Magic Keyboard", "Accessories", 25, 9_900, 5),
        product("5", "USB-C Cable", "Accessories", 120, 1_900, 20),
    ]
}

/// Default customer list.
pub fn default_customers() -> Vec<Customer> {
    vec![
        Customer {
            id: CustomerId::new("1"),
            name: "Somchai Jaidee".to_string(),
            phone: "081-234-5678".to_string(),
            email: "somchai@example.com".to_string(),
        },
        Customer {
            id: CustomerId::new("2"),
            name: "Malee Srisuk".to_string(),
            phone: "089-876-5432".to_string(),
            email: "malee@example.com".to_string(),
        },
    ]
}

/// Default sales history (empty).
pub fn default_sales() -> Vec<Sale> {
    Vec::new()
}
