//! The persisted collections and the records they hold.

use domain::seed;
use domain::{Customer, Product, Sale};
use serde::{Deserialize, Serialize};

/// Names of the three persisted collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Collection {
    Products,
    Customers,
    Sales,
}

impl Collection {
    /// All collections, in load order.
    pub const ALL: [Collection; 3] = [
        Collection::Products,
        Collection::Customers,
        Collection::Sales,
    ];

    /// Returns the collection name used as storage key.
    pub fn as_str(&self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Customers => "customers",
            Collection::Sales => "sales",
        }
    }
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single record handed to a persistence adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Product(Product),
    Customer(Customer),
    Sale(Sale),
}

impl Record {
    /// Returns the collection this record belongs to.
    pub fn collection(&self) -> Collection {
        match self {
            Record::Product(_) => Collection::Products,
            Record::Customer(_) => Collection::Customers,
            Record::Sale(_) => Collection::Sales,
        }
    }

    /// Returns the record identifier.
    pub fn id(&self) -> &str {
        match self {
            Record::Product(p) => p.id.as_str(),
            Record::Customer(c) => c.id.as_str(),
            Record::Sale(s) => s.id.as_str(),
        }
    }

    /// Serializes the record body.
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Record::Product(p) => serde_json::to_value(p),
            Record::Customer(c) => serde_json::to_value(c),
            Record::Sale(s) => serde_json::to_value(s),
        }
    }
}

impl From<Product> for Record {
    fn from(p: Product) -> Self {
        Record::Product(p)
    }
}

impl From<Customer> for Record {
    fn from(c: Customer) -> Self {
        Record::Customer(c)
    }
}

impl From<Sale> for Record {
    fn from(s: Sale) -> Self {
        Record::Sale(s)
    }
}

/// The full persisted state: products, customers and sales.
///
/// Sales are kept newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collections {
    pub products: Vec<Product>,
    pub customers: Vec<Customer>,
    pub sales: Vec<Sale>,
}

impl Collections {
    /// Creates empty collections.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Creates collections filled with the built-in seed data.
    pub fn seeded() -> Self {
        Self {
            products: seed::default_products(),
            customers: seed::default_customers(),
            sales: seed::default_sales(),
        }
    }

    /// Inserts or replaces a record, keeping its position if it already exists.
    ///
    /// New products and customers are appended; new sales are prepended.
    pub fn upsert(&mut self, record: Record) {
        match record {
            Record::Product(product) => {
                match self.products.iter_mut().find(|p| p.id == product.id) {
                    Some(existing) => *existing = product,
                    None => self.products.push(product),
                }
            }
            Record::Customer(customer) => {
                match self.customers.iter_mut().find(|c| c.id == customer.id) {
                    Some(existing) => *existing = customer,
                    None => self.customers.push(customer),
                }
            }
            Record::Sale(sale) => match self.sales.iter_mut().find(|s| s.id == sale.id) {
                Some(existing) => *existing = sale,
                None => self.sales.insert(0, sale),
            },
        }
    }

    /// Removes a record by id. Returns true if it existed.
    pub fn remove(&mut self, collection: Collection, id: &str) -> bool {
        fn remove_where<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) -> bool {
            let before = items.len();
            items.retain(|item| !matches(item));
            items.len() != before
        }

        match collection {
            Collection::Products => remove_where(&mut self.products, |p| p.id.as_str() == id),
            Collection::Customers => remove_where(&mut self.customers, |c| c.id.as_str() == id),
            Collection::Sales => remove_where(&mut self.sales, |s| s.id.as_str() == id),
        }
    }

    /// Returns every record, collection by collection.
    pub fn records(&self) -> impl Iterator<Item = Record> + '_ {
        let products = self.products.iter().cloned().map(Record::Product);
        let customers = self.customers.iter().cloned().map(Record::Customer);
        // Oldest first, so that prepending on upsert restores the original order.
        let sales = self.sales.iter().rev().cloned().map(Record::Sale);
        products.chain(customers).chain(sales)
    }

    /// Returns the number of records in a collection.
    pub fn count(&self, collection: Collection) -> usize {
        match collection {
            Collection::Products => self.products.len(),
            Collection::Customers => self.customers.len(),
            Collection::Sales => self.sales.len(),
        }
    }
}
