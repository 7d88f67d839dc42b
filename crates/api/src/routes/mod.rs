pub mod customers;
pub mod health;
pub mod metrics;
pub mod notifications;
pub mod products;
pub mod reports;
pub mod sales;
