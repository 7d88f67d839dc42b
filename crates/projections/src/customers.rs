use domain::Customer;

/// Customers whose name, phone or email contain `term`, ignoring case.
///
/// A blank term returns every customer.
pub fn search_customers(customers: &[Customer], term: &str) -> Vec<Customer> {
    let term = term.trim();
    customers
        .iter()
        .filter(|c| term.is_empty() || c.matches(term))
        .cloned()
        .collect()
}
