//! Integration tests for the inventory store over the storage adapters.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use domain::{
    CustomerDraft, CustomerPatch, LineItemDraft, Money, PaymentStatus, ProductDraft, ProductId,
    ProductPatch, SaleDraft, Severity, StockStatus,
};
use projections::{ProductFilters, SaleIssue};
use storage::{Collections, InMemoryAdapter, LocalFileAdapter, PersistenceAdapter};
use store::{InventoryStore, StoreConfig, StoreError, StoreSnapshot};

struct TestHarness {
    store: InventoryStore,
    adapter: InMemoryAdapter,
}

impl TestHarness {
    /// Seeded store over an in-memory adapter, with fast retries.
    async fn new() -> Self {
        Self::with_config(StoreConfig::new().with_backoff(Duration::from_millis(1))).await
    }

    async fn with_config(config: StoreConfig) -> Self {
        let adapter = InMemoryAdapter::seeded();
        let store = InventoryStore::new(Arc::new(adapter.clone()), config);
        store.hydrate().await;
        Self { store, adapter }
    }

    async fn stored(&self) -> Collections {
        self.store.flush().await.unwrap();
        self.adapter.collections().await
    }

    async fn product(&self, id: &str) -> domain::Product {
        self.store.product(&ProductId::new(id)).await.unwrap()
    }
}

#[tokio::test]
async fn hydrate_loads_adapter_contents() {
    let h = TestHarness::new().await;

    let snapshot = h.store.snapshot().await;
    assert_eq!(snapshot.products, domain::seed::default_products());
    assert_eq!(snapshot.customers, domain::seed::default_customers());
    assert!(snapshot.sales.is_empty());
    assert!(snapshot.notifications.is_empty());
}

#[tokio::test]
async fn seed_example_stock_queries() {
    let h = TestHarness::new().await;

    let out: Vec<_> = h.store.get_out_of_stock_products().await;
    let low: Vec<_> = h.store.get_low_stock_products().await;
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id.as_str(), "3");
    assert_eq!(low.len(), 1);
    assert_eq!(low[0].id.as_str(), "2");

    let stats = h.store.get_inventory_stats().await;
    assert_eq!(stats.total_products, 5);
    assert_eq!(stats.out_of_stock_count, 1);
    assert_eq!(stats.low_stock_count, 1);
}

#[tokio::test]
async fn add_product_assigns_id_notifies_and_persists() {
    let h = TestHarness::new().await;

    let draft = ProductDraft::new("iPhone 14 Pro", "Electronics", 3, Money::from_cents(99_900));
    let first = h.store.add_product(draft.clone()).await.unwrap();
    let second = h.store.add_product(draft).await.unwrap();

    assert_ne!(first.id, second.id);
    assert_eq!(first.low_stock_threshold, 5);
    assert_eq!(h.store.products().await.len(), 7);

    let current = h.store.current_notification().await.unwrap();
    assert_eq!(current.severity, Severity::Success);
    assert!(current.message.contains("iPhone 14 Pro"));

    let stored = h.stored().await;
    assert!(stored.products.contains(&first));
    assert!(stored.products.contains(&second));
}

#[tokio::test]
async fn blank_names_are_rejected() {
    let h = TestHarness::new().await;

    let result = h.store.add_customer(CustomerDraft::new("   ")).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));

    let patch = ProductPatch::new().name("");
    let result = h.store.update_product(&ProductId::new("1"), patch).await;
    assert!(matches!(result, Err(StoreError::Validation(_))));
    assert!(h.store.notifications().await.is_empty());
}

#[tokio::test]
async fn update_merges_only_present_fields() {
    let h = TestHarness::new().await;

    let patch = ProductPatch::new().quantity(0).price(Money::from_cents(100));
    let updated = h.store.update_product(&ProductId::new("4"), patch).await.unwrap();

    assert_eq!(updated.name, "Magic Keyboard");
    assert_eq!(updated.quantity, 0);
    assert_eq!(updated.stock_status(), StockStatus::OutOfStock);
    assert_eq!(h.store.current_notification().await.unwrap().severity, Severity::Info);

    let stored = h.stored().await;
    assert_eq!(stored.products[3], updated);
}

#[tokio::test]
async fn missing_ids_surface_not_found_without_side_effects() {
    let h = TestHarness::new().await;
    let before = h.store.snapshot().await;

    let missing = ProductId::new("missing");
    assert!(matches!(
        h.store.update_product(&missing, ProductPatch::new().quantity(1)).await,
        Err(StoreError::ProductNotFound(_))
    ));
    assert!(matches!(
        h.store.delete_product(&missing).await,
        Err(StoreError::ProductNotFound(_))
    ));
    assert!(matches!(
        h.store
            .update_customer(&"nobody".into(), CustomerPatch::new().name("X"))
            .await,
        Err(StoreError::CustomerNotFound(_))
    ));
    assert!(matches!(
        h.store.delete_customer(&"nobody".into()).await,
        Err(StoreError::CustomerNotFound(_))
    ));

    h.store.flush().await.unwrap();
    assert_eq!(h.store.snapshot().await, before);
    assert_eq!(h.adapter.write_attempts(), 0);
}

#[tokio::test]
async fn sale_decrements_stock_and_captures_prices() {
    let h = TestHarness::new().await;

    let draft = SaleDraft::for_customer("1")
        .item(LineItemDraft::new("1", 2))
        .item(LineItemDraft::new("5", 3).at_price(Money::from_cents(1_500)))
        .payment_status(PaymentStatus::Pending);
    let sale = h.store.create_sale_order(draft).await.unwrap();

    assert_eq!(sale.customer_name, "Somchai Jaidee");
    assert_eq!(sale.items[0].price, Money::from_cents(99_900));
    assert_eq!(sale.items[0].product_name, "iPhone 14 Pro");
    assert_eq!(sale.total_amount, Money::from_cents(2 * 99_900 + 3 * 1_500));
    let line_sum: Money = sale.items.iter().map(|i| i.total()).sum();
    assert_eq!(sale.total_amount, line_sum);

    assert_eq!(h.product("1").await.quantity, 48);
    assert_eq!(h.product("5").await.quantity, 117);
    assert_eq!(h.store.sales().await[0], sale);

    let stored = h.stored().await;
    assert_eq!(stored.sales, vec![sale]);
    assert_eq!(stored.products[0].quantity, 48);
    assert_eq!(stored.products[4].quantity, 117);
}

#[tokio::test]
async fn oversold_stock_clamps_at_zero() {
    let h = TestHarness::new().await;

    let draft = SaleDraft::walk_in()
        .item(LineItemDraft::new("2", 4))
        .item(LineItemDraft::new("2", 4))
        .item(LineItemDraft::new("ghost", 1).at_price(Money::from_cents(100)));
    let issues = h.store.validate_sale(&draft).await;
    assert_eq!(issues.len(), 2);
    assert!(matches!(issues[0], SaleIssue::InsufficientStock { requested: 8, .. }));

    let sale = h.store.create_sale_order(draft).await.unwrap();
    assert_eq!(sale.customer_name, "Walk-in Customer");
    assert!(sale.is_walk_in());
    assert_eq!(h.product("2").await.quantity, 0);
    assert_eq!(h.store.products().await.len(), 5);
}

#[tokio::test]
async fn concurrent_validated_sales_cannot_oversell() {
    let h = TestHarness::new().await;
    let first = h.store.clone();
    let second = h.store.clone();

    let (a, b) = tokio::join!(
        first.create_validated_sale(SaleDraft::walk_in().item(LineItemDraft::new("2", 5))),
        second.create_validated_sale(SaleDraft::for_customer("1").item(LineItemDraft::new("2", 5))),
    );

    let (recorded, rejected) = match (a, b) {
        (Ok(sale), Err(e)) | (Err(e), Ok(sale)) => (sale, e),
        other => panic!("expected exactly one sale to go through, got {other:?}"),
    };
    match rejected {
        StoreError::InvalidSale(issues) => assert_eq!(
            issues,
            vec![SaleIssue::InsufficientStock {
                product_id: ProductId::new("2"),
                requested: 5,
                available: 0,
            }]
        ),
        other => panic!("expected InvalidSale, got {other:?}"),
    }

    assert_eq!(h.product("2").await.quantity, 0);
    assert_eq!(h.store.sales().await, vec![recorded]);
    assert_eq!(h.stored().await.sales.len(), 1);
}

#[tokio::test]
async fn rejected_validated_sale_changes_nothing() {
    let h = TestHarness::new().await;
    let before = h.store.snapshot().await;

    let result = h
        .store
        .create_validated_sale(SaleDraft::walk_in().item(LineItemDraft::new("3", 1)))
        .await;

    assert!(matches!(result, Err(StoreError::InvalidSale(ref issues)) if issues.len() == 1));
    assert_eq!(h.store.snapshot().await, before);
    assert!(h.stored().await.sales.is_empty());
}

#[tokio::test]
async fn deleting_products_and_customers_keeps_sales() {
    let h = TestHarness::new().await;

    let draft = SaleDraft::for_customer("2").item(LineItemDraft::new("4", 1));
    let sale = h.store.create_sale_order(draft).await.unwrap();

    h.store.delete_product(&ProductId::new("4")).await.unwrap();
    h.store.delete_customer(&"2".into()).await.unwrap();

    let sales = h.store.sales().await;
    assert_eq!(sales, vec![sale.clone()]);
    assert_eq!(sales[0].items[0].product_id.as_str(), "4");
    assert_eq!(sales[0].customer_name, "Malee Srisuk");

    let report = h.store.sales_report(5).await;
    assert_eq!(report.top_products[0].name, "Magic Keyboard");
    assert_eq!(
        h.store.current_notification().await.unwrap().severity,
        Severity::Success
    );
    let severities: Vec<_> = h
        .store
        .notifications()
        .await
        .into_iter()
        .map(|n| n.severity)
        .collect();
    assert_eq!(
        severities,
        vec![Severity::Success, Severity::Warning, Severity::Warning]
    );

    let stored = h.stored().await;
    assert_eq!(stored.sales, vec![sale]);
    assert_eq!(stored.products.len(), 4);
    assert_eq!(stored.customers.len(), 1);
}

#[tokio::test]
async fn writes_land_in_issue_order() {
    let h = TestHarness::new().await;

    let product = h
        .store
        .add_product(ProductDraft::new("Temp", "Misc", 1, Money::zero()))
        .await
        .unwrap();
    h.store
        .update_product(&product.id, ProductPatch::new().quantity(9))
        .await
        .unwrap();
    h.store.delete_product(&product.id).await.unwrap();

    let stored = h.stored().await;
    assert!(stored.products.iter().all(|p| p.id != product.id));
    assert_eq!(h.adapter.write_attempts(), 3);
}

#[tokio::test]
async fn failed_writes_retry_then_notify_without_rollback() {
    let config = StoreConfig::new()
        .with_max_attempts(3)
        .with_backoff(Duration::from_millis(1));
    let h = TestHarness::with_config(config).await;
    h.adapter.set_fail_writes(true);

    let customer = h
        .store
        .add_customer(CustomerDraft::new("Niran").phone("02-555-0101"))
        .await
        .unwrap();
    h.store.flush().await.unwrap();

    assert_eq!(h.adapter.write_attempts(), 3);
    assert!(h.store.customers().await.contains(&customer));
    assert!(!h.adapter.collections().await.customers.contains(&customer));

    let notifications = h.store.notifications().await;
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].severity, Severity::Success);
    assert_eq!(notifications[1].severity, Severity::Error);
    assert!(notifications[1].message.contains("3 attempts"));
}

#[tokio::test(start_paused = true)]
async fn transient_failure_recovers_on_retry() {
    let h = TestHarness::with_config(StoreConfig::new().with_backoff(Duration::from_millis(50)))
        .await;
    h.adapter.set_fail_writes(true);

    let product = h
        .store
        .add_product(ProductDraft::new("Charger", "Accessories", 10, Money::from_cents(2_900)))
        .await
        .unwrap();

    // The clock stays put while this task is busy, so the worker is parked
    // in its backoff when the adapter recovers.
    while h.adapter.write_attempts() < 1 {
        tokio::task::yield_now().await;
    }
    h.adapter.set_fail_writes(false);

    let stored = h.stored().await;
    assert!(stored.products.contains(&product));
    let severities: Vec<_> = h
        .store
        .notifications()
        .await
        .into_iter()
        .map(|n| n.severity)
        .collect();
    assert_eq!(severities, vec![Severity::Success]);
}

#[tokio::test]
async fn unreadable_storage_hydrates_empty() {
    let adapter = InMemoryAdapter::seeded();
    adapter.set_fail_loads(true);
    let store = InventoryStore::new(Arc::new(adapter), StoreConfig::default());

    store.hydrate().await;

    assert_eq!(store.snapshot().await, StoreSnapshot::default());
}

#[tokio::test]
async fn subscribers_see_every_change_until_unsubscribed() {
    let h = TestHarness::new().await;
    let seen: Arc<Mutex<Vec<StoreSnapshot>>> = Arc::default();

    let sink = seen.clone();
    let id = h
        .store
        .subscribe(move |snapshot| sink.lock().unwrap().push(snapshot.clone()))
        .await;

    let customer = h
        .store
        .add_customer(CustomerDraft::new("Ploy").email("ploy@example.com"))
        .await
        .unwrap();
    let notification = h.store.current_notification().await.unwrap();
    h.store.dismiss_notification(notification.id).await.unwrap();

    {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen[0].customers.contains(&customer));
        assert_eq!(seen[0].notifications.len(), 1);
        assert!(seen[1].notifications.is_empty());
    }

    assert!(h.store.unsubscribe(id).await);
    assert!(!h.store.unsubscribe(id).await);
    h.store.notify(Severity::Info, "ignored").await;
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn notifications_are_fifo_and_bounded() {
    let h = TestHarness::with_config(StoreConfig::new().with_notification_capacity(2)).await;

    let first = h.store.notify(Severity::Info, "one").await;
    let second = h.store.notify(Severity::Warning, "two").await;
    assert_eq!(h.store.current_notification().await, Some(first.clone()));

    h.store.notify(Severity::Error, "three").await;
    let messages: Vec<_> = h
        .store
        .notifications()
        .await
        .into_iter()
        .map(|n| n.message)
        .collect();
    assert_eq!(messages, vec!["two", "three"]);

    assert!(h.store.dismiss_notification(first.id).await.is_none());
    assert_eq!(h.store.dismiss_notification(second.id).await, Some(second));
    assert_eq!(
        h.store.current_notification().await.unwrap().message,
        "three"
    );
}

#[tokio::test]
async fn queries_delegate_to_derivations() {
    let h = TestHarness::new().await;
    h.store
        .create_sale_order(SaleDraft::for_customer("1").item(LineItemDraft::new("4", 2)))
        .await
        .unwrap();

    let filters = ProductFilters::new().search("pro").status(StockStatus::OutOfStock);
    let filtered = h.store.get_filtered_products(&filters).await;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name, "AirPods Pro");

    assert_eq!(h.store.search_customers("malee").await.len(), 1);
    assert_eq!(h.store.search_sales("somchai").await.len(), 1);
    assert_eq!(h.store.recent_sales(10).await.len(), 1);

    let report = h.store.sales_report(5).await;
    assert_eq!(report.metrics.total_sales, 1);
    assert_eq!(report.metrics.total_revenue, Money::from_cents(2 * 9_900));
}

#[tokio::test]
async fn shutdown_drains_writes_and_closes() {
    let h = TestHarness::new().await;
    let product = h
        .store
        .add_product(ProductDraft::new("Dock", "Accessories", 2, Money::from_cents(4_900)))
        .await
        .unwrap();

    h.store.shutdown().await.unwrap();
    h.store.shutdown().await.unwrap();

    assert!(h.adapter.collections().await.products.contains(&product));
    assert!(matches!(
        h.store.add_customer(CustomerDraft::new("Late")).await,
        Err(StoreError::Closed)
    ));
    assert!(matches!(h.store.flush().await, Err(StoreError::Closed)));
    assert_eq!(h.store.products().await.len(), 6);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn mutations_racing_shutdown_are_stored_or_rejected() {
    let h = TestHarness::new().await;

    let spawn_add = |i: usize| {
        let store = h.store.clone();
        tokio::spawn(async move { store.add_customer(CustomerDraft::new(format!("Racer {i}"))).await })
    };
    let mut adds: Vec<_> = (0..8).map(spawn_add).collect();
    let closer = {
        let store = h.store.clone();
        tokio::spawn(async move { store.shutdown().await })
    };
    adds.extend((8..16).map(spawn_add));

    let mut accepted = Vec::new();
    for add in adds {
        match add.await.unwrap() {
            Ok(customer) => accepted.push(customer),
            Err(e) => assert!(matches!(e, StoreError::Closed), "unexpected error: {e}"),
        }
    }
    closer.await.unwrap().unwrap();

    let stored = h.adapter.collections().await.customers;
    for customer in &accepted {
        assert!(stored.contains(customer), "{} was accepted but never stored", customer.name);
    }
    assert_eq!(stored.len(), domain::seed::default_customers().len() + accepted.len());
}

#[tokio::test]
async fn local_file_round_trip_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let open = || -> Arc<dyn PersistenceAdapter> {
        Arc::new(LocalFileAdapter::new(dir.path(), "inventory-storage"))
    };

    let first = InventoryStore::new(open(), StoreConfig::default());
    first.hydrate().await;
    first
        .add_customer(CustomerDraft::new("Anan").phone("086-000-1111"))
        .await
        .unwrap();
    let sale = first
        .create_sale_order(SaleDraft::walk_in().item(LineItemDraft::new("1", 5)))
        .await
        .unwrap();
    first.shutdown().await.unwrap();

    let second = InventoryStore::new(open(), StoreConfig::default());
    second.hydrate().await;

    let before = first.snapshot().await;
    let after = second.snapshot().await;
    assert_eq!(after.products, before.products);
    assert_eq!(after.customers, before.customers);
    assert_eq!(after.sales, vec![sale]);
    assert_eq!(after.products[0].quantity, 45);
}

#[tokio::test]
async fn corrupt_customers_fall_back_to_seed_alone() {
    let dir = tempfile::tempdir().unwrap();
    let blob = serde_json::json!({
        "products": [{"id": "p1", "name": "Only Product", "quantity": 3, "price": 10, "lowStockThreshold": 5}],
        "customers": {"not": "a list"},
        "sales": [],
    });
    std::fs::write(dir.path().join("shop.json"), blob.to_string()).unwrap();

    let store = InventoryStore::new(
        Arc::new(LocalFileAdapter::new(dir.path(), "shop")),
        StoreConfig::default(),
    );
    store.hydrate().await;

    let snapshot = store.snapshot().await;
    assert_eq!(snapshot.products.len(), 1);
    assert_eq!(snapshot.products[0].stock_status(), StockStatus::LowStock);
    assert_eq!(snapshot.customers, domain::seed::default_customers());
    assert!(snapshot.sales.is_empty());
}
