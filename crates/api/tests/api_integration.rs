//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use api::AppState;
use api::config::{Config, StorageKind};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use storage::InMemoryAdapter;
use store::{InventoryStore, StoreConfig};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// App over a seeded in-memory store.
async fn setup() -> (Router, Arc<AppState>) {
    let store = InventoryStore::new(
        Arc::new(InMemoryAdapter::seeded()),
        StoreConfig::new().with_backoff(Duration::from_millis(1)),
    );
    store.hydrate().await;
    let state = Arc::new(AppState::new(store, 4000));
    let app = api::create_app(state.clone(), get_metrics_handle());
    (app, state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_string(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn names(products: &Value) -> Vec<&str> {
    products
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["products"], 5);
    assert_eq!(json["customers"], 2);
    assert_eq!(json["sales"], 0);
}

#[tokio::test]
async fn test_list_products_with_filters() {
    let (app, _) = setup().await;

    let (status, all) = send(&app, "GET", "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 5);

    let (_, electronics) = send(&app, "GET", "/products?category=Electronics", None).await;
    assert_eq!(names(&electronics), vec!["iPhone 14 Pro", "MacBook Air M2"]);

    let (_, searched) = send(&app, "GET", "/products?search=AIR&category=all", None).await;
    assert_eq!(names(&searched), vec!["MacBook Air M2", "AirPods Pro"]);

    let (_, low) = send(&app, "GET", "/products?status=low-stock", None).await;
    assert_eq!(names(&low), vec!["MacBook Air M2"]);

    let (status, json) = send(&app, "GET", "/products?status=sold-out", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().is_some());
}

#[tokio::test]
async fn test_stock_views_and_stats() {
    let (app, _) = setup().await;

    let (_, low) = send(&app, "GET", "/products/low-stock", None).await;
    assert_eq!(names(&low), vec!["MacBook Air M2"]);

    let (_, out) = send(&app, "GET", "/products/out-of-stock", None).await;
    assert_eq!(names(&out), vec!["AirPods Pro"]);

    let (status, stats) = send(&app, "GET", "/products/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["totalProducts"], 5);
    assert_eq!(stats["totalValue"], 60700);
    assert_eq!(stats["lowStockCount"], 1);
    assert_eq!(stats["outOfStockCount"], 1);
}

#[tokio::test]
async fn test_create_and_get_product() {
    let (app, _) = setup().await;

    let (status, created) = send(
        &app,
        "POST",
        "/products",
        Some(json!({
            "name": "Webcam",
            "category": "Accessories",
            "quantity": "8",
            "price": 49.5
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["quantity"], 8);
    assert_eq!(created["price"], 49.5);
    let id = created["id"].as_str().unwrap();

    let (status, fetched) = send(&app, "GET", &format!("/products/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    let (_, current) = send(&app, "GET", "/notifications/current", None).await;
    assert_eq!(current["displayMs"], 4000);
    assert_eq!(current["notification"]["type"], "success");
    assert_eq!(current["notification"]["message"], "Product \"Webcam\" added");
}

#[tokio::test]
async fn test_create_product_without_name() {
    let (app, state) = setup().await;

    let (status, json) = send(&app, "POST", "/products", Some(json!({ "name": "  " }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "Validation error: Product name is required");
    assert_eq!(state.store.products().await.len(), 5);
}

#[tokio::test]
async fn test_update_and_delete_product() {
    let (app, _) = setup().await;

    let (status, updated) = send(
        &app,
        "PATCH",
        "/products/4",
        Some(json!({ "quantity": 3, "price": "120" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Magic Keyboard");
    assert_eq!(updated["quantity"], 3);
    assert_eq!(updated["price"], 120);

    let (status, deleted) = send(&app, "DELETE", "/products/4", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["id"], "4");

    let (status, _) = send(&app, "GET", "/products/4", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_missing_product_is_not_found_without_notification() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, "PATCH", "/products/99", Some(json!({ "quantity": 1 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Product not found: 99");

    let (status, _) = send(&app, "DELETE", "/products/99", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, notifications) = send(&app, "GET", "/notifications", None).await;
    assert_eq!(notifications, json!([]));
}

#[tokio::test]
async fn test_create_sale_takes_stock() {
    let (app, _) = setup().await;

    let (status, sale) = send(
        &app,
        "POST",
        "/sales",
        Some(json!({
            "customerId": "1",
            "items": [{ "productId": "2", "quantity": 2 }],
            "paymentStatus": "pending"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(sale["customerName"], "Somchai Jaidee");
    assert_eq!(sale["totalAmount"], 2398);
    assert_eq!(sale["paymentStatus"], "pending");
    assert_eq!(sale["items"][0]["productName"], "MacBook Air M2");

    let (_, product) = send(&app, "GET", "/products/2", None).await;
    assert_eq!(product["quantity"], 3);

    let id = sale["id"].as_str().unwrap();
    let (status, fetched) = send(&app, "GET", &format!("/sales/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, sale);

    let (_, found) = send(&app, "GET", "/sales?search=somchai", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_oversold_sale_is_rejected() {
    let (app, state) = setup().await;

    let (status, json) = send(
        &app,
        "POST",
        "/sales",
        Some(json!({ "items": [{ "productId": "2", "quantity": 6 }] })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        json["issues"],
        json!([{
            "kind": "insufficientStock",
            "productId": "2",
            "requested": 6,
            "available": 5
        }])
    );
    assert_eq!(
        json["error"],
        "Only 5 units of product 2 in stock, 6 requested"
    );
    assert!(state.store.sales().await.is_empty());
    assert_eq!(state.store.product(&"2".into()).await.unwrap().quantity, 5);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_sales_cannot_oversell() {
    let (app, state) = setup().await;
    let draft = json!({ "items": [{ "productId": "2", "quantity": 5 }] });

    let ((first, _), (second, _)) = tokio::join!(
        send(&app, "POST", "/sales", Some(draft.clone())),
        send(&app, "POST", "/sales", Some(draft)),
    );

    let mut statuses = vec![first, second];
    statuses.sort();
    assert_eq!(
        statuses,
        vec![StatusCode::CREATED, StatusCode::UNPROCESSABLE_ENTITY]
    );
    assert_eq!(state.store.sales().await.len(), 1);
    assert_eq!(state.store.product(&"2".into()).await.unwrap().quantity, 0);
}

#[tokio::test]
async fn test_empty_sale_is_rejected() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, "POST", "/sales", Some(json!({ "items": [] }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["issues"][0]["kind"], "noItems");
}

#[tokio::test]
async fn test_get_nonexistent_sale() {
    let (app, _) = setup().await;

    let (status, json) = send(&app, "GET", "/sales/unknown", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Sale not found: unknown");
}

#[tokio::test]
async fn test_customer_lifecycle() {
    let (app, _) = setup().await;

    let (status, created) = send(
        &app,
        "POST",
        "/customers",
        Some(json!({ "name": "Niran Thongdee", "email": "niran@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_string();

    let (_, found) = send(&app, "GET", "/customers?search=NIRAN@", None).await;
    assert_eq!(found.as_array().unwrap().len(), 1);
    assert_eq!(found[0]["id"], id.as_str());

    let (status, updated) = send(
        &app,
        "PATCH",
        &format!("/customers/{id}"),
        Some(json!({ "phone": "02-555-0100" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["phone"], "02-555-0100");
    assert_eq!(updated["email"], "niran@example.com");

    let (status, _) = send(&app, "DELETE", &format!("/customers/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "DELETE", &format!("/customers/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, all) = send(&app, "GET", "/customers", None).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_sales_report() {
    let (app, _) = setup().await;

    for (product, quantity) in [("1", 1), ("5", 10)] {
        let (status, _) = send(
            &app,
            "POST",
            "/sales",
            Some(json!({ "items": [{ "productId": product, "quantity": quantity }] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, report) = send(&app, "GET", "/reports", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["metrics"]["totalSales"], 2);
    assert_eq!(report["metrics"]["totalRevenue"], 1189);
    assert_eq!(report["metrics"]["totalCustomers"], 2);
    assert_eq!(report["topProducts"][0]["productId"], "1");
    assert_eq!(report["topProducts"][1]["quantitySold"], 10);
    assert_eq!(report["trend"].as_array().unwrap().len(), 1);
    assert_eq!(report["paymentBreakdown"][0]["status"], "paid");
    assert_eq!(report["paymentBreakdown"][0]["count"], 2);

    let (_, report) = send(&app, "GET", "/reports?top=1", None).await;
    assert_eq!(report["topProducts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_dismiss_notification() {
    let (app, _) = setup().await;

    send(&app, "DELETE", "/products/3", None).await;
    let (_, notifications) = send(&app, "GET", "/notifications", None).await;
    assert_eq!(notifications[0]["type"], "warning");
    let id = notifications[0]["id"].as_str().unwrap().to_string();

    let (status, dismissed) = send(&app, "DELETE", &format!("/notifications/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(dismissed["message"], "Product \"AirPods Pro\" deleted");

    let (_, current) = send(&app, "GET", "/notifications/current", None).await;
    assert_eq!(current["notification"], Value::Null);

    let (status, _) = send(&app, "DELETE", &format!("/notifications/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", "/notifications/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"],
        "text/plain; version=0.0.4; charset=utf-8"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("inventory_products"));
    assert!(text.contains("inventory_out_of_stock_products"));
}

#[tokio::test]
async fn test_closed_store_is_unavailable() {
    let (app, state) = setup().await;
    state.store.shutdown().await.unwrap();

    let (status, _) = send(&app, "POST", "/customers", Some(json!({ "name": "Late" }))).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_create_state_from_memory_config() {
    let config = Config {
        storage: StorageKind::Memory,
        ..Config::default()
    };

    let state = api::create_state(&config).await.unwrap();

    assert_eq!(state.store.products().await.len(), 5);
    assert_eq!(state.notification_display_ms, 4000);
}

#[tokio::test]
async fn test_file_storage_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config {
        storage: StorageKind::File,
        data_dir: dir.path().to_path_buf(),
        ..Config::default()
    };

    let state = api::create_state(&config).await.unwrap();
    let app = api::create_app(state.clone(), get_metrics_handle());
    let (status, _) = send(
        &app,
        "POST",
        "/products",
        Some(json!({ "name": "Webcam", "quantity": 8, "price": 49.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    state.store.shutdown().await.unwrap();

    let reopened = api::create_state(&config).await.unwrap();
    let products = reopened.store.products().await;
    assert_eq!(products.len(), 6);
    assert!(products.iter().any(|p| p.name == "Webcam"));
}
