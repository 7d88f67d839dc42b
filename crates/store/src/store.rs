//! The inventory store: single owner of products, customers, sales and
//! notifications.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Utc;
use domain::{
    Customer, CustomerDraft, CustomerId, CustomerPatch, Notification, NotificationId,
    NotificationQueue, Product, ProductDraft, ProductId, ProductPatch, Sale, SaleDraft, SaleId,
    Severity,
};
use projections::{InventoryStats, ProductFilters, SaleIssue, SalesReport};
use storage::{Collection, Collections, PersistenceAdapter, PersistenceAdapterExt};
use tokio::sync::{Mutex, RwLock, RwLockWriteGuard, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::subscription::{Listener, Subscribers, SubscriptionId};
use crate::worker::{PersistenceWorker, WriteRequest};
use crate::{Result, StoreConfig, StoreError, StoreSnapshot};

pub(crate) struct StoreState {
    collections: Collections,
    notifications: NotificationQueue,
}

impl StoreState {
    fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            products: self.collections.products.clone(),
            customers: self.collections.customers.clone(),
            sales: self.collections.sales.clone(),
            notifications: self.notifications.to_vec(),
        }
    }

    fn push_notification(&mut self, severity: Severity, message: String) -> Notification {
        metrics::counter!("notifications_emitted_total").increment(1);
        tracing::debug!(%severity, message = %message, "notification");
        self.notifications.push(severity, message)
    }
}

/// State shared between the store handles and the persistence worker.
pub(crate) struct Shared {
    state: RwLock<StoreState>,
    subscribers: Subscribers,
}

impl Shared {
    /// Queues a notification and tells the subscribers.
    pub(crate) async fn notify(&self, severity: Severity, message: String) -> Notification {
        let mut state = self.state.write().await;
        let notification = state.push_notification(severity, message);
        self.subscribers.publish(|| state.snapshot()).await;
        notification
    }
}

/// The domain store.
///
/// Lifecycle: [`InventoryStore::new`] starts the persistence worker,
/// [`InventoryStore::hydrate`] loads durable state, the store then serves
/// reads and mutations, and [`InventoryStore::shutdown`] drains pending
/// writes.
///
/// Every mutation is applied in memory before the call returns, raises a
/// notification, informs subscribers, and queues the matching writes. The
/// caller never waits on storage. Handles are cheap to clone and share the
/// same state.
#[derive(Clone)]
pub struct InventoryStore {
    shared: Arc<Shared>,
    adapter: Arc<dyn PersistenceAdapter>,
    writes: mpsc::UnboundedSender<WriteRequest>,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
    closed: Arc<AtomicBool>,
}

impl InventoryStore {
    /// Creates an empty store writing through `adapter`. Must be called
    /// within a Tokio runtime.
    pub fn new(adapter: Arc<dyn PersistenceAdapter>, config: StoreConfig) -> Self {
        let shared = Arc::new(Shared {
            state: RwLock::new(StoreState {
                collections: Collections::empty(),
                notifications: NotificationQueue::new(config.notification_capacity),
            }),
            subscribers: Subscribers::default(),
        });

        let (writes, rx) = mpsc::unbounded_channel();
        let worker = PersistenceWorker::new(
            adapter.clone(),
            shared.clone(),
            config.persist_max_attempts,
            config.persist_backoff,
        );
        let handle = tokio::spawn(worker.run(rx));

        Self {
            shared,
            adapter,
            writes,
            worker: Arc::new(Mutex::new(Some(handle))),
            closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Replaces the in-memory collections with what the adapter holds.
    ///
    /// Never fails: unreadable storage leaves the store empty.
    #[tracing::instrument(skip(self), fields(adapter = self.adapter.name()))]
    pub async fn hydrate(&self) {
        let collections = self.adapter.load_or_empty().await;
        tracing::info!(
            products = collections.count(Collection::Products),
            customers = collections.count(Collection::Customers),
            sales = collections.count(Collection::Sales),
            "store hydrated"
        );

        let mut state = self.shared.state.write().await;
        state.collections = collections;
        self.shared.subscribers.publish(|| state.snapshot()).await;
    }

    // -- products --

    /// Adds a product under a fresh id.
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_product(&self, draft: ProductDraft) -> Result<Product> {
        require_name(&draft.name, "Product")?;

        let product = draft.into_product(ProductId::generate());
        let mut state = self.lock_open().await?;
        state.collections.products.push(product.clone());
        state.push_notification(
            Severity::Success,
            format!("Product \"{}\" added", product.name),
        );
        self.commit(&state, "add_product", [WriteRequest::Save(product.clone().into())])
            .await;
        Ok(product)
    }

    /// Applies the present fields of `patch` to a product.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_product(&self, id: &ProductId, patch: ProductPatch) -> Result<Product> {
        if let Some(name) = &patch.name {
            require_name(name, "Product")?;
        }

        let mut state = self.lock_open().await?;
        let product = state
            .collections
            .products
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;
        patch.apply(product);
        let product = product.clone();

        state.push_notification(
            Severity::Info,
            format!("Product \"{}\" updated", product.name),
        );
        self.commit(&state, "update_product", [WriteRequest::Save(product.clone().into())])
            .await;
        Ok(product)
    }

    /// Removes a product. Sales referencing it are left untouched.
    #[tracing::instrument(skip(self))]
    pub async fn delete_product(&self, id: &ProductId) -> Result<Product> {
        let mut state = self.lock_open().await?;
        let index = state
            .collections
            .products
            .iter()
            .position(|p| &p.id == id)
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))?;
        let product = state.collections.products.remove(index);

        state.push_notification(
            Severity::Warning,
            format!("Product \"{}\" deleted", product.name),
        );
        let write = WriteRequest::Remove {
            collection: Collection::Products,
            id: id.to_string(),
        };
        self.commit(&state, "delete_product", [write]).await;
        Ok(product)
    }

    // -- customers --

    /// Adds a customer under a fresh id.
    #[tracing::instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn add_customer(&self, draft: CustomerDraft) -> Result<Customer> {
        require_name(&draft.name, "Customer")?;

        let customer = draft.into_customer(CustomerId::generate());
        let mut state = self.lock_open().await?;
        state.collections.customers.push(customer.clone());
        state.push_notification(
            Severity::Success,
            format!("Customer \"{}\" added", customer.name),
        );
        self.commit(&state, "add_customer", [WriteRequest::Save(customer.clone().into())])
            .await;
        Ok(customer)
    }

    /// Applies the present fields of `patch` to a customer.
    #[tracing::instrument(skip(self, patch))]
    pub async fn update_customer(
        &self,
        id: &CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer> {
        if let Some(name) = &patch.name {
            require_name(name, "Customer")?;
        }

        let mut state = self.lock_open().await?;
        let customer = state
            .collections
            .customers
            .iter_mut()
            .find(|c| &c.id == id)
            .ok_or_else(|| StoreError::CustomerNotFound(id.clone()))?;
        patch.apply(customer);
        let customer = customer.clone();

        state.push_notification(
            Severity::Info,
            format!("Customer \"{}\" updated", customer.name),
        );
        self.commit(&state, "update_customer", [WriteRequest::Save(customer.clone().into())])
            .await;
        Ok(customer)
    }

    /// Removes a customer. Their past sales keep the captured name.
    #[tracing::instrument(skip(self))]
    pub async fn delete_customer(&self, id: &CustomerId) -> Result<Customer> {
        let mut state = self.lock_open().await?;
        let index = state
            .collections
            .customers
            .iter()
            .position(|c| &c.id == id)
            .ok_or_else(|| StoreError::CustomerNotFound(id.clone()))?;
        let customer = state.collections.customers.remove(index);

        state.push_notification(
            Severity::Warning,
            format!("Customer \"{}\" deleted", customer.name),
        );
        let write = WriteRequest::Remove {
            collection: Collection::Customers,
            id: id.to_string(),
        };
        self.commit(&state, "delete_customer", [write]).await;
        Ok(customer)
    }

    // -- sales --

    /// Records a sale and takes the sold units out of stock.
    ///
    /// Prices and names are captured from the catalogue at this moment.
    /// Stock never drops below zero, and lines for unknown products leave
    /// the catalogue alone. The draft is not validated here; see
    /// [`InventoryStore::create_validated_sale`].
    #[tracing::instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create_sale_order(&self, draft: SaleDraft) -> Result<Sale> {
        let mut state = self.lock_open().await?;
        Ok(self.record_sale(&mut state, draft).await)
    }

    /// Validates a draft against current stock and records it, both under
    /// one lock, so concurrent drafts cannot sell the same units twice.
    ///
    /// Returns [`StoreError::InvalidSale`] with every issue found, leaving
    /// the store unchanged.
    #[tracing::instrument(skip(self, draft), fields(items = draft.items.len()))]
    pub async fn create_validated_sale(&self, draft: SaleDraft) -> Result<Sale> {
        let mut state = self.lock_open().await?;
        let issues = projections::validate_sale(&draft, &state.collections.products);
        if !issues.is_empty() {
            return Err(StoreError::InvalidSale(issues));
        }
        Ok(self.record_sale(&mut state, draft).await)
    }

    async fn record_sale(&self, state: &mut StoreState, draft: SaleDraft) -> Sale {
        let sale = Sale::capture(
            draft,
            SaleId::generate(),
            &state.collections.products,
            &state.collections.customers,
            Utc::now(),
        );
        state.collections.sales.insert(0, sale.clone());

        let mut adjusted: Vec<ProductId> = Vec::new();
        for item in &sale.items {
            if let Some(product) = state
                .collections
                .products
                .iter_mut()
                .find(|p| p.id == item.product_id)
            {
                product.take_stock(item.quantity);
                if !adjusted.contains(&product.id) {
                    adjusted.push(product.id.clone());
                }
            }
        }

        let mut writes = vec![WriteRequest::Save(sale.clone().into())];
        writes.extend(
            state
                .collections
                .products
                .iter()
                .filter(|p| adjusted.contains(&p.id))
                .map(|p| WriteRequest::Save(p.clone().into())),
        );

        state.push_notification(
            Severity::Success,
            format!("Sale {} recorded: {}", sale.id, sale.total_amount),
        );
        self.commit(state, "create_sale_order", writes).await;
        sale
    }

    /// Lists what would keep a draft from being a sensible sale.
    pub async fn validate_sale(&self, draft: &SaleDraft) -> Vec<SaleIssue> {
        let state = self.shared.state.read().await;
        projections::validate_sale(draft, &state.collections.products)
    }

    // -- reads --

    pub async fn snapshot(&self) -> StoreSnapshot {
        self.shared.state.read().await.snapshot()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.shared.state.read().await.collections.products.clone()
    }

    pub async fn customers(&self) -> Vec<Customer> {
        self.shared.state.read().await.collections.customers.clone()
    }

    /// All sales, newest first.
    pub async fn sales(&self) -> Vec<Sale> {
        self.shared.state.read().await.collections.sales.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.shared.state.read().await.notifications.to_vec()
    }

    pub async fn product(&self, id: &ProductId) -> Result<Product> {
        let state = self.shared.state.read().await;
        state
            .collections
            .products
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| StoreError::ProductNotFound(id.clone()))
    }

    pub async fn sale(&self, id: &SaleId) -> Result<Sale> {
        let state = self.shared.state.read().await;
        state
            .collections
            .sales
            .iter()
            .find(|s| &s.id == id)
            .cloned()
            .ok_or_else(|| StoreError::SaleNotFound(id.clone()))
    }

    pub async fn get_low_stock_products(&self) -> Vec<Product> {
        projections::low_stock(&self.shared.state.read().await.collections.products)
    }

    pub async fn get_out_of_stock_products(&self) -> Vec<Product> {
        projections::out_of_stock(&self.shared.state.read().await.collections.products)
    }

    pub async fn get_filtered_products(&self, filters: &ProductFilters) -> Vec<Product> {
        projections::filter_products(&self.shared.state.read().await.collections.products, filters)
    }

    pub async fn get_inventory_stats(&self) -> InventoryStats {
        projections::inventory_stats(&self.shared.state.read().await.collections.products)
    }

    pub async fn search_customers(&self, term: &str) -> Vec<Customer> {
        projections::search_customers(&self.shared.state.read().await.collections.customers, term)
    }

    pub async fn search_sales(&self, term: &str) -> Vec<Sale> {
        projections::search_sales(&self.shared.state.read().await.collections.sales, term)
    }

    pub async fn recent_sales(&self, limit: usize) -> Vec<Sale> {
        projections::recent_sales(&self.shared.state.read().await.collections.sales, limit)
    }

    /// Key metrics, daily trend, the `top_n` best sellers and the payment mix.
    pub async fn sales_report(&self, top_n: usize) -> SalesReport {
        let state = self.shared.state.read().await;
        let collections = &state.collections;
        projections::sales_report(
            &collections.products,
            &collections.customers,
            &collections.sales,
            top_n,
        )
    }

    // -- notifications and subscriptions --

    /// Queues a notification.
    pub async fn notify(&self, severity: Severity, message: impl Into<String>) -> Notification {
        self.shared.notify(severity, message.into()).await
    }

    /// Removes a notification once it has been shown.
    pub async fn dismiss_notification(&self, id: NotificationId) -> Option<Notification> {
        let mut state = self.shared.state.write().await;
        let removed = state.notifications.remove(id)?;
        self.shared.subscribers.publish(|| state.snapshot()).await;
        Some(removed)
    }

    /// The notification to display now: the oldest one queued.
    pub async fn current_notification(&self) -> Option<Notification> {
        self.shared.state.read().await.notifications.current().cloned()
    }

    /// Registers a listener called with a new snapshot after every change.
    pub async fn subscribe(
        &self,
        listener: impl Fn(&StoreSnapshot) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let listener: Listener = Arc::new(listener);
        self.shared.subscribers.add(listener).await
    }

    /// Removes a listener. Returns false if it was not registered.
    pub async fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.subscribers.remove(id).await
    }

    // -- lifecycle --

    /// Waits until every write queued so far has been attempted.
    pub async fn flush(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        self.writes
            .send(WriteRequest::Flush(done))
            .map_err(|_| StoreError::Closed)?;
        wait.await.map_err(|_| StoreError::Closed)
    }

    /// Rejects further mutations, drains queued writes and stops the worker.
    ///
    /// Calling it again is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        let (done, wait) = oneshot::channel();
        let sent = {
            let _state = self.shared.state.write().await;
            if self.closed.swap(true, Ordering::SeqCst) {
                return Ok(());
            }
            self.writes.send(WriteRequest::Shutdown(done)).is_ok()
        };
        if sent {
            let _ = wait.await;
        }
        if let Some(handle) = self.worker.lock().await.take()
            && let Err(e) = handle.await
        {
            tracing::error!(error = %e, "persistence worker panicked");
        }
        tracing::info!("store shut down");
        Ok(())
    }

    /// Takes the state lock for a mutation. Checked under the lock so a
    /// change either lands before the worker's shutdown request or not at all.
    async fn lock_open(&self) -> Result<RwLockWriteGuard<'_, StoreState>> {
        let state = self.shared.state.write().await;
        if self.closed.load(Ordering::SeqCst) {
            return Err(StoreError::Closed);
        }
        Ok(state)
    }

    /// Publishes the new state and queues its writes. Called with the state
    /// lock held so that subscribers and storage see changes in order.
    async fn commit(
        &self,
        state: &StoreState,
        operation: &'static str,
        writes: impl IntoIterator<Item = WriteRequest>,
    ) {
        metrics::counter!("store_mutations_total", "operation" => operation).increment(1);
        self.shared.subscribers.publish(|| state.snapshot()).await;

        for write in writes {
            if self.writes.send(write).is_err() {
                tracing::error!(operation, "persistence worker is gone, change kept in memory only");
            }
        }
    }
}

fn require_name(name: &str, what: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::Validation(format!("{what} name is required")));
    }
    Ok(())
}
