//! Background task writing store changes to the persistence adapter.
//!
//! Writes are consumed from an unbounded channel one at a time, so they land
//! in the order the store issued them. A failing write is retried with a
//! fixed pause; once the attempts are used up an error notification is
//! raised and the worker moves on. In-memory state is never rolled back.

use std::sync::Arc;
use std::time::Duration;

use domain::Severity;
use storage::{Collection, PersistenceAdapter, Record};
use tokio::sync::{mpsc, oneshot};

use crate::store::Shared;

pub(crate) enum WriteRequest {
    Save(Record),
    Remove { collection: Collection, id: String },
    /// Answered once every earlier request has been attempted.
    Flush(oneshot::Sender<()>),
    /// Like `Flush`, then stops the worker.
    Shutdown(oneshot::Sender<()>),
}

pub(crate) struct PersistenceWorker {
    adapter: Arc<dyn PersistenceAdapter>,
    shared: Arc<Shared>,
    max_attempts: u32,
    backoff: Duration,
}

impl PersistenceWorker {
    pub(crate) fn new(
        adapter: Arc<dyn PersistenceAdapter>,
        shared: Arc<Shared>,
        max_attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            adapter,
            shared,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Runs until shut down or until every sender is dropped.
    pub(crate) async fn run(self, mut rx: mpsc::UnboundedReceiver<WriteRequest>) {
        tracing::info!(adapter = self.adapter.name(), "persistence worker started");

        while let Some(request) = rx.recv().await {
            match request {
                WriteRequest::Save(record) => {
                    let what = format!("{} {}", record.collection(), record.id());
                    self.write(&what, || self.adapter.save(&record)).await;
                }
                WriteRequest::Remove { collection, id } => {
                    let what = format!("{collection} {id}");
                    self.write(&what, || self.adapter.remove(collection, &id)).await;
                }
                WriteRequest::Flush(done) => {
                    let _ = done.send(());
                }
                WriteRequest::Shutdown(done) => {
                    let _ = done.send(());
                    break;
                }
            }
        }

        tracing::info!("write queue closed, persistence worker stopping");
    }

    async fn write<F, Fut>(&self, what: &str, attempt_write: F)
    where
        F: Fn() -> Fut,
        Fut: Future<Output = storage::Result<()>>,
    {
        let start = std::time::Instant::now();
        let mut attempt = 1;
        loop {
            match attempt_write().await {
                Ok(()) => {
                    metrics::counter!("persistence_writes_total").increment(1);
                    metrics::histogram!("persistence_write_duration_seconds")
                        .record(start.elapsed().as_secs_f64());
                    tracing::debug!(record = what, attempt, "record written");
                    return;
                }
                Err(e) if attempt < self.max_attempts => {
                    tracing::warn!(record = what, attempt, error = %e, "write failed, retrying");
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                Err(e) => {
                    metrics::counter!("persistence_failures_total").increment(1);
                    tracing::error!(record = what, attempts = attempt, error = %e, "write failed, giving up");
                    self.shared
                        .notify(
                            Severity::Error,
                            format!("Failed to save {what} after {attempt} attempts: {e}"),
                        )
                        .await;
                    return;
                }
            }
        }
    }
}
