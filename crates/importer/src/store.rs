use core_types::{Product, UpsertOutcome};
use database::{DbError, ProductWriter};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The single write-capable store handle shared by all import tasks.
///
/// Every write goes through one async mutex, so the underlying store never
/// sees two writers at once. The lock is held for exactly one upsert and is
/// released when the guard drops, whether the statement succeeded or not.
pub struct SharedStore<W> {
    writer: Arc<Mutex<W>>,
}

impl<W> Clone for SharedStore<W> {
    fn clone(&self) -> Self {
        Self {
            writer: Arc::clone(&self.writer),
        }
    }
}

impl<W: ProductWriter> SharedStore<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub async fn upsert(&self, product: &Product) -> Result<UpsertOutcome, DbError> {
        let writer = self.writer.lock().await;
        writer.upsert_product(product).await
    }
}
