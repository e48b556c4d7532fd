//! # Catalog Importer
//!
//! Pulls products from a `ProductSource`, converts their prices to minor
//! units, and upserts them through a `SharedStore`.
//!
//! A batch import fetches the listing once and then processes every record in
//! its own tokio task, with at most `max_concurrency` tasks in flight. Fetching
//! and transforming run in parallel; the writes themselves are serialized by
//! the store lock. A record that fails to persist is logged and counted, and
//! never stops its siblings. A single-record import has no siblings, so any
//! failure is returned to the caller.

use api_client::ProductSource;
use core_types::{ImportSummary, UpsertOutcome};
use database::ProductWriter;
use futures::stream::{self, StreamExt};
use indicatif::ProgressBar;

pub mod error;
pub mod store;
pub mod transform;

pub use error::ImportError;
pub use store::SharedStore;
pub use transform::{to_minor_units, transform};

/// Orchestrates fetching, transformation and persistence of catalog products.
pub struct ProductImporter<S, W> {
    source: S,
    store: SharedStore<W>,
    max_concurrency: usize,
    progress: ProgressBar,
}

impl<S, W> ProductImporter<S, W>
where
    S: ProductSource,
    W: ProductWriter + 'static,
{
    /// `max_concurrency` is clamped to at least one worker.
    pub fn new(source: S, store: SharedStore<W>, max_concurrency: usize) -> Self {
        Self {
            source,
            store,
            max_concurrency: max_concurrency.max(1),
            progress: ProgressBar::hidden(),
        }
    }

    /// Reports per-record progress of `import_all` on `progress`.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    /// Imports the whole catalog listing.
    ///
    /// Fails only if the listing itself cannot be fetched or decoded. Once the
    /// listing is in hand, every record is attempted and the call returns after
    /// the last one finishes, with per-record failures reflected in the summary.
    pub async fn import_all(&self) -> Result<ImportSummary, ImportError> {
        let records = self.source.fetch_all().await?;
        tracing::info!(
            count = records.len(),
            max_concurrency = self.max_concurrency,
            "Fetched catalog listing."
        );
        self.progress.set_length(records.len() as u64);

        // Tasks are spawned lazily as slots free up, so at most
        // `max_concurrency` exist at any moment.
        let mut outcomes = stream::iter(records)
            .map(|record| {
                let store = self.store.clone();
                let id = record.id;
                let handle = tokio::spawn(async move {
                    let product = transform::transform(record);
                    store.upsert(&product).await
                });
                async move { (id, handle.await) }
            })
            .buffer_unordered(self.max_concurrency);

        let mut summary = ImportSummary::default();
        while let Some((id, joined)) = outcomes.next().await {
            match joined {
                Ok(Ok(outcome)) => {
                    tracing::debug!(id, ?outcome, "Product stored.");
                    summary.record(outcome);
                }
                Ok(Err(e)) => {
                    tracing::error!(id, error = %e, "Failed to store product.");
                    summary.record_failure();
                }
                Err(e) => {
                    tracing::error!(id, error = %e, "Import task did not complete.");
                    summary.record_failure();
                }
            }
            self.progress.inc(1);
        }

        self.progress.finish_with_message("Import complete!");
        tracing::info!(%summary, "Catalog import completed.");
        Ok(summary)
    }

    /// Imports a single product by its catalog id.
    pub async fn import_one(&self, id: i64) -> Result<UpsertOutcome, ImportError> {
        let record = self.source.fetch_one(id).await?;
        let product = transform::transform(record);
        let outcome = self.store.upsert(&product).await?;

        tracing::info!(id, ?outcome, "Product imported.");
        Ok(outcome)
    }
}
