use crate::error::ApiError;
use crate::ProductSource;
use async_trait::async_trait;
use core_types::ExternalProduct;
use std::future::Future;
use std::time::Duration;

/// Wraps another `ProductSource` with a bounded retry policy.
///
/// Only transient failures (transport errors and 5xx statuses) are retried.
/// `max_attempts` counts the first call, so `1` behaves exactly like the
/// wrapped source.
#[derive(Debug, Clone)]
pub struct RetryingSource<S> {
    inner: S,
    max_attempts: u32,
    backoff: Duration,
}

impl<S: ProductSource> RetryingSource<S> {
    pub fn new(inner: S, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    async fn with_retry<T, F, Fut>(&self, operation: &str, mut call: F) -> Result<T, ApiError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut attempt = 1;
        loop {
            match call().await {
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    tracing::warn!(
                        operation,
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "Catalog request failed, retrying."
                    );
                    tokio::time::sleep(self.backoff).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

#[async_trait]
impl<S: ProductSource> ProductSource for RetryingSource<S> {
    async fn fetch_all(&self) -> Result<Vec<ExternalProduct>, ApiError> {
        self.with_retry("fetch_all", || self.inner.fetch_all()).await
    }

    async fn fetch_one(&self, id: i64) -> Result<ExternalProduct, ApiError> {
        self.with_retry("fetch_one", || self.inner.fetch_one(id)).await
    }
}
