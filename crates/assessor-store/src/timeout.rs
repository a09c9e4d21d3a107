//! Bounded-latency wrapper for any result store.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use assessor_core::error::StoreError;
use assessor_core::results::AssessmentResult;
use assessor_core::traits::ResultStore;

/// Default per-call budget.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Bounds every call on the inner store. A call that runs out of time fails
/// with `StoreError::Unavailable`; it is not retried.
#[derive(Debug)]
pub struct TimeoutStore<S> {
    inner: S,
    timeout: Duration,
}

impl<S: ResultStore> TimeoutStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    async fn bounded<T: Send>(
        &self,
        op: &str,
        fut: impl Future<Output = Result<T, StoreError>> + Send,
    ) -> Result<T, StoreError> {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(outcome) => outcome,
            Err(_) => {
                tracing::warn!(
                    store = self.inner.name(),
                    op,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "store call timed out"
                );
                Err(StoreError::Unavailable(format!(
                    "{} store {op} timed out after {}ms",
                    self.inner.name(),
                    self.timeout.as_millis()
                )))
            }
        }
    }
}

#[async_trait]
impl<S: ResultStore> ResultStore for TimeoutStore<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put(&self, result: AssessmentResult) -> Result<AssessmentResult, StoreError> {
        self.bounded("put", self.inner.put(result)).await
    }

    async fn get(&self, candidate_id: &str) -> Result<AssessmentResult, StoreError> {
        self.bounded("get", self.inner.get(candidate_id)).await
    }

    async fn history(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        self.bounded("history", self.inner.history(candidate_id)).await
    }
}
