//! In-process result store.

use async_trait::async_trait;

use assessor_core::error::StoreError;
use assessor_core::results::AssessmentResult;
use assessor_core::traits::ResultStore;

use crate::locks::KeyedLocks;
use crate::policy::OverwritePolicy;

/// Keeps results in memory for the life of the process.
///
/// Each candidate's versions live behind their own lock, so the lock is the
/// data: a `put` holds the write half while it applies the overwrite policy.
#[derive(Debug, Default)]
pub struct MemoryStore {
    policy: OverwritePolicy,
    records: KeyedLocks<Vec<AssessmentResult>>,
}

impl MemoryStore {
    pub fn new(policy: OverwritePolicy) -> Self {
        Self {
            policy,
            records: KeyedLocks::new(),
        }
    }

    pub fn policy(&self) -> OverwritePolicy {
        self.policy
    }

    async fn versions(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        let not_found = || StoreError::NotFound(candidate_id.to_string());
        let slot = self.records.existing(candidate_id).ok_or_else(not_found)?;
        let versions = slot.read().await;
        if versions.is_empty() {
            return Err(not_found());
        }
        Ok(versions.clone())
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn put(&self, result: AssessmentResult) -> Result<AssessmentResult, StoreError> {
        let mut versions = self.records.write(result.candidate_id()).await;
        self.policy.apply(&mut versions, result)
    }

    async fn get(&self, candidate_id: &str) -> Result<AssessmentResult, StoreError> {
        let slot = self
            .records
            .existing(candidate_id)
            .ok_or_else(|| StoreError::NotFound(candidate_id.to_string()))?;
        let versions = slot.read().await;
        versions
            .last()
            .cloned()
            .ok_or_else(|| StoreError::NotFound(candidate_id.to_string()))
    }

    async fn history(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        self.versions(candidate_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::testing::result;

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::default();
        let stored = store.put(result("cand-1", 7)).await.unwrap();
        assert_eq!(store.get("cand-1").await.unwrap(), stored);
        assert_eq!(store.name(), "memory");
    }

    #[tokio::test]
    async fn get_unknown_is_not_found() {
        let store = MemoryStore::default();
        assert_eq!(
            store.get("nobody").await.unwrap_err(),
            StoreError::NotFound("nobody".into())
        );
        assert!(store.history("nobody").await.is_err());
    }

    #[tokio::test]
    async fn rejected_duplicate_keeps_original() {
        let store = MemoryStore::new(OverwritePolicy::Reject);
        let first = store.put(result("cand-1", 7)).await.unwrap();
        let err = store.put(result("cand-1", 9)).await.unwrap_err();
        assert_eq!(err, StoreError::DuplicateCandidate("cand-1".into()));
        assert_eq!(store.get("cand-1").await.unwrap(), first);
    }

    #[tokio::test]
    async fn versioned_history() {
        let store = MemoryStore::new(OverwritePolicy::Version);
        store.put(result("cand-1", 3)).await.unwrap();
        let latest = store.put(result("cand-1", 8)).await.unwrap();
        assert_eq!(latest.version(), 2);
        assert_eq!(store.get("cand-1").await.unwrap(), latest);
        assert_eq!(store.history("cand-1").await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn concurrent_distinct_candidates() {
        let store = Arc::new(MemoryStore::default());
        let puts = (0..20).map(|i| {
            let store = Arc::clone(&store);
            async move { store.put(result(&format!("cand-{i}"), 5)).await }
        });
        let outcomes = futures::future::join_all(puts).await;
        assert!(outcomes.iter().all(Result::is_ok));
        for i in 0..20 {
            assert!(store.get(&format!("cand-{i}")).await.is_ok());
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_same_candidate_has_one_winner() {
        let store = Arc::new(MemoryStore::new(OverwritePolicy::Reject));
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.put(result("cand-1", i)).await })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert_eq!(e, StoreError::DuplicateCandidate("cand-1".into())),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(store.history("cand-1").await.unwrap().len(), 1);
    }
}
