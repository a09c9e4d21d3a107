//! Core trait definitions for result stores and roadmap recommenders.
//!
//! Stores are implemented by the `assessor-store` crate; a reference
//! recommender lives in `assessor-report`.

use async_trait::async_trait;

use crate::error::{RoadmapError, StoreError};
use crate::results::AssessmentResult;

// ---------------------------------------------------------------------------
// Result store trait
// ---------------------------------------------------------------------------

/// Durable storage for assessment results, keyed by candidate id.
///
/// Implementations serialize writes and reads per candidate so a reader never
/// observes a half-written result, while different candidates proceed
/// independently.
#[async_trait]
pub trait ResultStore: Send + Sync {
    /// Human-readable backend name (e.g. "file").
    fn name(&self) -> &str;

    /// Persist a result and return the record as stored.
    ///
    /// Fails with [`StoreError::DuplicateCandidate`] when a result already
    /// exists and the store is not configured to replace or version it.
    async fn put(&self, result: AssessmentResult) -> Result<AssessmentResult, StoreError>;

    /// Fetch the current result for a candidate.
    async fn get(&self, candidate_id: &str) -> Result<AssessmentResult, StoreError>;

    /// Every stored version for a candidate, oldest first.
    ///
    /// Stores that keep no history return just the current record.
    async fn history(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, StoreError> {
        Ok(vec![self.get(candidate_id).await?])
    }
}

// ---------------------------------------------------------------------------
// Roadmap recommender trait
// ---------------------------------------------------------------------------

/// Derives a learning plan from a completed result.
///
/// The plan type is owned by the implementation; the engine only routes the
/// result to it.
pub trait RoadmapRecommender: Send + Sync {
    type Plan;

    fn recommend(&self, result: &AssessmentResult) -> Result<Self::Plan, RoadmapError>;
}
