//! Central assessment engine.
//!
//! Runs a submission through validation, per-phase scoring, aggregation and
//! feedback, then hands the assembled result to the store. Nothing is
//! persisted unless every earlier stage succeeded.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::{EngineError, RoadmapError, StoreError};
use crate::model::{PhaseTable, Submission};
use crate::results::{AssessmentResult, Candidate};
use crate::scorer::score;
use crate::traits::{ResultStore, RoadmapRecommender};
use crate::validator::validate;

/// Validate and score a submission without persisting it.
pub fn evaluate(table: &PhaseTable, submission: &Submission) -> Result<AssessmentResult, EngineError> {
    let validated = validate(table, submission)?;

    // Phases are independent; scored in phase order.
    let scores: BTreeMap<_, _> = table
        .iter()
        .map(|def| {
            let phase_score = score(def, &validated.answers[&def.phase]);
            tracing::debug!(
                candidate = %validated.candidate_id,
                phase = %def.phase,
                raw = phase_score.raw,
                correct = phase_score.correct,
                wrong = phase_score.wrong,
                unanswered = phase_score.unanswered,
                "phase scored"
            );
            (def.phase, phase_score)
        })
        .collect();

    let candidate = Candidate {
        id: validated.candidate_id,
        name: validated.candidate_name,
        domain: validated.domain,
    };
    Ok(AssessmentResult::assemble(table, candidate, scores)?)
}

/// The assessment engine: a phase table plus the store results land in.
#[derive(Clone)]
pub struct AssessmentEngine {
    table: Arc<PhaseTable>,
    store: Arc<dyn ResultStore>,
}

impl AssessmentEngine {
    pub fn new(table: Arc<PhaseTable>, store: Arc<dyn ResultStore>) -> Self {
        Self { table, store }
    }

    pub fn table(&self) -> &PhaseTable {
        &self.table
    }

    pub fn store(&self) -> &dyn ResultStore {
        self.store.as_ref()
    }

    /// Score a submission without storing it.
    pub fn evaluate(&self, submission: &Submission) -> Result<AssessmentResult, EngineError> {
        evaluate(&self.table, submission)
    }

    /// Score a submission and persist the result.
    pub async fn submit(&self, submission: &Submission) -> Result<AssessmentResult, EngineError> {
        let result = self.evaluate(submission)?;
        let candidate_id = result.candidate_id().to_string();

        match self.store.put(result).await {
            Ok(stored) => {
                tracing::info!(
                    candidate = %candidate_id,
                    version = stored.version(),
                    overall = stored.overall_score(),
                    store = self.store.name(),
                    "result stored"
                );
                Ok(stored)
            }
            Err(e) => {
                tracing::warn!(candidate = %candidate_id, "failed to store result: {e}");
                Err(e.into())
            }
        }
    }

    /// Fetch the stored result for a candidate.
    pub async fn result(&self, candidate_id: &str) -> Result<AssessmentResult, EngineError> {
        Ok(self.store.get(candidate_id).await?)
    }

    /// All stored versions for a candidate, oldest first.
    pub async fn history(&self, candidate_id: &str) -> Result<Vec<AssessmentResult>, EngineError> {
        Ok(self.store.history(candidate_id).await?)
    }

    /// Produce a roadmap from the candidate's stored result.
    ///
    /// A candidate without a stored result yields
    /// [`RoadmapError::ResultNotReady`] rather than a not-found store error.
    pub async fn roadmap<R: RoadmapRecommender>(
        &self,
        candidate_id: &str,
        recommender: &R,
    ) -> Result<R::Plan, EngineError> {
        let result = match self.store.get(candidate_id).await {
            Ok(result) => result,
            Err(StoreError::NotFound(id)) => return Err(RoadmapError::ResultNotReady(id).into()),
            Err(e) => return Err(e.into()),
        };
        Ok(recommender.recommend(&result)?)
    }
}
