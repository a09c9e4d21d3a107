//! The assessment result record and its retrieval view.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::aggregate;
use crate::error::ScoringError;
use crate::feedback;
use crate::model::{Phase, PhaseScore, PhaseTable};

/// The immutable outcome of one candidate's completed assessment.
///
/// Built only by [`AssessmentResult::assemble`], which enforces that the
/// score and feedback maps cover exactly the configured phases. Stores hand
/// out clones; nothing mutates a result after assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    record_id: Uuid,
    candidate_id: String,
    candidate_name: String,
    domain: String,
    scores: BTreeMap<Phase, PhaseScore>,
    overall_score: f64,
    feedback: BTreeMap<Phase, String>,
    version: u32,
    created_at: DateTime<Utc>,
}

/// Who a result belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub name: String,
    pub domain: String,
}

impl AssessmentResult {
    /// Join point of the pipeline: aggregate the phase scores and derive
    /// per-phase feedback, producing version 1 of the candidate's result.
    pub fn assemble(
        table: &PhaseTable,
        candidate: Candidate,
        scores: BTreeMap<Phase, PhaseScore>,
    ) -> Result<Self, ScoringError> {
        let overall_score = aggregate(table, &scores)?;
        let feedback = table
            .iter()
            .map(|def| (def.phase, feedback::feedback(def, &scores[&def.phase])))
            .collect();

        Ok(Self {
            record_id: Uuid::new_v4(),
            candidate_id: candidate.id,
            candidate_name: candidate.name,
            domain: candidate.domain,
            scores,
            overall_score,
            feedback,
            version: 1,
            created_at: Utc::now(),
        })
    }

    /// A copy of this result stamped with a different version number.
    pub fn as_version(&self, version: u32) -> Self {
        Self {
            version,
            ..self.clone()
        }
    }

    pub fn record_id(&self) -> Uuid {
        self.record_id
    }

    pub fn candidate_id(&self) -> &str {
        &self.candidate_id
    }

    pub fn candidate_name(&self) -> &str {
        &self.candidate_name
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn scores(&self) -> &BTreeMap<Phase, PhaseScore> {
        &self.scores
    }

    pub fn score(&self, phase: Phase) -> Option<&PhaseScore> {
        self.scores.get(&phase)
    }

    pub fn overall_score(&self) -> f64 {
        self.overall_score
    }

    pub fn feedback(&self) -> &BTreeMap<Phase, String> {
        &self.feedback
    }

    pub fn feedback_for(&self, phase: Phase) -> Option<&str> {
        self.feedback.get(&phase).map(String::as_str)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The retrieval shape handed to report, PDF, and roadmap consumers.
    pub fn view(&self) -> ResultView {
        ResultView::from(self)
    }
}

/// Result as served to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultView {
    pub candidate_name: String,
    pub domain: String,
    /// Raw score per phase.
    pub scores: BTreeMap<Phase, i64>,
    pub overall_score: f64,
    pub feedback: BTreeMap<Phase, String>,
}

impl From<&AssessmentResult> for ResultView {
    fn from(result: &AssessmentResult) -> Self {
        Self {
            candidate_name: result.candidate_name.clone(),
            domain: result.domain.clone(),
            scores: result
                .scores
                .iter()
                .map(|(phase, score)| (*phase, score.raw))
                .collect(),
            overall_score: result.overall_score,
            feedback: result.feedback.clone(),
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::engine::evaluate;
    use crate::model::fixtures::{submission, table};

    /// A freshly evaluated result against the standard table.
    pub fn result(candidate_id: &str) -> AssessmentResult {
        let table = table();
        evaluate(&table, &submission(&table, candidate_id, [(15, 5), (8, 2), (5, 0)])).unwrap()
    }
}
