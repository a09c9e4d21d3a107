//! Engine error types.
//!
//! Every failure the pipeline can surface has its own family here, and
//! [`EngineError`] carries a stable machine-readable code for each variant so
//! callers can tell "results not ready" apart from "service unavailable"
//! without string matching.

use thiserror::Error;

use crate::model::Phase;

/// A submission was rejected before scoring.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A configured phase has no answers in the submission.
    #[error("missing answers for {0}")]
    MissingPhase(Phase),

    /// A phase's answers do not fit its definition.
    #[error("malformed answers for {phase}: {reason}")]
    MalformedAnswerSet { phase: String, reason: String },

    /// The candidate identifier is empty or badly formed.
    #[error("unknown candidate id {0:?}")]
    UnknownCandidate(String),
}

/// Scores could not be combined into a result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoringError {
    /// Not every configured phase has a score.
    #[error("scores missing for: {}", join_phases(.missing))]
    IncompletePhaseSet { missing: Vec<Phase> },
}

fn join_phases(phases: &[Phase]) -> String {
    phases
        .iter()
        .map(|p| p.label())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Errors from a result store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A result already exists and the store does not overwrite.
    #[error("a result already exists for candidate {0}")]
    DuplicateCandidate(String),

    /// No result has been stored for this candidate.
    #[error("no result for candidate {0}")]
    NotFound(String),

    /// The store could not be reached in time or failed to do I/O.
    #[error("result store unavailable: {0}")]
    Unavailable(String),

    /// A stored record exists but cannot be decoded.
    #[error("stored result for candidate {candidate_id} is corrupt: {reason}")]
    Corrupt {
        candidate_id: String,
        reason: String,
    },
}

impl StoreError {
    /// Returns `true` if the caller may retry the same request.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// Errors from roadmap generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoadmapError {
    /// No result has been stored for the candidate yet.
    #[error("result for candidate {0} is not ready")]
    ResultNotReady(String),

    /// The recommender itself failed.
    #[error("roadmap generation failed: {0}")]
    Failed(String),
}

/// Any error the engine surfaces to its caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Roadmap(#[from] RoadmapError),
}

impl EngineError {
    /// Stable code the presentation layer maps to a user-facing message.
    pub fn code(&self) -> &'static str {
        match self {
            EngineError::Validation(ValidationError::MissingPhase(_)) => "missing_phase",
            EngineError::Validation(ValidationError::MalformedAnswerSet { .. }) => {
                "malformed_answer_set"
            }
            EngineError::Validation(ValidationError::UnknownCandidate(_)) => "unknown_candidate",
            EngineError::Scoring(ScoringError::IncompletePhaseSet { .. }) => {
                "incomplete_phase_set"
            }
            EngineError::Store(StoreError::DuplicateCandidate(_)) => "duplicate_candidate",
            EngineError::Store(StoreError::NotFound(_)) => "not_found",
            EngineError::Store(StoreError::Unavailable(_)) => "store_unavailable",
            EngineError::Store(StoreError::Corrupt { .. }) => "store_corrupt",
            EngineError::Roadmap(RoadmapError::ResultNotReady(_)) => "result_not_ready",
            EngineError::Roadmap(RoadmapError::Failed(_)) => "roadmap_failed",
        }
    }

    /// Returns `true` only for conditions the caller may retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, EngineError::Store(e) if e.is_retryable())
    }
}

/// The phase table is misconfigured. Raised at startup only.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("no definition for {0}")]
    MissingPhase(Phase),

    #[error("{0} is defined more than once")]
    DuplicatePhase(Phase),

    #[error("{0} has no questions")]
    EmptyPhase(Phase),

    #[error("{phase}: answer key has {actual} entries but question_count is {expected}")]
    AnswerKeyLength {
        phase: Phase,
        expected: u32,
        actual: usize,
    },

    #[error("{0}: reward must be positive")]
    NonPositiveReward(Phase),

    #[error("{phase}: weight must be finite and non-negative, got {weight}")]
    InvalidWeight { phase: Phase, weight: f64 },

    #[error("{0}: options list is empty")]
    EmptyOptions(Phase),

    #[error("{phase}: answer key for question {index} ({key:?}) is not among the options")]
    KeyOutsideOptions {
        phase: Phase,
        index: usize,
        key: String,
    },

    #[error("{phase}: invalid feedback bands: {reason}")]
    InvalidBands { phase: Phase, reason: String },

    #[error("invalid default feedback bands: {0}")]
    InvalidDefaultBands(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let errors: Vec<EngineError> = vec![
            ValidationError::MissingPhase(Phase::Verbal).into(),
            ValidationError::MalformedAnswerSet {
                phase: "x".into(),
                reason: "y".into(),
            }
            .into(),
            ValidationError::UnknownCandidate(String::new()).into(),
            ScoringError::IncompletePhaseSet { missing: vec![] }.into(),
            StoreError::DuplicateCandidate("c".into()).into(),
            StoreError::NotFound("c".into()).into(),
            StoreError::Unavailable("down".into()).into(),
            StoreError::Corrupt {
                candidate_id: "c".into(),
                reason: "bad".into(),
            }
            .into(),
            RoadmapError::ResultNotReady("c".into()).into(),
            RoadmapError::Failed("boom".into()).into(),
        ];
        let mut codes: Vec<&str> = errors.iter().map(EngineError::code).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(EngineError::from(StoreError::Unavailable("timeout".into())).is_retryable());
        assert!(!EngineError::from(StoreError::NotFound("c".into())).is_retryable());
        assert!(!EngineError::from(StoreError::DuplicateCandidate("c".into())).is_retryable());
        assert!(!EngineError::from(ValidationError::MissingPhase(Phase::Aptitude)).is_retryable());
    }

    #[test]
    fn incomplete_phase_set_lists_labels() {
        let err = ScoringError::IncompletePhaseSet {
            missing: vec![Phase::Verbal, Phase::DomainSpecific],
        };
        assert_eq!(
            err.to_string(),
            "scores missing for: Phase 2 - Verbal, Phase 3 - Domain-Specific"
        );
    }
}
