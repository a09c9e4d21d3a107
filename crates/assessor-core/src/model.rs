//! Core data model types for assessor.
//!
//! These are the fundamental types the scoring pipeline passes around:
//! phases, phase definitions, raw submissions, and validated answer sets.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ConfigError;
use crate::feedback::FeedbackBands;

/// One scored section of the assessment.
///
/// The set is closed: every phase table defines exactly these three, and the
/// derived ordering is the order phases are taken, scored, and reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    Aptitude,
    Verbal,
    DomainSpecific,
}

impl Phase {
    /// All phases in assessment order.
    pub const ALL: [Phase; 3] = [Phase::Aptitude, Phase::Verbal, Phase::DomainSpecific];

    /// Canonical label used on the wire and in reports.
    pub fn label(self) -> &'static str {
        match self {
            Phase::Aptitude => "Phase 1 - Aptitude",
            Phase::Verbal => "Phase 2 - Verbal",
            Phase::DomainSpecific => "Phase 3 - Domain-Specific",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if let Some(phase) = Phase::ALL.into_iter().find(|p| p.label() == trimmed) {
            return Ok(phase);
        }
        match trimmed.to_lowercase().as_str() {
            "aptitude" | "phase 1" => Ok(Phase::Aptitude),
            "verbal" | "phase 2" => Ok(Phase::Verbal),
            "domain" | "domain-specific" | "domain_specific" | "phase 3" => {
                Ok(Phase::DomainSpecific)
            }
            _ => Err(format!("unknown phase: {trimmed}")),
        }
    }
}

// Serialized as the canonical label so phase-keyed maps read naturally in
// JSON and parse from any accepted alias.
impl Serialize for Phase {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for Phase {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// A single response to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Response {
    /// The candidate picked this option.
    Selected(String),
    /// The candidate left the question unanswered.
    Blank,
}

impl Response {
    pub fn is_blank(&self) -> bool {
        matches!(self, Response::Blank)
    }
}

/// Responses for one phase, ordered by question index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AnswerSet(Vec<Response>);

impl AnswerSet {
    pub fn new(responses: Vec<Response>) -> Self {
        Self(responses)
    }

    /// Build an answer set from option labels, treating `None` as blank.
    pub fn from_options<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self(
            options
                .into_iter()
                .map(|o| o.map_or(Response::Blank, |s| Response::Selected(s.into())))
                .collect(),
        )
    }

    pub fn get(&self, index: usize) -> Option<&Response> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Immutable scoring configuration for one phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    /// Which phase this row configures.
    pub phase: Phase,
    /// Number of questions in the phase.
    pub question_count: u32,
    /// Correct option per question index.
    pub answer_key: Vec<String>,
    /// Allowed option labels. `None` accepts any label.
    #[serde(default)]
    pub options: Option<Vec<String>>,
    /// Points awarded per correct answer.
    pub reward: u32,
    /// Points deducted per wrong answer.
    pub penalty: u32,
    /// Multiplier applied to the raw score during aggregation.
    pub weight: f64,
    /// Threshold ladder used to produce feedback text.
    pub feedback: FeedbackBands,
}

impl PhaseDefinition {
    /// Create a definition with the default +4 / -1 policy and unit weight.
    pub fn new<I, S>(phase: Phase, answer_key: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let answer_key: Vec<String> = answer_key.into_iter().map(Into::into).collect();
        Self {
            phase,
            question_count: answer_key.len() as u32,
            answer_key,
            options: None,
            reward: DEFAULT_REWARD,
            penalty: DEFAULT_PENALTY,
            weight: DEFAULT_WEIGHT,
            feedback: FeedbackBands::default(),
        }
    }

    pub fn with_reward(mut self, reward: u32) -> Self {
        self.reward = reward;
        self
    }

    pub fn with_penalty(mut self, penalty: u32) -> Self {
        self.penalty = penalty;
        self
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_options<I, S>(mut self, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.options = Some(options.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_feedback(mut self, feedback: FeedbackBands) -> Self {
        self.feedback = feedback;
        self
    }

    /// Highest reachable raw score (every answer correct).
    pub fn max_raw(&self) -> i64 {
        i64::from(self.question_count) * i64::from(self.reward)
    }

    /// Lowest reachable raw score (every answer wrong).
    pub fn min_raw(&self) -> i64 {
        -(i64::from(self.question_count) * i64::from(self.penalty))
    }

    /// Whether `option` is an accepted label for this phase.
    pub fn accepts_option(&self, option: &str) -> bool {
        match &self.options {
            Some(allowed) => allowed.iter().any(|o| o == option),
            None => true,
        }
    }

    fn check(&self) -> Result<(), ConfigError> {
        if self.question_count == 0 {
            return Err(ConfigError::EmptyPhase(self.phase));
        }
        if self.answer_key.len() != self.question_count as usize {
            return Err(ConfigError::AnswerKeyLength {
                phase: self.phase,
                expected: self.question_count,
                actual: self.answer_key.len(),
            });
        }
        if self.reward == 0 {
            return Err(ConfigError::NonPositiveReward(self.phase));
        }
        if !self.weight.is_finite() || self.weight < 0.0 {
            return Err(ConfigError::InvalidWeight {
                phase: self.phase,
                weight: self.weight,
            });
        }
        if let Some(options) = &self.options {
            if options.is_empty() {
                return Err(ConfigError::EmptyOptions(self.phase));
            }
            // Such a question could never be answered correctly.
            if let Some((index, key)) = self
                .answer_key
                .iter()
                .enumerate()
                .find(|(_, key)| !options.contains(key))
            {
                return Err(ConfigError::KeyOutsideOptions {
                    phase: self.phase,
                    index,
                    key: key.clone(),
                });
            }
        }
        self.feedback
            .check()
            .map_err(|reason| ConfigError::InvalidBands {
                phase: self.phase,
                reason,
            })
    }
}

pub const DEFAULT_REWARD: u32 = 4;
pub const DEFAULT_PENALTY: u32 = 1;
pub const DEFAULT_WEIGHT: f64 = 1.0;

/// The validated set of phase definitions, exactly one per [`Phase`].
///
/// Built once at startup; not reloaded while submissions are in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseTable {
    phases: BTreeMap<Phase, PhaseDefinition>,
}

impl PhaseTable {
    /// Validate and assemble a phase table.
    pub fn new(definitions: Vec<PhaseDefinition>) -> Result<Self, ConfigError> {
        let mut phases = BTreeMap::new();
        for def in definitions {
            def.check()?;
            let phase = def.phase;
            if phases.insert(phase, def).is_some() {
                return Err(ConfigError::DuplicatePhase(phase));
            }
        }
        if let Some(missing) = Phase::ALL.into_iter().find(|p| !phases.contains_key(p)) {
            return Err(ConfigError::MissingPhase(missing));
        }
        Ok(Self { phases })
    }

    pub fn get(&self, phase: Phase) -> &PhaseDefinition {
        // Construction guarantees every phase is present.
        &self.phases[&phase]
    }

    /// Definitions in phase order.
    pub fn iter(&self) -> impl Iterator<Item = &PhaseDefinition> {
        self.phases.values()
    }

    pub fn phases(&self) -> impl Iterator<Item = Phase> + '_ {
        self.phases.keys().copied()
    }

    /// Ceiling of the overall score: every phase answered perfectly.
    pub fn max_overall_score(&self) -> f64 {
        self.iter().map(|d| d.max_raw() as f64 * d.weight).sum()
    }
}

/// One raw response as submitted by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawResponse {
    pub question_index: i64,
    #[serde(default)]
    pub selected_option: Option<String>,
}

impl RawResponse {
    pub fn selected(question_index: i64, option: impl Into<String>) -> Self {
        Self {
            question_index,
            selected_option: Some(option.into()),
        }
    }

    pub fn blank(question_index: i64) -> Self {
        Self {
            question_index,
            selected_option: None,
        }
    }
}

/// A candidate's submission exactly as received, before validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub candidate_id: String,
    #[serde(default)]
    pub candidate_name: String,
    #[serde(default)]
    pub domain: String,
    /// Responses keyed by phase label.
    #[serde(default)]
    pub phase_answers: BTreeMap<String, Vec<RawResponse>>,
}

/// A submission that passed validation: normalized, complete, in range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSubmission {
    pub candidate_id: String,
    pub candidate_name: String,
    pub domain: String,
    pub answers: BTreeMap<Phase, AnswerSet>,
}

/// Score for one phase. Counts always sum to the phase's question count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseScore {
    pub phase: Phase,
    /// Sum of rewards and penalties. May be negative.
    pub raw: i64,
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
}

impl PhaseScore {
    pub fn answered(&self) -> u32 {
        self.correct + self.wrong
    }

    pub fn total(&self) -> u32 {
        self.correct + self.wrong + self.unanswered
    }
}
