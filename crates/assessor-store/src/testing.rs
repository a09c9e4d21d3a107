//! Shared test fixtures.

use std::collections::BTreeMap;

use assessor_core::model::{Phase, PhaseDefinition, PhaseScore, PhaseTable};
use assessor_core::results::{AssessmentResult, Candidate};

pub fn table() -> PhaseTable {
    PhaseTable::new(
        Phase::ALL
            .iter()
            .map(|phase| PhaseDefinition::new(*phase, vec!["A"; 10]))
            .collect(),
    )
    .unwrap()
}

/// A result whose aptitude phase has `correct` right answers out of ten.
pub fn result(candidate_id: &str, correct: u32) -> AssessmentResult {
    let table = table();
    let scores: BTreeMap<Phase, PhaseScore> = Phase::ALL
        .iter()
        .map(|phase| {
            let correct = if *phase == Phase::Aptitude { correct } else { 5 };
            let score = PhaseScore {
                phase: *phase,
                raw: i64::from(correct) * 4,
                correct,
                wrong: 0,
                unanswered: 10 - correct,
            };
            (*phase, score)
        })
        .collect();
    let candidate = Candidate {
        id: candidate_id.to_string(),
        name: "Ada Lovelace".into(),
        domain: "Backend".into(),
    };
    AssessmentResult::assemble(&table, candidate, scores).unwrap()
}
