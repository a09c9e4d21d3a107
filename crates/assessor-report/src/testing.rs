//! Shared test fixtures.

use std::collections::BTreeMap;

use assessor_core::engine::evaluate;
use assessor_core::model::{Phase, PhaseDefinition, PhaseTable, RawResponse, Submission};
use assessor_core::results::AssessmentResult;

/// Ten questions per phase, all keyed "A", default +4 / -1 and bands.
pub fn table() -> PhaseTable {
    PhaseTable::new(
        Phase::ALL
            .iter()
            .map(|phase| PhaseDefinition::new(*phase, vec!["A"; 10]))
            .collect(),
    )
    .unwrap()
}

/// Evaluate a submission with `correct[i]` right answers in phase `i` and
/// blanks for the rest.
pub fn result(table: &PhaseTable, candidate_id: &str, correct: [usize; 3]) -> AssessmentResult {
    let phase_answers: BTreeMap<String, Vec<RawResponse>> = table
        .iter()
        .zip(correct)
        .map(|(def, right)| {
            let responses = (0..def.question_count as usize)
                .map(|i| {
                    if i < right {
                        RawResponse::selected(i as i64, "A")
                    } else {
                        RawResponse::blank(i as i64)
                    }
                })
                .collect();
            (def.phase.label().to_string(), responses)
        })
        .collect();

    let submission = Submission {
        candidate_id: candidate_id.to_string(),
        candidate_name: "Grace <Hopper>".into(),
        domain: "Data & ML".into(),
        phase_answers,
    };
    evaluate(table, &submission).unwrap()
}
