//! Per-phase scoring.

use crate::model::{AnswerSet, PhaseDefinition, PhaseScore, Response};

/// Score one phase's answers against its definition.
///
/// Every question index in `0..question_count` counts exactly once: a blank
/// (or a response the set does not carry) is unanswered and worth 0, a match
/// with the answer key earns `reward`, anything else costs `penalty`.
pub fn score(phase: &PhaseDefinition, answers: &AnswerSet) -> PhaseScore {
    let mut tally = PhaseScore {
        phase: phase.phase,
        raw: 0,
        correct: 0,
        wrong: 0,
        unanswered: 0,
    };

    for (index, expected) in phase.answer_key.iter().enumerate() {
        match answers.get(index) {
            None | Some(Response::Blank) => tally.unanswered += 1,
            Some(Response::Selected(option)) if option.trim() == expected.trim() => {
                tally.correct += 1;
            }
            Some(Response::Selected(_)) => tally.wrong += 1,
        }
    }

    tally.raw = i64::from(tally.correct) * i64::from(phase.reward)
        - i64::from(tally.wrong) * i64::from(phase.penalty);
    tally
}
