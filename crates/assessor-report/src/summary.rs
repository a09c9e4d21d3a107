//! Per-phase rows shared by every renderer.

use serde::Serialize;

use assessor_core::feedback;
use assessor_core::model::{Phase, PhaseTable};
use assessor_core::results::AssessmentResult;

/// One phase of a result, joined with its definition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PhaseLine {
    pub phase: Phase,
    pub raw: i64,
    pub max_raw: i64,
    /// `raw / max_raw`; may be negative.
    pub ratio: f64,
    pub correct: u32,
    pub wrong: u32,
    pub unanswered: u32,
    pub weight: f64,
    pub feedback: String,
    /// Position of the feedback band in the phase's ladder; 0 is the top.
    pub band_index: usize,
    pub band_count: usize,
}

/// Rows for every phase the result was scored on, in phase order.
pub fn summarize(result: &AssessmentResult, table: &PhaseTable) -> Vec<PhaseLine> {
    result
        .scores()
        .values()
        .map(|score| {
            let def = table.get(score.phase);
            let band = feedback::classify(def, score);
            PhaseLine {
                phase: score.phase,
                raw: score.raw,
                max_raw: def.max_raw(),
                ratio: band.ratio,
                correct: score.correct,
                wrong: score.wrong,
                unanswered: score.unanswered,
                weight: def.weight,
                feedback: result
                    .feedback_for(score.phase)
                    .unwrap_or(band.band.text.as_str())
                    .to_string(),
                band_index: band.index,
                band_count: def.feedback.len(),
            }
        })
        .collect()
}
