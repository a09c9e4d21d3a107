//! Weighted aggregation of phase scores.

use std::collections::BTreeMap;

use crate::error::ScoringError;
use crate::model::{Phase, PhaseScore, PhaseTable};

/// Combine phase scores into the overall score.
///
/// `overall = sum(raw * weight)` over every configured phase. The weighted sum
/// is reported as-is: weights need not add up to 1 and the result is not
/// normalized. Fails if any configured phase lacks a score.
pub fn aggregate(
    table: &PhaseTable,
    scores: &BTreeMap<Phase, PhaseScore>,
) -> Result<f64, ScoringError> {
    let missing: Vec<Phase> = table.phases().filter(|p| !scores.contains_key(p)).collect();
    if !missing.is_empty() {
        return Err(ScoringError::IncompletePhaseSet { missing });
    }

    Ok(table
        .iter()
        .map(|def| scores[&def.phase].raw as f64 * def.weight)
        .sum())
}
