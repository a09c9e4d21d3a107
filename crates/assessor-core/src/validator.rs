//! Submission validation and normalization.
//!
//! Turns a raw [`Submission`] into a [`ValidatedSubmission`] whose answer
//! sets are complete, in range, and ordered by question index. Pure: nothing
//! here touches the result store.

use std::collections::BTreeMap;

use crate::error::ValidationError;
use crate::model::{
    AnswerSet, Phase, PhaseDefinition, PhaseTable, RawResponse, Response, Submission,
    ValidatedSubmission,
};

/// Longest accepted candidate identifier.
pub const MAX_CANDIDATE_ID_LEN: usize = 64;

/// Validate a submission against the phase table.
///
/// Checks run in a fixed order (candidate id, unknown phase labels, missing
/// phases, then each phase's answers) and the first failure is returned.
pub fn validate(
    table: &PhaseTable,
    submission: &Submission,
) -> Result<ValidatedSubmission, ValidationError> {
    let candidate_id = check_candidate_id(&submission.candidate_id)?;

    let mut by_phase: BTreeMap<Phase, &[RawResponse]> = BTreeMap::new();
    for (label, responses) in &submission.phase_answers {
        let phase: Phase = label
            .parse()
            .map_err(|_| ValidationError::MalformedAnswerSet {
                phase: label.clone(),
                reason: "not a configured phase".into(),
            })?;
        if by_phase.insert(phase, responses).is_some() {
            return Err(ValidationError::MalformedAnswerSet {
                phase: phase.to_string(),
                reason: "phase submitted under more than one label".into(),
            });
        }
    }

    if let Some(missing) = table.phases().find(|p| !by_phase.contains_key(p)) {
        return Err(ValidationError::MissingPhase(missing));
    }

    let mut answers = BTreeMap::new();
    for def in table.iter() {
        let set = normalize(def, by_phase[&def.phase])?;
        answers.insert(def.phase, set);
    }

    Ok(ValidatedSubmission {
        candidate_id,
        candidate_name: submission.candidate_name.trim().to_string(),
        domain: submission.domain.trim().to_string(),
        answers,
    })
}

/// Check a candidate id against the identity format and return it trimmed.
///
/// Accepted: 1 to 64 characters from `[A-Za-z0-9_.@-]`, not starting with `.`.
pub fn check_candidate_id(raw: &str) -> Result<String, ValidationError> {
    let id = raw.trim();
    let well_formed = !id.is_empty()
        && id.len() <= MAX_CANDIDATE_ID_LEN
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '@' | '-'));
    if well_formed {
        Ok(id.to_string())
    } else {
        Err(ValidationError::UnknownCandidate(raw.to_string()))
    }
}

/// Normalize one phase's raw responses into an ordered answer set.
fn normalize(def: &PhaseDefinition, raw: &[RawResponse]) -> Result<AnswerSet, ValidationError> {
    let malformed = |reason: String| ValidationError::MalformedAnswerSet {
        phase: def.phase.to_string(),
        reason,
    };

    let expected = def.question_count as usize;
    if raw.len() != expected {
        return Err(malformed(format!(
            "expected {expected} responses, got {}",
            raw.len()
        )));
    }

    let mut slots: Vec<Option<Response>> = vec![None; expected];
    for response in raw {
        let index = usize::try_from(response.question_index)
            .ok()
            .filter(|&i| i < expected)
            .ok_or_else(|| {
                malformed(format!(
                    "question index {} is outside 0..{expected}",
                    response.question_index
                ))
            })?;

        let normalized = match response.selected_option.as_deref().map(str::trim) {
            None | Some("") => Response::Blank,
            Some(option) => {
                if !def.accepts_option(option) {
                    return Err(malformed(format!(
                        "question {index}: {option:?} is not an allowed option"
                    )));
                }
                Response::Selected(option.to_string())
            }
        };

        if slots[index].replace(normalized).is_some() {
            return Err(malformed(format!("question {index} answered more than once")));
        }
    }

    // Length matched and no index repeated, so every slot is filled.
    Ok(AnswerSet::new(
        slots.into_iter().map(|s| s.unwrap_or(Response::Blank)).collect(),
    ))
}
