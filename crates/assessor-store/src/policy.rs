//! What a store does when a candidate already has a result.

use std::fmt;
use std::str::FromStr;

use assessor_core::error::StoreError;
use assessor_core::results::AssessmentResult;
use serde::{Deserialize, Serialize};

/// Overwrite policy for a second `put` on the same candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverwritePolicy {
    /// Refuse with `DuplicateCandidate`.
    #[default]
    Reject,
    /// Drop the old record; the new one takes the next version number.
    Replace,
    /// Keep every record; the newest is current.
    Version,
}

impl OverwritePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            OverwritePolicy::Reject => "reject",
            OverwritePolicy::Replace => "replace",
            OverwritePolicy::Version => "version",
        }
    }

    /// Apply an incoming result to a candidate's stored versions, oldest
    /// first. Returns the record as stored.
    ///
    /// `versions` is left untouched when the policy refuses the write.
    pub fn apply(
        self,
        versions: &mut Vec<AssessmentResult>,
        incoming: AssessmentResult,
    ) -> Result<AssessmentResult, StoreError> {
        let Some(latest) = versions.last() else {
            let stored = incoming.as_version(1);
            versions.push(stored.clone());
            return Ok(stored);
        };

        let next = latest.version() + 1;
        match self {
            OverwritePolicy::Reject => Err(StoreError::DuplicateCandidate(
                incoming.candidate_id().to_string(),
            )),
            OverwritePolicy::Replace => {
                let stored = incoming.as_version(next);
                versions.clear();
                versions.push(stored.clone());
                Ok(stored)
            }
            OverwritePolicy::Version => {
                let stored = incoming.as_version(next);
                versions.push(stored.clone());
                Ok(stored)
            }
        }
    }
}

impl fmt::Display for OverwritePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverwritePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" => Ok(OverwritePolicy::Reject),
            "replace" => Ok(OverwritePolicy::Replace),
            "version" | "versioned" => Ok(OverwritePolicy::Version),
            other => Err(format!(
                "unknown overwrite policy: {other} (expected reject, replace or version)"
            )),
        }
    }
}
