//! Result comparison across versions, with JSON persistence of views.
//!
//! When a store keeps result history, consecutive versions of a candidate's
//! result can be compared phase by phase to show where they moved.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Phase;
use crate::results::{AssessmentResult, ResultView};

/// Change in one phase between two results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDelta {
    pub phase: Phase,
    pub baseline_raw: i64,
    pub current_raw: i64,
    pub delta: i64,
    pub baseline_feedback: String,
    pub current_feedback: String,
}

impl PhaseDelta {
    pub fn feedback_changed(&self) -> bool {
        self.baseline_feedback != self.current_feedback
    }
}

/// Comparison of two results for the same candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultComparison {
    pub candidate_id: String,
    pub baseline_version: u32,
    pub current_version: u32,
    pub baseline_overall: f64,
    pub current_overall: f64,
    /// Per-phase changes in phase order.
    pub phases: Vec<PhaseDelta>,
}

impl ResultComparison {
    /// Compare `current` against `baseline`.
    pub fn between(baseline: &AssessmentResult, current: &AssessmentResult) -> Self {
        let phases = current
            .scores()
            .iter()
            .filter_map(|(phase, now)| {
                let before = baseline.score(*phase)?;
                Some(PhaseDelta {
                    phase: *phase,
                    baseline_raw: before.raw,
                    current_raw: now.raw,
                    delta: now.raw - before.raw,
                    baseline_feedback: baseline.feedback_for(*phase).unwrap_or_default().to_string(),
                    current_feedback: current.feedback_for(*phase).unwrap_or_default().to_string(),
                })
            })
            .collect();

        Self {
            candidate_id: current.candidate_id().to_string(),
            baseline_version: baseline.version(),
            current_version: current.version(),
            baseline_overall: baseline.overall_score(),
            current_overall: current.overall_score(),
            phases,
        }
    }

    pub fn overall_delta(&self) -> f64 {
        self.current_overall - self.baseline_overall
    }

    /// Phases whose raw score went down.
    pub fn declines(&self) -> impl Iterator<Item = &PhaseDelta> {
        self.phases.iter().filter(|p| p.delta < 0)
    }

    pub fn has_declines(&self) -> bool {
        self.declines().next().is_some()
    }

    /// Format the comparison as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**{}:** version {} → {}, overall {:.1} → {:.1} ({:+.1})\n\n",
            self.candidate_id,
            self.baseline_version,
            self.current_version,
            self.baseline_overall,
            self.current_overall,
            self.overall_delta()
        ));

        md.push_str("| Phase | Before | After | Delta | Feedback |\n");
        md.push_str("|-------|--------|-------|-------|----------|\n");
        for p in &self.phases {
            let feedback = if p.feedback_changed() {
                format!("{} → {}", p.baseline_feedback, p.current_feedback)
            } else {
                p.current_feedback.clone()
            };
            md.push_str(&format!(
                "| {} | {} | {} | {:+} | {} |\n",
                p.phase, p.baseline_raw, p.current_raw, p.delta, feedback
            ));
        }

        md
    }
}

/// Compare each version in `history` with the one before it.
pub fn compare_history(history: &[AssessmentResult]) -> Vec<ResultComparison> {
    history
        .windows(2)
        .map(|pair| ResultComparison::between(&pair[0], &pair[1]))
        .collect()
}

impl ResultView {
    /// Save the view as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize result")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write result to {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::evaluate;
    use crate::model::fixtures::{submission, table};

    fn result(id: &str, tallies: [(usize, usize); 3], version: u32) -> AssessmentResult {
        let table = table();
        evaluate(&table, &submission(&table, id, tallies))
            .unwrap()
            .as_version(version)
    }

    #[test]
    fn compare_identical_results() {
        let r = result("cand-1", [(15, 5), (8, 2), (5, 0)], 1);
        let cmp = ResultComparison::between(&r, &r);
        assert_eq!(cmp.phases.len(), 3);
        assert!(cmp.phases.iter().all(|p| p.delta == 0 && !p.feedback_changed()));
        assert!(!cmp.has_declines());
    }

    #[test]
    fn compare_with_decline_and_band_change() {
        let before = result("cand-1", [(20, 0), (8, 2), (5, 0)], 1);
        let after = result("cand-1", [(10, 0), (16, 0), (5, 0)], 2);
        let cmp = ResultComparison::between(&before, &after);

        let aptitude = &cmp.phases[0];
        assert_eq!(aptitude.phase, Phase::Aptitude);
        assert_eq!((aptitude.baseline_raw, aptitude.current_raw, aptitude.delta), (80, 40, -40));
        assert_eq!(aptitude.baseline_feedback, "Excellent");
        assert_eq!(aptitude.current_feedback, "Needs Improvement");
        assert_eq!(cmp.declines().count(), 1);
        assert!((cmp.overall_delta() - (-6.0)).abs() < f64::EPSILON);
    }

    #[test]
    fn history_pairs_consecutive_versions() {
        let history = vec![
            result("cand-1", [(5, 0), (5, 0), (5, 0)], 1),
            result("cand-1", [(6, 0), (5, 0), (5, 0)], 2),
            result("cand-1", [(7, 0), (5, 0), (5, 0)], 3),
        ];
        let cmps = compare_history(&history);
        assert_eq!(cmps.len(), 2);
        assert_eq!((cmps[1].baseline_version, cmps[1].current_version), (2, 3));
        assert!(compare_history(&history[..1]).is_empty());
    }

    #[test]
    fn markdown_output() {
        let before = result("cand-1", [(20, 0), (8, 2), (5, 0)], 1);
        let after = result("cand-1", [(10, 0), (8, 2), (5, 0)], 2);
        let md = ResultComparison::between(&before, &after).to_markdown();
        assert!(md.contains("version 1 → 2"));
        assert!(md.contains("| Phase 1 - Aptitude | 80 | 40 | -40 | Excellent → Needs Improvement |"));
    }

    #[test]
    fn saved_view_matches_the_retrieval_shape() {
        let view = result("cand-1", [(15, 5), (8, 2), (5, 0)], 1).view();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/result.json");

        view.save_json(&path).unwrap();
        let loaded: ResultView =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, view);
    }
}
