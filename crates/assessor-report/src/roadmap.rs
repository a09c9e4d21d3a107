//! Reference roadmap recommender.
//!
//! Turns a stored result into a learning path: phases ordered weakest first,
//! each with a priority taken from where its feedback landed in the band
//! ladder and a short list of suggested actions.

use std::fmt;

use serde::{Deserialize, Serialize};

use assessor_core::error::RoadmapError;
use assessor_core::model::{Phase, PhaseTable};
use assessor_core::results::AssessmentResult;
use assessor_core::traits::RoadmapRecommender;

use crate::summary::{summarize, PhaseLine};

/// How urgently a phase needs attention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        })
    }
}

/// One step of a learning path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusArea {
    pub phase: Phase,
    pub priority: Priority,
    pub ratio: f64,
    pub feedback: String,
    pub actions: Vec<String>,
}

/// A roadmap for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningPath {
    pub candidate_id: String,
    pub candidate_name: String,
    pub domain: String,
    /// Weakest phase first.
    pub steps: Vec<FocusArea>,
}

impl LearningPath {
    /// Steps that still need work.
    pub fn needs_work(&self) -> impl Iterator<Item = &FocusArea> {
        self.steps.iter().filter(|s| s.priority != Priority::Low)
    }

    /// Format the path as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = format!(
            "## Learning path for {} ({})\n\n",
            self.candidate_name, self.domain
        );
        for (n, step) in self.steps.iter().enumerate() {
            md.push_str(&format!(
                "{}. **{}** [{}] {} ({:.0}%)\n",
                n + 1,
                step.phase,
                step.priority,
                step.feedback,
                step.ratio * 100.0
            ));
            for action in &step.actions {
                md.push_str(&format!("   - {action}\n"));
            }
        }
        md
    }
}

/// Orders phases weakest first and attaches suggestions per phase.
#[derive(Debug, Clone)]
pub struct FocusAreaRecommender {
    table: PhaseTable,
}

impl FocusAreaRecommender {
    pub fn new(table: PhaseTable) -> Self {
        Self { table }
    }
}

impl RoadmapRecommender for FocusAreaRecommender {
    type Plan = LearningPath;

    fn recommend(&self, result: &AssessmentResult) -> Result<LearningPath, RoadmapError> {
        let mut lines = summarize(result, &self.table);
        if let Some(stale) = lines
            .iter()
            .find(|l| l.correct + l.wrong + l.unanswered != self.table.get(l.phase).question_count)
        {
            return Err(RoadmapError::Failed(format!(
                "result for {} was scored against a different phase table ({} has {} questions, expected {})",
                result.candidate_id(),
                stale.phase,
                stale.correct + stale.wrong + stale.unanswered,
                self.table.get(stale.phase).question_count
            )));
        }

        lines.sort_by(|a, b| a.ratio.total_cmp(&b.ratio));
        let steps = lines
            .into_iter()
            .map(|line| FocusArea {
                priority: priority(&line),
                actions: actions(line.phase, result.domain()),
                phase: line.phase,
                ratio: line.ratio,
                feedback: line.feedback,
            })
            .collect();

        tracing::debug!(candidate = result.candidate_id(), "roadmap built");
        Ok(LearningPath {
            candidate_id: result.candidate_id().to_string(),
            candidate_name: result.candidate_name().to_string(),
            domain: result.domain().to_string(),
            steps,
        })
    }
}

fn priority(line: &PhaseLine) -> Priority {
    if line.band_index == 0 {
        Priority::Low
    } else if line.band_index + 1 >= line.band_count {
        Priority::High
    } else {
        Priority::Medium
    }
}

fn actions(phase: Phase, domain: &str) -> Vec<String> {
    match phase {
        Phase::Aptitude => vec![
            "Work through timed quantitative reasoning sets".into(),
            "Practice logical sequence and pattern puzzles".into(),
        ],
        Phase::Verbal => vec![
            "Read and summarize one technical article a day".into(),
            "Drill reading comprehension under time limits".into(),
        ],
        Phase::DomainSpecific => {
            let domain = if domain.is_empty() { "your domain" } else { domain };
            vec![
                format!("Review core {domain} fundamentals"),
                format!("Build a small project exercising {domain} tooling"),
            ]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{result, table};

    #[test]
    fn weakest_phase_comes_first() {
        let table = table();
        let recommender = FocusAreaRecommender::new(table.clone());
        let path = recommender
            .recommend(&result(&table, "cand-1", [10, 6, 1]))
            .unwrap();

        let order: Vec<Phase> = path.steps.iter().map(|s| s.phase).collect();
        assert_eq!(order, [Phase::DomainSpecific, Phase::Verbal, Phase::Aptitude]);
        let priorities: Vec<Priority> = path.steps.iter().map(|s| s.priority).collect();
        assert_eq!(priorities, [Priority::High, Priority::Medium, Priority::Low]);
        assert_eq!(path.needs_work().count(), 2);
        assert!(path.steps[0].actions[0].contains("Data & ML"));
    }

    #[test]
    fn recommending_leaves_result_untouched() {
        let table = table();
        let stored = result(&table, "cand-1", [3, 3, 3]);
        let before = stored.clone();
        FocusAreaRecommender::new(table).recommend(&stored).unwrap();
        assert_eq!(stored, before);
    }

    #[test]
    fn stale_table_fails() {
        let table = table();
        let stored = result(&table, "cand-1", [3, 3, 3]);
        let other = PhaseTable::new(
            Phase::ALL
                .iter()
                .map(|p| assessor_core::model::PhaseDefinition::new(*p, vec!["A"; 12]))
                .collect(),
        )
        .unwrap();
        let err = FocusAreaRecommender::new(other).recommend(&stored).unwrap_err();
        assert!(matches!(err, RoadmapError::Failed(ref msg) if msg.contains("expected 12")));
    }

    #[test]
    fn markdown_numbers_steps() {
        let table = table();
        let path = FocusAreaRecommender::new(table.clone())
            .recommend(&result(&table, "cand-1", [10, 6, 1]))
            .unwrap();
        let md = path.to_markdown();
        assert!(md.contains("1. **Phase 3 - Domain-Specific** [high] Weak (10%)"));
        assert!(md.contains("   - Review core Data & ML fundamentals"));
    }
}
