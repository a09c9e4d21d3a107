//! Markdown result summary.

use assessor_core::model::PhaseTable;
use assessor_core::results::AssessmentResult;

use crate::summary::summarize;

/// Format a result as a markdown section.
pub fn generate_markdown(result: &AssessmentResult, table: &PhaseTable) -> String {
    let mut md = String::new();

    md.push_str(&format!("## {} ({})\n\n", result.candidate_name(), result.candidate_id()));
    md.push_str(&format!(
        "**Domain:** {} | **Overall:** {:.1} / {:.1} | **Version:** {}\n\n",
        result.domain(),
        result.overall_score(),
        table.max_overall_score(),
        result.version()
    ));

    md.push_str("| Phase | Score | Correct | Wrong | Unanswered | Feedback |\n");
    md.push_str("|-------|-------|---------|-------|------------|----------|\n");
    for line in summarize(result, table) {
        md.push_str(&format!(
            "| {} | {} / {} | {} | {} | {} | {} |\n",
            line.phase, line.raw, line.max_raw, line.correct, line.wrong, line.unanswered, line.feedback
        ));
    }

    md
}
