//! The `assessor score` command.

use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use assessor_core::model::{PhaseTable, Submission};
use assessor_core::results::AssessmentResult;
use assessor_report::summary::summarize;

pub async fn execute(
    submission_path: PathBuf,
    dry_run: bool,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    if !matches!(format.as_str(), "text" | "json") {
        return Err(super::unknown_format(&format, "text or json"));
    }

    let (engine, _) = super::engine(config_path.as_deref())?;

    let content = std::fs::read_to_string(&submission_path)
        .with_context(|| format!("failed to read submission: {}", submission_path.display()))?;
    let submission: Submission = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse submission: {}", submission_path.display()))?;

    let result = if dry_run {
        engine.evaluate(&submission)?
    } else {
        engine.submit(&submission).await?
    };

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&result.view())?),
        _ => {
            print_result(&result, engine.table());
            if dry_run {
                println!("Dry run: result not stored.");
            } else {
                println!(
                    "Stored result for {} (version {}).",
                    result.candidate_id(),
                    result.version()
                );
            }
        }
    }

    Ok(())
}

/// Print a result as a text table.
pub fn print_result(result: &AssessmentResult, phases: &PhaseTable) {
    println!(
        "{} ({}), domain: {}",
        result.candidate_name(),
        result.candidate_id(),
        result.domain()
    );

    let mut table = Table::new();
    table.set_header(vec!["Phase", "Score", "Correct", "Wrong", "Unanswered", "Feedback"]);
    for line in summarize(result, phases) {
        table.add_row(vec![
            Cell::new(line.phase),
            Cell::new(format!("{} / {}", line.raw, line.max_raw)),
            Cell::new(line.correct),
            Cell::new(line.wrong),
            Cell::new(line.unanswered),
            Cell::new(&line.feedback),
        ]);
    }
    println!("{table}");
    println!(
        "Overall score: {:.1} / {:.1}",
        result.overall_score(),
        phases.max_overall_score()
    );
}
