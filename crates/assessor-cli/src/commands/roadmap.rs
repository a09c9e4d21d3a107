//! The `assessor roadmap` command.

use std::path::PathBuf;

use anyhow::Result;

use assessor_report::roadmap::FocusAreaRecommender;

pub async fn execute(candidate: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    if !matches!(format.as_str(), "text" | "json" | "markdown" | "md") {
        return Err(super::unknown_format(&format, "text, json or markdown"));
    }

    let (engine, loaded) = super::engine(config_path.as_deref())?;
    let recommender = FocusAreaRecommender::new(loaded.table);
    let path = engine.roadmap(&candidate, &recommender).await?;

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&path)?),
        "markdown" | "md" => println!("{}", path.to_markdown()),
        _ => {
            println!("Learning path for {} ({})", path.candidate_name, path.domain);
            for (n, step) in path.steps.iter().enumerate() {
                println!(
                    "  {}. {} [{}] {} ({:.0}%)",
                    n + 1,
                    step.phase,
                    step.priority,
                    step.feedback,
                    step.ratio * 100.0
                );
                for action in &step.actions {
                    println!("       - {action}");
                }
            }
            if path.needs_work().next().is_none() {
                println!("Every phase is in its top band.");
            }
        }
    }

    Ok(())
}
