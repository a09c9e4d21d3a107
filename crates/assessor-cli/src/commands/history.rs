//! The `assessor history` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use assessor_core::report::compare_history;

pub async fn execute(candidate: String, format: String, config_path: Option<PathBuf>) -> Result<()> {
    if !matches!(format.as_str(), "text" | "json" | "markdown" | "md") {
        return Err(super::unknown_format(&format, "text, json or markdown"));
    }

    let (engine, _) = super::engine(config_path.as_deref())?;
    let versions = engine.history(&candidate).await?;
    let comparisons = compare_history(&versions);

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&comparisons)?),
        "markdown" | "md" => {
            if comparisons.is_empty() {
                println!("Only one version stored for {candidate}.");
            }
            for cmp in &comparisons {
                println!("{}", cmp.to_markdown());
            }
        }
        _ => {
            let mut table = Table::new();
            table.set_header(vec!["Version", "Recorded", "Overall"]);
            for result in &versions {
                table.add_row(vec![
                    Cell::new(result.version()),
                    Cell::new(result.created_at().format("%Y-%m-%d %H:%M:%S UTC")),
                    Cell::new(format!("{:.1}", result.overall_score())),
                ]);
            }
            println!("{table}");

            for cmp in &comparisons {
                println!(
                    "\nVersion {} -> {}: overall {:+.1}",
                    cmp.baseline_version,
                    cmp.current_version,
                    cmp.overall_delta()
                );
                for p in &cmp.phases {
                    println!(
                        "  {} {} -> {} ({:+}) {}",
                        p.phase, p.baseline_raw, p.current_raw, p.delta, p.current_feedback
                    );
                }
                if cmp.has_declines() {
                    println!("  {} phase(s) declined", cmp.declines().count());
                }
            }
        }
    }

    Ok(())
}
