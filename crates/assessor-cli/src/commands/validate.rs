//! The `assessor validate` command.

use std::path::PathBuf;

use anyhow::Result;

use assessor_core::parser::lint_phase_table;

pub fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let loaded = super::load(config_path.as_deref())?;
    let table = &loaded.table;

    println!("Config: {}", loaded.source.display());
    for def in table.iter() {
        println!(
            "  {}: {} questions, +{}/-{}, weight {}, {} feedback bands",
            def.phase,
            def.question_count,
            def.reward,
            def.penalty,
            def.weight,
            def.feedback.len()
        );
    }
    println!("Maximum overall score: {:.1}", table.max_overall_score());

    let store = &loaded.config.store;
    println!(
        "Store: {} at {}, overwrite = {}, timeout = {}",
        store.backend,
        store.path.display(),
        store.overwrite,
        match store.timeout() {
            Some(t) => format!("{}ms", t.as_millis()),
            None => "none".to_string(),
        }
    );

    let warnings = lint_phase_table(table);
    for w in &warnings {
        let prefix = w
            .phase
            .map(|p| format!("  [{p}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Phase table valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
