//! Subcommand implementations and the setup they share.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use assessor_core::engine::AssessmentEngine;
use assessor_core::model::PhaseTable;
use assessor_core::parser::parse_phase_table;
use assessor_store::config::{load_config_from, open_store, AssessorConfig};

pub mod history;
pub mod init;
pub mod roadmap;
pub mod score;
pub mod show;
pub mod validate;

/// Config plus the phase table from the same file.
pub struct Loaded {
    pub config: AssessorConfig,
    pub source: PathBuf,
    pub table: PhaseTable,
}

pub fn load(config_path: Option<&Path>) -> Result<Loaded> {
    let config = load_config_from(config_path)?;
    let source = config
        .source
        .clone()
        .context("no assessor.toml found; run `assessor init` to create one")?;
    let table = parse_phase_table(&source)?;
    Ok(Loaded {
        config,
        source,
        table,
    })
}

/// Load config and open an engine over the configured store.
pub fn engine(config_path: Option<&Path>) -> Result<(AssessmentEngine, Loaded)> {
    let loaded = load(config_path)?;
    let store = open_store(&loaded.config.store)?;
    let engine = AssessmentEngine::new(Arc::new(loaded.table.clone()), store);
    Ok((engine, loaded))
}

/// Write `content` to `output`, or print it when no path is given.
pub fn emit(content: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, content)
                .with_context(|| format!("failed to write {}", path.display()))?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{content}"),
    }
    Ok(())
}

pub fn unknown_format(format: &str, expected: &str) -> anyhow::Error {
    anyhow::anyhow!("unknown format: {format} (expected {expected})")
}
