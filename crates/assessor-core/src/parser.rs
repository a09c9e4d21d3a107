//! TOML phase table parser.
//!
//! Loads the `[[phases]]` table (and optional table-wide `[[feedback]]`
//! bands) from a config file, builds a validated [`PhaseTable`], and lints it
//! for suspicious but legal settings. Other sections of the file are ignored
//! here.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::error::ConfigError;
use crate::feedback::FeedbackBands;
use crate::model::{
    Phase, PhaseDefinition, PhaseTable, DEFAULT_PENALTY, DEFAULT_REWARD, DEFAULT_WEIGHT,
};

/// Intermediate TOML structure for the phase section of a config file.
#[derive(Debug, Deserialize)]
struct TomlPhaseFile {
    #[serde(default)]
    feedback: Option<FeedbackBands>,
    #[serde(default)]
    phases: Vec<TomlPhase>,
}

#[derive(Debug, Deserialize)]
struct TomlPhase {
    name: String,
    #[serde(default)]
    question_count: Option<u32>,
    answer_key: Vec<String>,
    #[serde(default)]
    options: Option<Vec<String>>,
    #[serde(default = "default_reward")]
    reward: u32,
    #[serde(default = "default_penalty")]
    penalty: u32,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(default)]
    feedback: Option<FeedbackBands>,
}

fn default_reward() -> u32 {
    DEFAULT_REWARD
}

fn default_penalty() -> u32 {
    DEFAULT_PENALTY
}

fn default_weight() -> f64 {
    DEFAULT_WEIGHT
}

/// Parse the phase table from a config file.
pub fn parse_phase_table(path: &Path) -> Result<PhaseTable> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    parse_phase_table_str(&content, path)
}

/// Parse a TOML string into a `PhaseTable` (useful for testing).
pub fn parse_phase_table_str(content: &str, source_path: &Path) -> Result<PhaseTable> {
    let parsed: TomlPhaseFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let default_bands = match parsed.feedback {
        Some(bands) => {
            bands.check().map_err(ConfigError::InvalidDefaultBands)?;
            bands
        }
        None => FeedbackBands::default(),
    };

    let definitions = parsed
        .phases
        .into_iter()
        .map(|p| {
            let phase: Phase = p.name.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
            let question_count = p
                .question_count
                .unwrap_or(p.answer_key.len() as u32);
            // Per-phase ladders are checked with the rest of the row.
            let feedback = p.feedback.unwrap_or_else(|| default_bands.clone());

            Ok(PhaseDefinition {
                phase,
                question_count,
                answer_key: p.answer_key.into_iter().map(|k| k.trim().to_string()).collect(),
                options: p
                    .options
                    .map(|opts| opts.into_iter().map(|o| o.trim().to_string()).collect()),
                reward: p.reward,
                penalty: p.penalty,
                weight: p.weight,
                feedback,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let table = PhaseTable::new(definitions)
        .with_context(|| format!("invalid phase table in {}", source_path.display()))?;
    Ok(table)
}

/// A non-fatal finding about a phase table.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The phase concerned (if applicable).
    pub phase: Option<Phase>,
    /// Warning message.
    pub message: String,
}

/// Lint a phase table for settings that are legal but probably mistakes.
pub fn lint_phase_table(table: &PhaseTable) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    // Zero weight drops the phase from the overall score
    for def in table.iter() {
        if def.weight == 0.0 {
            warnings.push(ConfigWarning {
                phase: Some(def.phase),
                message: "weight is 0; this phase does not count toward the overall score".into(),
            });
        }
    }

    // Repeated labels make bands indistinguishable in reports
    for def in table.iter() {
        let mut seen = HashSet::new();
        for band in def.feedback.bands() {
            if !seen.insert(band.text.as_str()) {
                warnings.push(ConfigWarning {
                    phase: Some(def.phase),
                    message: format!("feedback text {:?} is used by more than one band", band.text),
                });
            }
        }
    }

    // Zero penalty means guessing never costs anything
    for def in table.iter() {
        if def.penalty == 0 {
            warnings.push(ConfigWarning {
                phase: Some(def.phase),
                message: "penalty is 0; wrong answers are not penalized".into(),
            });
        }
    }

    warnings
}
