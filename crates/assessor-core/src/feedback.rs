//! Feedback bands: threshold ladders mapping a phase score to text.
//!
//! A ladder is read top-down over the ratio `raw / (question_count * reward)`.
//! The first band whose `min_ratio` the ratio reaches wins; the final band
//! has no threshold and catches everything else, including negative ratios,
//! so every score maps to exactly one band.

use serde::{Deserialize, Serialize};

use crate::model::{PhaseDefinition, PhaseScore};

/// One rung of a feedback ladder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Band {
    /// Lowest ratio that earns this band. `None` marks the catch-all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_ratio: Option<f64>,
    /// Feedback text for scores in this band.
    pub text: String,
}

impl Band {
    pub fn at_least(min_ratio: f64, text: impl Into<String>) -> Self {
        Self {
            min_ratio: Some(min_ratio),
            text: text.into(),
        }
    }

    pub fn otherwise(text: impl Into<String>) -> Self {
        Self {
            min_ratio: None,
            text: text.into(),
        }
    }
}

/// An ordered feedback ladder, highest threshold first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedbackBands(Vec<Band>);

impl Default for FeedbackBands {
    fn default() -> Self {
        Self(vec![
            Band::at_least(0.75, "Excellent"),
            Band::at_least(0.5, "Good"),
            Band::at_least(0.25, "Needs Improvement"),
            Band::otherwise("Weak"),
        ])
    }
}

/// The band a score landed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandMatch<'a> {
    /// Position in the ladder; 0 is the top band.
    pub index: usize,
    pub band: &'a Band,
    pub ratio: f64,
}

impl FeedbackBands {
    /// Build and check a ladder.
    pub fn new(bands: Vec<Band>) -> Result<Self, String> {
        let bands = Self(bands);
        bands.check()?;
        Ok(bands)
    }

    pub fn bands(&self) -> &[Band] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Verify ordering, the single trailing catch-all, and non-empty labels.
    pub(crate) fn check(&self) -> Result<(), String> {
        let Some((last, thresholds)) = self.0.split_last() else {
            return Err("at least one band is required".into());
        };
        if last.min_ratio.is_some() {
            return Err("the last band must have no min_ratio".into());
        }
        let mut previous: Option<f64> = None;
        for band in thresholds {
            let Some(min) = band.min_ratio else {
                return Err(format!("band {:?} without min_ratio must be last", band.text));
            };
            if !min.is_finite() {
                return Err(format!("band {:?} has a non-finite min_ratio", band.text));
            }
            if previous.is_some_and(|p| min >= p) {
                return Err(format!(
                    "band {:?} must have a lower min_ratio than the band above it",
                    band.text
                ));
            }
            previous = Some(min);
        }
        if let Some(band) = self.0.iter().find(|b| b.text.trim().is_empty()) {
            return Err(format!("band at min_ratio {:?} has empty text", band.min_ratio));
        }
        Ok(())
    }

    /// Find the band for `ratio`. Total for any ratio, including NaN.
    pub fn band_for(&self, ratio: f64) -> BandMatch<'_> {
        let index = self
            .0
            .iter()
            .position(|b| b.min_ratio.map_or(true, |min| ratio >= min))
            .unwrap_or(self.0.len().saturating_sub(1));
        BandMatch {
            index,
            band: &self.0[index],
            ratio,
        }
    }
}

/// Normalized performance for a phase: raw score over the maximum.
pub fn ratio(phase: &PhaseDefinition, score: &PhaseScore) -> f64 {
    let max = phase.max_raw();
    if max <= 0 {
        return 0.0;
    }
    score.raw as f64 / max as f64
}

/// Produce the feedback text for one phase score.
pub fn feedback(phase: &PhaseDefinition, score: &PhaseScore) -> String {
    classify(phase, score).band.text.clone()
}

/// Like [`feedback`] but returns the full band match.
pub fn classify<'a>(phase: &'a PhaseDefinition, score: &PhaseScore) -> BandMatch<'a> {
    phase.feedback.band_for(ratio(phase, score))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures;
    use crate::model::Phase;

    fn score(raw: i64) -> PhaseScore {
        PhaseScore {
            phase: Phase::Aptitude,
            raw,
            correct: 0,
            wrong: 0,
            unanswered: 0,
        }
    }

    fn aptitude() -> PhaseDefinition {
        PhaseDefinition::new(Phase::Aptitude, fixtures::key(25))
    }

    #[test]
    fn default_ladder_boundaries() {
        let def = aptitude();
        // max raw is 100, so ratio == raw / 100
        assert_eq!(feedback(&def, &score(100)), "Excellent");
        assert_eq!(feedback(&def, &score(75)), "Excellent");
        assert_eq!(feedback(&def, &score(74)), "Good");
        assert_eq!(feedback(&def, &score(50)), "Good");
        assert_eq!(feedback(&def, &score(49)), "Needs Improvement");
        assert_eq!(feedback(&def, &score(25)), "Needs Improvement");
        assert_eq!(feedback(&def, &score(24)), "Weak");
        assert_eq!(feedback(&def, &score(0)), "Weak");
    }

    #[test]
    fn every_reachable_score_has_one_band() {
        let def = aptitude();
        for raw in def.min_raw()..=def.max_raw() {
            let first = classify(&def, &score(raw));
            let second = classify(&def, &score(raw));
            assert_eq!(first.index, second.index);
            assert_eq!(first.band.text, second.band.text);
        }
        assert_eq!(feedback(&def, &score(def.min_raw())), "Weak");
    }

    #[test]
    fn nan_ratio_falls_to_catch_all() {
        let bands = FeedbackBands::default();
        assert_eq!(bands.band_for(f64::NAN).band.text, "Weak");
        assert_eq!(bands.band_for(f64::NEG_INFINITY).index, 3);
    }

    #[test]
    fn custom_ladder() {
        let bands = FeedbackBands::new(vec![
            Band::at_least(0.9, "Outstanding"),
            Band::otherwise("Keep practicing"),
        ])
        .unwrap();
        let def = aptitude().with_feedback(bands);
        assert_eq!(feedback(&def, &score(95)), "Outstanding");
        assert_eq!(feedback(&def, &score(89)), "Keep practicing");
    }

    #[test]
    fn rejects_malformed_ladders() {
        assert!(FeedbackBands::new(vec![]).is_err());
        assert!(FeedbackBands::new(vec![Band::at_least(0.5, "Good")]).is_err());
        assert!(FeedbackBands::new(vec![
            Band::at_least(0.25, "Low"),
            Band::at_least(0.5, "High"),
            Band::otherwise("Weak"),
        ])
        .is_err());
        assert!(FeedbackBands::new(vec![
            Band::otherwise("Weak"),
            Band::otherwise("Weaker"),
        ])
        .is_err());
        assert!(FeedbackBands::new(vec![Band::at_least(0.5, " "), Band::otherwise("Weak")]).is_err());
        assert!(FeedbackBands::new(vec![Band::at_least(f64::NAN, "x"), Band::otherwise("y")]).is_err());
    }

    #[test]
    fn bands_deserialize_from_toml_rows() {
        #[derive(Deserialize)]
        struct Doc {
            feedback: FeedbackBands,
        }
        let doc: Doc = toml::from_str(
            r#"
[[feedback]]
min_ratio = 0.6
text = "Pass"

[[feedback]]
text = "Fail"
"#,
        )
        .unwrap();
        assert_eq!(doc.feedback.len(), 2);
        assert!(doc.feedback.check().is_ok());
        assert_eq!(doc.feedback.band_for(0.6).band.text, "Pass");
    }
}
