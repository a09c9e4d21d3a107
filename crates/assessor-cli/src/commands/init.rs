//! The `assessor init` command.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::Result;

use assessor_core::model::{Phase, RawResponse, Submission};

const APTITUDE_KEY: [&str; 25] = [
    "B", "D", "A", "C", "B", "A", "D", "C", "A", "B", "C", "D", "A", "B", "D", "C", "A", "D", "B",
    "C", "A", "C", "B", "D", "A",
];
const VERBAL_KEY: [&str; 20] = [
    "C", "A", "B", "D", "A", "C", "D", "B", "A", "D", "C", "B", "D", "A", "B", "C", "A", "B", "D",
    "C",
];
const DOMAIN_KEY: [&str; 15] = [
    "A", "C", "D", "B", "C", "A", "B", "D", "C", "A", "D", "B", "A", "C", "B",
];

pub fn execute() -> Result<()> {
    if Path::new("assessor.toml").exists() {
        println!("assessor.toml already exists, skipping.");
    } else {
        std::fs::write("assessor.toml", sample_config())?;
        println!("Created assessor.toml");
    }

    std::fs::create_dir_all("submissions")?;
    let sample_path = Path::new("submissions/sample.json");
    if sample_path.exists() {
        println!("submissions/sample.json already exists, skipping.");
    } else {
        std::fs::write(sample_path, serde_json::to_string_pretty(&sample_submission())?)?;
        println!("Created submissions/sample.json");
    }

    println!("\nNext steps:");
    println!("  1. Edit the answer keys in assessor.toml");
    println!("  2. Run: assessor validate");
    println!("  3. Run: assessor score --submission submissions/sample.json");
    println!("  4. Run: assessor show --candidate cand-001");

    Ok(())
}

fn toml_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|s| format!("{s:?}")).collect();
    format!("[{}]", quoted.join(", "))
}

fn sample_config() -> String {
    format!(
        r#"# assessor configuration

[store]
backend = "file"
path = "./assessor-results"
overwrite = "reject"
timeout_ms = 5000

# Default feedback bands, highest threshold first. The ratio is
# raw score / (question_count * reward).
[[feedback]]
min_ratio = 0.75
text = "Excellent"

[[feedback]]
min_ratio = 0.5
text = "Good"

[[feedback]]
min_ratio = 0.25
text = "Needs Improvement"

[[feedback]]
text = "Weak"

[[phases]]
name = "Phase 1 - Aptitude"
question_count = 25
answer_key = {aptitude}
options = ["A", "B", "C", "D"]
reward = 4
penalty = 1
weight = 1.0

[[phases]]
name = "Phase 2 - Verbal"
question_count = 20
answer_key = {verbal}
options = ["A", "B", "C", "D"]
weight = 1.0

[[phases]]
name = "Phase 3 - Domain-Specific"
question_count = 15
answer_key = {domain}
options = ["A", "B", "C", "D"]
weight = 1.0
"#,
        aptitude = toml_list(&APTITUDE_KEY),
        verbal = toml_list(&VERBAL_KEY),
        domain = toml_list(&DOMAIN_KEY),
    )
}

/// Answers `correct` questions right, the next `wrong` wrong, the rest blank.
fn sample_answers(key: &[&str], correct: usize, wrong: usize) -> Vec<RawResponse> {
    key.iter()
        .enumerate()
        .map(|(i, answer)| {
            let index = i as i64;
            if i < correct {
                RawResponse::selected(index, *answer)
            } else if i < correct + wrong {
                let miss = if *answer == "A" { "B" } else { "A" };
                RawResponse::selected(index, miss)
            } else {
                RawResponse::blank(index)
            }
        })
        .collect()
}

fn sample_submission() -> Submission {
    let phase_answers = BTreeMap::from([
        (Phase::Aptitude.label().to_string(), sample_answers(&APTITUDE_KEY, 15, 5)),
        (Phase::Verbal.label().to_string(), sample_answers(&VERBAL_KEY, 8, 2)),
        (Phase::DomainSpecific.label().to_string(), sample_answers(&DOMAIN_KEY, 5, 0)),
    ]);
    Submission {
        candidate_id: "cand-001".into(),
        candidate_name: "Ada Lovelace".into(),
        domain: "Backend".into(),
        phase_answers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assessor_core::engine::evaluate;
    use assessor_core::parser::{lint_phase_table, parse_phase_table_str};

    #[test]
    fn sample_submission_scores_against_sample_config() {
        let table = parse_phase_table_str(&sample_config(), Path::new("assessor.toml")).unwrap();
        assert!(lint_phase_table(&table).is_empty());

        let result = evaluate(&table, &sample_submission()).unwrap();
        assert_eq!(result.score(Phase::Aptitude).unwrap().raw, 55);
        assert_eq!(result.score(Phase::Verbal).unwrap().raw, 30);
        assert_eq!(result.score(Phase::DomainSpecific).unwrap().raw, 20);
        assert!((result.overall_score() - 105.0).abs() < f64::EPSILON);
    }
}
