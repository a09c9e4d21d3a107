//! HTML result report.
//!
//! Produces a self-contained HTML page with all CSS inlined: candidate
//! header, a per-phase table, a bar chart of each phase against its maximum,
//! and the raw result view as JSON.

use anyhow::{Context, Result};
use std::path::Path;

use assessor_core::model::PhaseTable;
use assessor_core::results::AssessmentResult;

use crate::summary::{summarize, PhaseLine};

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

/// Generate an HTML report for one result.
pub fn generate_html(result: &AssessmentResult, table: &PhaseTable) -> String {
    let lines = summarize(result, table);
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Assessment result: {}</title>\n",
        html_escape(result.candidate_name())
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str(&format!("<h1>{}</h1>\n", html_escape(result.candidate_name())));
    html.push_str(&format!(
        "<p class=\"meta\">Candidate <strong>{}</strong> | Domain: {} | Version {} | {}</p>\n",
        html_escape(result.candidate_id()),
        html_escape(result.domain()),
        result.version(),
        result.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"overall\">Overall score: <strong>{:.1}</strong> of {:.1}</p>\n",
        result.overall_score(),
        table.max_overall_score()
    ));
    html.push_str("</header>\n");

    // Phase table
    html.push_str("<section class=\"phases\">\n");
    html.push_str("<h2>Phases</h2>\n");
    html.push_str("<table>\n");
    html.push_str("<thead><tr><th>Phase</th><th>Score</th><th>Correct</th><th>Wrong</th><th>Unanswered</th><th>Weight</th><th>Feedback</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for line in &lines {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{} / {}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td></tr>\n",
            html_escape(line.phase.label()),
            line.raw,
            line.max_raw,
            line.correct,
            line.wrong,
            line.unanswered,
            line.weight,
            band_class(line),
            html_escape(&line.feedback),
        ));
    }
    html.push_str("</tbody></table>\n");

    if !lines.is_empty() {
        html.push_str(&generate_bar_chart(&lines));
    }
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Result JSON</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(&result.view()).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(result: &AssessmentResult, table: &PhaseTable, path: &Path) -> Result<()> {
    let html = generate_html(result, table);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write report to {}", path.display()))?;
    Ok(())
}

/// CSS class for a feedback cell: top band, bottom band, or in between.
fn band_class(line: &PhaseLine) -> &'static str {
    if line.band_index == 0 {
        "top"
    } else if line.band_index + 1 >= line.band_count {
        "bottom"
    } else {
        "middle"
    }
}

fn generate_bar_chart(lines: &[PhaseLine]) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 220;

    let total_height = lines.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, line) in lines.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        // Negative scores draw as an empty bar.
        let width = (line.ratio.clamp(0.0, 1.0) * max_width as f64) as usize;

        let color = match band_class(line) {
            "top" => "#22c55e",
            "middle" => "#eab308",
            _ => "#ef4444",
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(line.phase.label())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + width + 8,
            y + bar_height / 2,
            line.ratio * 100.0
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --top: #dcfce7; --middle: #fef9c3; --bottom: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --top: #064e3b; --middle: #713f12; --bottom: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.overall { font-size: 1.25rem; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); }
.top { background: var(--top); }
.middle { background: var(--middle); }
.bottom { background: var(--bottom); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;
