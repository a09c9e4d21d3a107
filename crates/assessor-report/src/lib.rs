//! assessor-report: Consumers of the assessment result contract.
//!
//! Renders stored results as self-contained HTML or markdown and derives a
//! learning roadmap from them. Everything here reads results; nothing
//! writes them.

pub mod html;
pub mod markdown;
pub mod roadmap;
pub mod summary;

#[cfg(test)]
mod testing;

pub use html::{generate_html, write_html_report};
pub use markdown::generate_markdown;
pub use roadmap::{FocusArea, FocusAreaRecommender, LearningPath, Priority};
pub use summary::{summarize, PhaseLine};
