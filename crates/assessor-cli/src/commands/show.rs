//! The `assessor show` command.

use std::path::PathBuf;

use anyhow::Result;

use assessor_report::html::generate_html;
use assessor_report::markdown::generate_markdown;

pub async fn execute(
    candidate: String,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (engine, loaded) = super::engine(config_path.as_deref())?;
    let result = engine.result(&candidate).await?;

    match format.as_str() {
        "json" => match &output {
            Some(path) => {
                result.view().save_json(path)?;
                eprintln!("Wrote {}", path.display());
            }
            None => println!("{}", serde_json::to_string_pretty(&result.view())?),
        },
        "markdown" | "md" => {
            super::emit(&generate_markdown(&result, &loaded.table), output.as_deref())?
        }
        "html" => super::emit(&generate_html(&result, &loaded.table), output.as_deref())?,
        "text" => {
            if output.is_some() {
                anyhow::bail!("--output needs --format json, markdown or html");
            }
            super::score::print_result(&result, &loaded.table);
            println!(
                "Version {}, recorded {}",
                result.version(),
                result.created_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
        other => return Err(super::unknown_format(other, "text, json, markdown or html")),
    }

    Ok(())
}
