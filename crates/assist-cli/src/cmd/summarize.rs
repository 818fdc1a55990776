use super::{load_config, model_client, print_generation};
use crate::output::print_json;
use assist_core::extract::{self, Severity};
use assist_core::assistant;
use std::path::Path;

/// A warning (readable file, nothing to summarize) ends the command
/// successfully without a model call; an error fails it.
pub fn run(root: &Path, path: &Path, json: bool) -> anyhow::Result<()> {
    let summary = match assistant::summary_request(extract::extract(path)) {
        Ok(summary) => summary,
        Err(e) if e.severity() == Severity::Warning => {
            if json {
                print_json(&serde_json::json!({
                    "path": path.display().to_string(),
                    "warning": e.to_string(),
                }))?;
            } else {
                println!("{e}");
            }
            return Ok(());
        }
        Err(e) => anyhow::bail!("{e}"),
    };
    if let (Some(chars), false) = (summary.extracted_chars, json) {
        println!(
            "Successfully extracted {chars} characters from '{}'.",
            path.display()
        );
    }

    let config = load_config(root)?;
    let client = model_client(&config)?;
    let generation = client.generate(&summary.request)?;

    if json {
        let value = serde_json::json!({
            "path": path.display().to_string(),
            "extracted_chars": summary.extracted_chars,
            "summary": generation.text,
        });
        print_json(&value)?;
    } else {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        print_generation(&format!("Summary of {name}:"), &generation);
    }
    Ok(())
}
