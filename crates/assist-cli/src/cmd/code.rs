use super::{load_config, model_client, print_generation};
use crate::output::print_json;
use anyhow::Context;
use assist_core::assistant;
use std::io::Read;
use std::path::Path;

// ---------------------------------------------------------------------------
// explain
// ---------------------------------------------------------------------------

pub fn explain(root: &Path, file: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let snippet = match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            buf
        }
    };
    if snippet.trim().is_empty() {
        anyhow::bail!("no code provided");
    }

    let config = load_config(root)?;
    let client = model_client(&config)?;
    let generation = assistant::explain_code(&client, &snippet)?;

    if json {
        print_json(&generation)?;
    } else {
        print_generation("Code Analysis:", &generation);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// generate
// ---------------------------------------------------------------------------

pub fn generate(root: &Path, request: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let client = model_client(&config)?;
    let generation = assistant::generate_code(&client, request)?;

    if json {
        print_json(&generation)?;
    } else {
        print_generation("Generated Code:", &generation);
    }
    Ok(())
}
