use super::{load_config, model_client, print_generation};
use crate::output::print_json;
use assist_core::assistant;
use std::path::Path;

pub fn run(root: &Path, question: &str, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let client = model_client(&config)?;
    let generation = assistant::ask(&client, question)?;

    if json {
        print_json(&generation)?;
    } else {
        print_generation("AI Response:", &generation);
    }
    Ok(())
}
