pub mod ask;
pub mod code;
pub mod config;
pub mod menu;
pub mod recipe;
pub mod summarize;

use anyhow::Context;
use assist_core::config::Config;
use assist_core::model::{Generation, ModelClient};
use assist_core::recipe::RecipeStore;
use std::path::Path;

/// Config for `root`, falling back to defaults when no file exists.
pub fn load_config(root: &Path) -> anyhow::Result<Config> {
    Config::load(root).context("failed to load config")
}

/// Model client with the API key taken from the configured env var.
pub fn model_client(config: &Config) -> anyhow::Result<ModelClient> {
    let key = config.model.api_key_from_env();
    ModelClient::new(config.model.clone(), key).context("failed to build HTTP client")
}

pub fn recipe_store(root: &Path, config: &Config) -> RecipeStore {
    RecipeStore::new(config.recipes_path(root))
}

/// Reply text followed by any grounding sources.
pub fn print_generation(heading: &str, generation: &Generation) {
    println!("{}", crate::output::rule());
    println!("{heading}");
    println!("{}", generation.text);
    if !generation.citations.is_empty() {
        println!("\nSources:");
        for citation in &generation.citations {
            println!("{citation}");
        }
    }
    println!("{}", crate::output::rule());
}
