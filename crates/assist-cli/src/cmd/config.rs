use super::load_config;
use crate::output::print_json;
use anyhow::Context;
use assist_core::config::{Config, WarnLevel};
use assist_core::paths;
use clap::Subcommand;
use std::path::Path;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum ConfigSubcommand {
    /// Show the effective configuration
    Show,

    /// Write a default .assist/config.yaml if none exists
    Init,

    /// Validate the config for common mistakes
    Validate,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: ConfigSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        ConfigSubcommand::Show => show(root, json),
        ConfigSubcommand::Init => init(root),
        ConfigSubcommand::Validate => validate(root, json),
    }
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

fn show(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let key_set = config.model.api_key_from_env().is_some();

    if json {
        let value = serde_json::json!({
            "config": config,
            "api_key_set": key_set,
            "recipes_path": config.recipes_path(root),
        });
        print_json(&value)?;
        return Ok(());
    }

    let m = &config.model;
    println!("Endpoint:        {}", m.endpoint(false));
    if m.grounded_model.is_some() {
        println!("Grounded:        {}", m.endpoint(true));
    }
    println!(
        "API key:         {} ({})",
        m.api_key_env,
        if key_set { "set" } else { "not set" }
    );
    println!(
        "Timeouts:        {}s request, {}s connect",
        m.timeout_seconds, m.connect_timeout_seconds
    );
    println!(
        "Retries:         {} attempts, {}ms base backoff",
        m.max_attempts, m.backoff_base_ms
    );
    println!("Recipes:         {}", config.recipes_path(root).display());
    Ok(())
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

fn init(root: &Path) -> anyhow::Result<()> {
    let written = Config::init(root).context("failed to write config")?;
    let path = paths::config_path(root);
    if written {
        println!("Wrote {}", path.display());
    } else {
        println!("{} already exists; left unchanged.", path.display());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

fn validate(root: &Path, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let warnings = config.validate();

    if json {
        let value = serde_json::json!({
            "warnings": warnings,
        });
        print_json(&value)?;
    } else if warnings.is_empty() {
        println!("Config is valid. No warnings.");
    } else {
        for w in &warnings {
            let prefix = match w.level {
                WarnLevel::Warning => "warning",
                WarnLevel::Error => "error",
            };
            println!("[{prefix}] {}", w.message);
        }
    }

    if warnings.iter().any(|w| w.level == WarnLevel::Error) {
        anyhow::bail!("config validation found errors");
    }
    Ok(())
}
