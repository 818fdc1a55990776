use super::{load_config, model_client, print_generation, recipe_store};
use crate::output::{print_json, print_table, truncate};
use anyhow::Context;
use assist_core::recipe::{self, Recipe};
use assist_core::{assistant, AssistError};
use clap::Subcommand;
use std::path::Path;
use tracing::warn;

/// Command column width in listings.
const COMMAND_PREVIEW: usize = 70;

// ---------------------------------------------------------------------------
// Subcommand types
// ---------------------------------------------------------------------------

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// List every recipe
    List,

    /// Search recipes by name or tag (case-insensitive substring)
    Search { query: String },

    /// Add a recipe by hand
    Add {
        /// Unique recipe name
        #[arg(long)]
        name: String,
        /// Shell command, stored verbatim
        #[arg(long)]
        command: String,
        /// Comma-separated tags
        #[arg(long, default_value = "")]
        tags: String,
        /// Skip AI tag suggestions
        #[arg(long)]
        no_suggest: bool,
    },

    /// Show one recipe in full (by id or name)
    Show { key: String },

    /// Ask the AI to explain a recipe (by id or name)
    Explain { key: String },
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

pub fn run(root: &Path, subcmd: RecipeSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        RecipeSubcommand::List => list(root, None, json),
        RecipeSubcommand::Search { query } => list(root, Some(&query), json),
        RecipeSubcommand::Add {
            name,
            command,
            tags,
            no_suggest,
        } => add(root, &name, &command, &tags, no_suggest, json),
        RecipeSubcommand::Show { key } => show(root, &key, json),
        RecipeSubcommand::Explain { key } => explain(root, &key, json),
    }
}

// ---------------------------------------------------------------------------
// list / search
// ---------------------------------------------------------------------------

fn list(root: &Path, query: Option<&str>, json: bool) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let recipes = recipe_store(root, &config).load();
    let hits: Vec<&Recipe> = match query {
        Some(q) => recipe::search(&recipes, q),
        None => recipes.iter().collect(),
    };

    if json {
        print_json(&hits)?;
        return Ok(());
    }
    if hits.is_empty() {
        match query {
            Some(q) => println!("No recipes found matching '{q}'."),
            None => println!("No command recipes found."),
        }
        return Ok(());
    }

    let rows = hits
        .iter()
        .map(|r| {
            vec![
                r.name.clone(),
                r.tags.join(", "),
                truncate(&r.command, COMMAND_PREVIEW),
            ]
        })
        .collect();
    print_table(&["NAME", "TAGS", "COMMAND"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// add
// ---------------------------------------------------------------------------

fn add(
    root: &Path,
    name: &str,
    command: &str,
    tags: &str,
    no_suggest: bool,
    json: bool,
) -> anyhow::Result<()> {
    let config = load_config(root)?;
    let store = recipe_store(root, &config);
    recipe::ensure_unique_name(&store.load(), name)?;

    let suggested = if no_suggest {
        Vec::new()
    } else {
        let client = model_client(&config)?;
        assistant::suggest_tags(&client, command).unwrap_or_else(|e| {
            warn!(error = %e, "tag suggestion failed");
            Vec::new()
        })
    };
    let tags = recipe::merge_tags(&suggested, &recipe::parse_tags(tags));

    let new = Recipe::new(name, command, tags)?;
    store.add_unique(new.clone()).context("failed to save recipe")?;

    if json {
        print_json(&new)?;
    } else {
        println!(
            "Successfully added recipe '{}' with {} tags.",
            new.name,
            new.tags.len()
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// show / explain
// ---------------------------------------------------------------------------

fn lookup(root: &Path, key: &str) -> anyhow::Result<Recipe> {
    let config = load_config(root)?;
    let recipes = recipe_store(root, &config).load();
    recipe::find(&recipes, key)
        .cloned()
        .ok_or_else(|| AssistError::RecipeNotFound(key.to_string()).into())
}

fn show(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let r = lookup(root, key)?;
    if json {
        print_json(&r)?;
        return Ok(());
    }
    println!("Recipe:  {}", r.name);
    println!("Tags:    {}", r.tags.join(", "));
    println!("Added:   {}", r.timestamp);
    println!("Id:      {}", r.id);
    println!();
    println!("{}", r.command);
    Ok(())
}

fn explain(root: &Path, key: &str, json: bool) -> anyhow::Result<()> {
    let r = lookup(root, key)?;
    let config = load_config(root)?;
    let client = model_client(&config)?;
    let generation = assistant::explain_recipe(&client, &r)?;

    if json {
        let value = serde_json::json!({
            "recipe": r,
            "explanation": generation.text,
        });
        print_json(&value)?;
    } else {
        println!("Command: {}", r.command);
        print_generation(&format!("AI Explanation for: {}", r.name), &generation);
    }
    Ok(())
}
