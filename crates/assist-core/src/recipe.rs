//! The recipe book: shell-command snippets with tags, stored as one JSON
//! array. The file is read whole and rewritten whole; recipes are only
//! ever appended.

use crate::error::{AssistError, Result};
use crate::io;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// Field order here is the on-disk field order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub timestamp: String,
}

impl Recipe {
    /// New recipe stamped with a fresh id and the local time.
    pub fn new(name: &str, command: &str, tags: Vec<String>) -> Result<Self> {
        let name = name.trim();
        let command = command.trim();
        if name.is_empty() {
            return Err(AssistError::EmptyField { field: "name" });
        }
        if command.is_empty() {
            return Err(AssistError::EmptyField { field: "command" });
        }
        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            command: command.to_string(),
            tags: merge_tags(&tags, &[]),
            timestamp: Local::now().format(TIMESTAMP_FORMAT).to_string(),
        })
    }

    /// Case-insensitive substring match on the name or any tag.
    /// `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.tags.iter().any(|t| t.to_lowercase().contains(needle))
    }
}

/// Recipes whose name or tags contain `query`, in store order.
pub fn search<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    let needle = query.trim().to_lowercase();
    recipes.iter().filter(|r| r.matches(&needle)).collect()
}

/// Look a recipe up by exact id, then by case-insensitive name.
pub fn find<'a>(recipes: &'a [Recipe], key: &str) -> Option<&'a Recipe> {
    let lowered = key.trim().to_lowercase();
    recipes
        .iter()
        .find(|r| r.id == key)
        .or_else(|| recipes.iter().find(|r| r.name.to_lowercase() == lowered))
}

pub fn ensure_unique_name(recipes: &[Recipe], name: &str) -> Result<()> {
    let lowered = name.trim().to_lowercase();
    if recipes.iter().any(|r| r.name.to_lowercase() == lowered) {
        return Err(AssistError::RecipeExists(name.trim().to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

/// Split comma-separated user input into lowercase tags.
pub fn parse_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

/// De-duplicated, sorted union of two tag lists.
pub fn merge_tags(suggested: &[String], user: &[String]) -> Vec<String> {
    suggested
        .iter()
        .chain(user)
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

// ---------------------------------------------------------------------------
// RecipeStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct RecipeStore {
    path: PathBuf,
}

impl RecipeStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every recipe. A missing file is an empty book; an unreadable or
    /// corrupt one is logged and also treated as empty.
    pub fn load(&self) -> Vec<Recipe> {
        match self.try_load() {
            Ok(recipes) => recipes,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "could not load recipes, starting with an empty list");
                Vec::new()
            }
        }
    }

    pub fn try_load(&self) -> Result<Vec<Recipe>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = std::fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Rewrite the whole file.
    pub fn save(&self, recipes: &[Recipe]) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        recipes.serialize(&mut ser)?;
        io::atomic_write(&self.path, &buf)?;
        info!(path = %self.path.display(), count = recipes.len(), "recipes saved");
        Ok(())
    }

    /// Append without any uniqueness check.
    pub fn append(&self, recipe: Recipe) -> Result<Vec<Recipe>> {
        let mut recipes = self.load();
        recipes.push(recipe);
        self.save(&recipes)?;
        Ok(recipes)
    }

    /// Append unless a recipe with the same name (ignoring case) exists.
    /// On conflict the file is left untouched.
    pub fn add_unique(&self, recipe: Recipe) -> Result<Vec<Recipe>> {
        let mut recipes = self.load();
        ensure_unique_name(&recipes, &recipe.name)?;
        recipes.push(recipe);
        self.save(&recipes)?;
        Ok(recipes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
