use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use tracing::info;

use crate::adaptation::proposal::{build_committed_recipe, AdaptationSession};
use crate::recipe_model::Recipe;

/// File-backed recipe store: one JSON document holding the full recipe
/// list, the same blob layout the mobile app keeps under its single
/// storage key. Every write rewrites the whole file.
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

    /// Loads all recipes. A missing file is an empty store, not an error.
    pub fn load_recipes(&self) -> Result<Vec<Recipe>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read recipe store at {:?}", self.path))?;
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw)
            .with_context(|| format!("Recipe store at {:?} is not valid JSON", self.path))
    }

    pub fn get_recipe(&self, id: &str) -> Result<Option<Recipe>> {
        let recipes = self.load_recipes()?;
        Ok(recipes.into_iter().find(|r| r.id == id))
    }

    /// Upserts by id: an existing recipe with the same id is replaced in
    /// place, otherwise the recipe is appended.
    pub fn save_recipe(&self, recipe: &Recipe) -> Result<()> {
        let mut recipes = self.load_recipes()?;
        match recipes.iter_mut().find(|r| r.id == recipe.id) {
            Some(existing) => *existing = recipe.clone(),
            None => recipes.push(recipe.clone()),
        }
        self.write_all(&recipes)
    }

    /// Removes a recipe. Returns whether anything was deleted.
    pub fn delete_recipe(&self, id: &str) -> Result<bool> {
        let mut recipes = self.load_recipes()?;
        let before = recipes.len();
        recipes.retain(|r| r.id != id);
        if recipes.len() == before {
            return Ok(false);
        }
        self.write_all(&recipes)?;
        Ok(true)
    }

    fn write_all(&self, recipes: &[Recipe]) -> Result<()> {
        let raw = serde_json::to_string_pretty(recipes)
            .context("Failed to serialize recipe store contents")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write recipe store at {:?}", self.path))
    }
}

/// Commit step of the review flow: materializes the pending proposal as a
/// new recipe, persists it, and only then clears the session. On any
/// persistence failure the proposal stays pending so the user's review
/// work survives a retry. Deleting the original recipe is a separate,
/// explicit call and never part of the commit.
pub fn commit_adapted_recipe(
    store: &RecipeStore,
    session: &mut AdaptationSession,
    now: DateTime<Utc>,
) -> Result<String> {
    let proposal = session
        .proposal()
        .ok_or_else(|| anyhow!("no adaptation is pending"))?;
    let recipe = build_committed_recipe(proposal, now);
    store
        .save_recipe(&recipe)
        .context("Failed to save adapted recipe")?;
    info!(id = %recipe.id, "saved adapted recipe");
    let id = recipe.id;
    session.clear();
    Ok(id)
}
