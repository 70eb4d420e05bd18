//! Accessors for the recipe and inventory collections consumed by the matcher.

use anyhow::Result;
use tracing::info;

use crate::matcher::RecipeMatcher;
use crate::recipe_model::{InventoryItem, MatchedRecipe, Recipe};

/// Supplies the full recipe collection
#[allow(async_fn_in_trait)]
pub trait RecipeSource {
    async fn recipes(&self) -> Result<Vec<Recipe>>;
}

/// Supplies the full inventory snapshot
#[allow(async_fn_in_trait)]
pub trait InventorySource {
    async fn inventory(&self) -> Result<Vec<InventoryItem>>;
}

/// Fetch both collections and rank the recipes against the inventory
///
/// Called again by the presentation layer whenever the tolerance changes or
/// the underlying data is refreshed.
pub async fn load_and_rank<R, I>(
    recipes: &R,
    inventory: &I,
    tolerance: f64,
) -> Result<Vec<MatchedRecipe>>
where
    R: RecipeSource,
    I: InventorySource,
{
    let recipes = recipes.recipes().await?;
    let inventory = inventory.inventory().await?;

    let ranked = RecipeMatcher::new(&inventory)
        .with_tolerance(tolerance)
        .rank(&recipes);

    info!(
        recipes = recipes.len(),
        inventory_items = inventory.len(),
        matched = ranked.len(),
        tolerance,
        "Matched recipes against inventory"
    );
    Ok(ranked)
}
