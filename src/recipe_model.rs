//! # Recipe and Inventory Data Model
//!
//! This module defines the records exchanged between the data-access layer,
//! the matcher and the presentation layer.
//!
//! ## Core Concepts
//!
//! - **Recipe**: a titled list of free-text ingredient lines and directions
//! - **InventoryItem**: a named, quantified stock entry in the food bank
//! - **MatchedRecipe**: a recipe scored against the current inventory
//!
//! ## Usage
//!
//! ```rust
//! use pantry_matcher::recipe_model::{InventoryItem, Recipe};
//!
//! let recipe = Recipe::new(1, "Tomato soup")
//!     .with_ingredients(["2 cups diced tomatoes", "1 onion, chopped"]);
//! let item = InventoryItem::new(7, "SKU-7", "tomatoes", 12);
//!
//! assert_eq!(recipe.ingredients.len(), 2);
//! assert!(item.is_in_stock());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Score at or above which a recipe is highlighted as a strong match
pub const STRONG_MATCH_SCORE: f64 = 0.9;

/// A recipe as stored by the food bank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Database identifier
    pub id: i64,

    /// Display title (e.g., "Tomato soup")
    pub title: String,

    /// Ingredient lines in authored order (e.g., "2 cups diced tomatoes").
    /// An absent list is treated as empty.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Direction lines in authored order
    #[serde(default)]
    pub directions: Vec<String>,

    /// Link to the original recipe page
    #[serde(default)]
    pub link: Option<String>,

    /// Where the recipe came from (e.g., "Imported")
    #[serde(default)]
    pub source: Option<String>,

    /// Optional picture of the dish
    #[serde(default)]
    pub image_url: Option<String>,

    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A stock entry in the food bank inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Database identifier
    pub id: i64,

    /// External item code from the inventory system
    pub item_id: String,

    /// Display name used for ingredient matching (e.g., "canned tomatoes")
    pub item_name: String,

    /// Units on hand. An absent quantity is treated as zero.
    #[serde(default)]
    pub quantity: i32,

    #[serde(default)]
    pub last_synced: Option<DateTime<Utc>>,
}

/// A recipe scored against an inventory snapshot
///
/// Computed fresh on every matcher call and never persisted. The two
/// partitions keep the authored ingredient order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchedRecipe {
    #[serde(flatten)]
    pub recipe: Recipe,

    /// Fraction of ingredients found in inventory (0.0 to 1.0)
    pub match_score: f64,

    /// Ingredient lines satisfied by the inventory
    pub available_ingredients: Vec<String>,

    /// Ingredient lines with no matching inventory item
    pub missing_ingredients: Vec<String>,

    /// Number of ingredient lines in the recipe
    pub total_ingredients: usize,
}

impl Recipe {
    /// Create a recipe with just an id and a title
    pub fn new(id: i64, title: &str) -> Self {
        Self {
            id,
            title: title.to_string(),
            ingredients: Vec::new(),
            directions: Vec::new(),
            link: None,
            source: None,
            image_url: None,
            created_at: None,
        }
    }

    /// Replace the ingredient lines
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Replace the direction lines
    pub fn with_directions<I, S>(mut self, directions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.directions = directions.into_iter().map(Into::into).collect();
        self
    }

    /// Set the source label
    pub fn with_source(mut self, source: &str) -> Self {
        self.source = Some(source.to_string());
        self
    }
}

impl InventoryItem {
    /// Create an inventory item
    pub fn new(id: i64, item_id: &str, item_name: &str, quantity: i32) -> Self {
        Self {
            id,
            item_id: item_id.to_string(),
            item_name: item_name.to_string(),
            quantity,
            last_synced: None,
        }
    }

    /// Check if at least one unit is on hand
    pub fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }
}

impl MatchedRecipe {
    /// Match score as a whole percentage, rounded half away from zero
    pub fn match_percent(&self) -> u32 {
        (self.match_score * 100.0).round() as u32
    }

    /// Check if the score reaches the strong-match highlight
    pub fn is_strong_match(&self) -> bool {
        self.match_score >= STRONG_MATCH_SCORE
    }

    /// Number of ingredients found in inventory
    pub fn available_count(&self) -> usize {
        self.available_ingredients.len()
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} ingredients)", self.title, self.ingredients.len())
    }
}

impl fmt::Display for InventoryItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x{} [{}]", self.item_name, self.quantity, self.item_id)
    }
}

impl fmt::Display for MatchedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} - {}% match ({}/{} ingredients):",
            self.recipe.title,
            self.match_percent(),
            self.available_count(),
            self.total_ingredients
        )?;

        for ingredient in &self.available_ingredients {
            writeln!(f, "  + {}", ingredient)?;
        }
        for ingredient in &self.missing_ingredients {
            writeln!(f, "  - {}", ingredient)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(score: f64) -> MatchedRecipe {
        MatchedRecipe {
            recipe: Recipe::new(1, "Soup"),
            match_score: score,
            available_ingredients: vec![],
            missing_ingredients: vec![],
            total_ingredients: 0,
        }
    }

    #[test]
    fn test_recipe_builder() {
        let recipe = Recipe::new(3, "Chili")
            .with_ingredients(["1 lb beans", "2 cups tomatoes"])
            .with_directions(vec!["Simmer".to_string()])
            .with_source("Imported");

        assert_eq!(recipe.id, 3);
        assert_eq!(recipe.ingredients, vec!["1 lb beans", "2 cups tomatoes"]);
        assert_eq!(recipe.directions, vec!["Simmer"]);
        assert_eq!(recipe.source.as_deref(), Some("Imported"));
        assert!(recipe.image_url.is_none());
    }

    #[test]
    fn test_recipe_missing_lists_deserialize_as_empty() {
        let recipe: Recipe = serde_json::from_str(r#"{"id": 9, "title": "Toast"}"#).unwrap();

        assert!(recipe.ingredients.is_empty());
        assert!(recipe.directions.is_empty());
        assert!(recipe.link.is_none());
    }

    #[test]
    fn test_inventory_missing_quantity_defaults_to_zero() {
        let item: InventoryItem =
            serde_json::from_str(r#"{"id": 1, "item_id": "A1", "item_name": "rice"}"#).unwrap();

        assert_eq!(item.quantity, 0);
        assert!(!item.is_in_stock());
    }

    #[test]
    fn test_match_percent_rounding() {
        assert_eq!(matched(2.0 / 3.0).match_percent(), 67);
        assert_eq!(matched(0.0).match_percent(), 0);
        assert_eq!(matched(1.0).match_percent(), 100);
        assert_eq!(matched(0.125).match_percent(), 13);
    }

    #[test]
    fn test_strong_match_threshold() {
        assert!(matched(0.9).is_strong_match());
        assert!(matched(1.0).is_strong_match());
        assert!(!matched(0.89).is_strong_match());
    }

    #[test]
    fn test_matched_recipe_serializes_flat() {
        let value = serde_json::to_value(matched(0.5)).unwrap();

        assert_eq!(value["title"], "Soup");
        assert_eq!(value["match_score"], 0.5);
        assert!(value.get("recipe").is_none());
    }

    #[test]
    fn test_display_formatting() {
        let recipe = MatchedRecipe {
            recipe: Recipe::new(1, "Salsa"),
            match_score: 0.5,
            available_ingredients: vec!["2 tomatoes".to_string()],
            missing_ingredients: vec!["1 lime".to_string()],
            total_ingredients: 2,
        };

        let display = format!("{}", recipe);
        assert!(display.contains("Salsa - 50% match (1/2 ingredients)"));
        assert!(display.contains("+ 2 tomatoes"));
        assert!(display.contains("- 1 lime"));
    }
}
