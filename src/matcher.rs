//! # Recipe Matcher Module
//!
//! Decides which of a recipe's ingredients the food bank can supply, scores
//! each recipe by the fraction of ingredients available, and ranks recipes
//! against a minimum score (the tolerance).
//!
//! ## Matching rule
//!
//! An ingredient line is available when any of its normalized words is a
//! substring of some normalized inventory name, or that name is a substring
//! of the word. The rule is deliberately coarse: "egg" matches "eggplant"
//! and "scallion" does not match "green onion".
//!
//! ## Usage
//!
//! ```rust
//! use pantry_matcher::matcher::{match_and_rank, DEFAULT_TOLERANCE};
//! use pantry_matcher::recipe_model::{InventoryItem, Recipe};
//!
//! let inventory = vec![
//!     InventoryItem::new(1, "A1", "tomatoes", 4),
//!     InventoryItem::new(2, "A2", "onions", 2),
//! ];
//! let recipes = vec![Recipe::new(1, "Salsa")
//!     .with_ingredients(["2 cups diced tomatoes", "1 onion, chopped"])];
//!
//! let ranked = match_and_rank(&recipes, &inventory, DEFAULT_TOLERANCE);
//! assert_eq!(ranked.len(), 1);
//! assert_eq!(ranked[0].match_score, 1.0);
//! ```

use crate::recipe_model::{InventoryItem, MatchedRecipe, Recipe};
use crate::text_processing::normalize;
use tracing::{debug, trace};

/// Minimum match score used when the caller has no preference
pub const DEFAULT_TOLERANCE: f64 = 0.7;

/// Matcher over one inventory snapshot
///
/// Normalizes every inventory name once so that repeated availability
/// checks against the same snapshot do not redo the work. Holds no
/// reference to the inventory itself.
#[derive(Debug, Clone)]
pub struct RecipeMatcher {
    /// Normalized inventory display names, in inventory order
    item_names: Vec<String>,
    /// Minimum score kept by [`RecipeMatcher::rank`]
    tolerance: f64,
}

impl RecipeMatcher {
    /// Create a matcher for the given inventory with the default tolerance
    pub fn new(inventory: &[InventoryItem]) -> Self {
        let item_names = inventory
            .iter()
            .map(|item| normalize(&item.item_name))
            .collect();

        Self {
            item_names,
            tolerance: DEFAULT_TOLERANCE,
        }
    }

    /// Set the minimum match score. The value is not clamped: a negative
    /// tolerance keeps everything and one above 1.0 keeps nothing.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Check if an ingredient line is satisfied by any inventory item
    pub fn is_available(&self, ingredient: &str) -> bool {
        let normalized = normalize(ingredient);
        let words: Vec<&str> = normalized.split_whitespace().collect();

        // No content words means nothing to look for
        if words.is_empty() {
            return false;
        }

        let found = self.item_names.iter().any(|item_name| {
            words
                .iter()
                .any(|word| item_name.contains(word) || word.contains(item_name.as_str()))
        });

        trace!(
            ingredient = %ingredient,
            normalized = %normalized,
            found,
            "Checked ingredient availability"
        );
        found
    }

    /// Score a recipe and split its ingredients into available and missing
    pub fn score(&self, recipe: &Recipe) -> MatchedRecipe {
        let (available_ingredients, missing_ingredients): (Vec<String>, Vec<String>) = recipe
            .ingredients
            .iter()
            .cloned()
            .partition(|ingredient| self.is_available(ingredient));

        let total_ingredients = recipe.ingredients.len();
        let match_score = ratio(available_ingredients.len(), total_ingredients);

        MatchedRecipe {
            recipe: recipe.clone(),
            match_score,
            available_ingredients,
            missing_ingredients,
            total_ingredients,
        }
    }

    /// Compute only the match score of a recipe
    pub fn score_only(&self, recipe: &Recipe) -> f64 {
        let available = recipe
            .ingredients
            .iter()
            .filter(|ingredient| self.is_available(ingredient))
            .count();

        ratio(available, recipe.ingredients.len())
    }

    /// Score every recipe, keep those reaching the tolerance and sort them
    /// by score, best first
    ///
    /// The sort is stable: recipes with equal scores keep their input order.
    pub fn rank(&self, recipes: &[Recipe]) -> Vec<MatchedRecipe> {
        let mut ranked: Vec<MatchedRecipe> = recipes
            .iter()
            .map(|recipe| self.score(recipe))
            .filter(|matched| matched.match_score >= self.tolerance)
            .collect();

        ranked.sort_by(|a, b| b.match_score.total_cmp(&a.match_score));

        debug!(
            recipes = recipes.len(),
            retained = ranked.len(),
            tolerance = self.tolerance,
            "Ranked recipes against inventory"
        );
        ranked
    }
}

fn ratio(available: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        available as f64 / total as f64
    }
}

/// Check if an ingredient line is satisfied by any item of the inventory
pub fn is_available(ingredient: &str, inventory: &[InventoryItem]) -> bool {
    RecipeMatcher::new(inventory).is_available(ingredient)
}

/// Score a single recipe against the inventory
pub fn score_recipe(recipe: &Recipe, inventory: &[InventoryItem]) -> MatchedRecipe {
    RecipeMatcher::new(inventory).score(recipe)
}

/// Match score of a single recipe, without the ingredient partition
pub fn match_score(recipe: &Recipe, inventory: &[InventoryItem]) -> f64 {
    RecipeMatcher::new(inventory).score_only(recipe)
}

/// Score all recipes and return those with `match_score >= tolerance`,
/// best first
pub fn match_and_rank(
    recipes: &[Recipe],
    inventory: &[InventoryItem],
    tolerance: f64,
) -> Vec<MatchedRecipe> {
    RecipeMatcher::new(inventory)
        .with_tolerance(tolerance)
        .rank(recipes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pantry(names: &[&str]) -> Vec<InventoryItem> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| InventoryItem::new(i as i64 + 1, &format!("SKU-{}", i + 1), name, 5))
            .collect()
    }

    fn salsa() -> Recipe {
        Recipe::new(1, "Salsa").with_ingredients([
            "2 cups diced tomatoes",
            "1 onion, chopped",
            "3 tbsp olive oil",
        ])
    }

    #[test]
    fn test_available_word_inside_item_name() {
        let inventory = pantry(&["onions"]);
        assert!(is_available("1 onion, chopped", &inventory));
    }

    #[test]
    fn test_available_item_name_inside_word() {
        let inventory = pantry(&["egg"]);
        assert!(is_available("2 eggs", &inventory));
    }

    #[test]
    fn test_substring_false_positive_is_kept() {
        let inventory = pantry(&["eggplant"]);
        assert!(is_available("1 egg", &inventory));
    }

    #[test]
    fn test_vocabulary_mismatch_is_missing() {
        let inventory = pantry(&["green onion"]);
        assert!(!is_available("2 scallions", &inventory));
    }

    #[test]
    fn test_all_stop_word_ingredient_is_never_available() {
        let inventory = pantry(&["cups", "tomatoes"]);
        assert!(!is_available("2 cups", &inventory));
    }

    #[test]
    fn test_empty_inventory_has_nothing() {
        assert!(!is_available("2 cups diced tomatoes", &[]));
    }

    #[test]
    fn test_score_recipe_partitions_in_order() {
        let matched = score_recipe(&salsa(), &pantry(&["tomatoes", "onions"]));

        assert_eq!(
            matched.available_ingredients,
            vec!["2 cups diced tomatoes", "1 onion, chopped"]
        );
        assert_eq!(matched.missing_ingredients, vec!["3 tbsp olive oil"]);
        assert_eq!(matched.total_ingredients, 3);
        assert_eq!(matched.match_score, 2.0 / 3.0);
    }

    #[test]
    fn test_score_recipe_without_ingredients() {
        let matched = score_recipe(&Recipe::new(2, "Air"), &pantry(&["tomatoes"]));

        assert_eq!(matched.match_score, 0.0);
        assert_eq!(matched.total_ingredients, 0);
        assert!(matched.available_ingredients.is_empty());
        assert!(matched.missing_ingredients.is_empty());
    }

    #[test]
    fn test_match_score_agrees_with_score_recipe() {
        let inventory = pantry(&["tomatoes", "onions"]);
        assert_eq!(
            match_score(&salsa(), &inventory),
            score_recipe(&salsa(), &inventory).match_score
        );
    }

    #[test]
    fn test_rank_tolerance_boundaries() {
        let inventory = pantry(&["tomatoes", "onions"]);

        assert!(match_and_rank(&[salsa()], &inventory, 0.7).is_empty());
        assert_eq!(match_and_rank(&[salsa()], &inventory, 0.6).len(), 1);
    }

    #[test]
    fn test_rank_sorts_best_first_and_keeps_ties_in_input_order() {
        let inventory = pantry(&["rice", "beans"]);
        let recipes = vec![
            Recipe::new(1, "Half A").with_ingredients(["rice", "kale"]),
            Recipe::new(2, "Full").with_ingredients(["rice", "beans"]),
            Recipe::new(3, "Half B").with_ingredients(["beans", "kale"]),
        ];

        let ranked = match_and_rank(&recipes, &inventory, 0.0);
        let ids: Vec<i64> = ranked.iter().map(|m| m.recipe.id).collect();

        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn test_matcher_default_tolerance() {
        let matcher = RecipeMatcher::new(&[]);
        assert_eq!(matcher.tolerance(), DEFAULT_TOLERANCE);
    }
}
