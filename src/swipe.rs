//! # Swipe Deck
//!
//! Presents ranked recipes one card at a time. Swiping right likes a recipe
//! and puts it in the cart at one serving; swiping left dislikes it. Every
//! swipe is recorded together with the score the recipe had at the time.
//!
//! The deck filters on its own tolerance slider (a whole percentage) using
//! the same inclusive rule as the matcher.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::cart::{CartRecipe, DEFAULT_SERVINGS_MULTIPLIER};
use crate::recipe_model::MatchedRecipe;
use crate::session::SessionContext;

/// Initial slider position
pub const DEFAULT_TOLERANCE_PERCENT: u8 = 70;

/// Gesture made on the current card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDirection {
    Left,
    Right,
}

/// Stored interpretation of a swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeAction {
    Like,
    Dislike,
}

impl From<SwipeDirection> for SwipeAction {
    fn from(direction: SwipeDirection) -> Self {
        match direction {
            SwipeDirection::Right => SwipeAction::Like,
            SwipeDirection::Left => SwipeAction::Dislike,
        }
    }
}

impl SwipeAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            SwipeAction::Like => "like",
            SwipeAction::Dislike => "dislike",
        }
    }
}

/// A recorded swipe
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeSwipe {
    pub recipe_id: i64,
    pub session_id: String,
    pub action: SwipeAction,
    pub match_score: f64,
}

/// What a swipe produced
#[derive(Debug, Clone, PartialEq)]
pub struct SwipeOutcome {
    pub swipe: RecipeSwipe,
    /// Set when the recipe was liked
    pub cart_recipe: Option<CartRecipe>,
}

/// Convert a slider percentage to a tolerance; values above 100 saturate
pub fn tolerance_from_percent(percent: u8) -> f64 {
    f64::from(percent.min(100)) / 100.0
}

/// Card deck over a ranked recipe list
#[derive(Debug, Clone)]
pub struct SwipeDeck {
    recipes: Vec<MatchedRecipe>,
    visible: Vec<usize>,
    tolerance_percent: u8,
    position: usize,
}

impl SwipeDeck {
    /// Create a deck showing the recipes that reach `tolerance_percent`
    pub fn new(recipes: Vec<MatchedRecipe>, tolerance_percent: u8) -> Self {
        let mut deck = Self {
            recipes,
            visible: Vec::new(),
            tolerance_percent,
            position: 0,
        };
        deck.refilter();
        deck
    }

    /// Move the slider; the deck re-filters and goes back to the first card
    pub fn set_tolerance_percent(&mut self, percent: u8) {
        self.tolerance_percent = percent;
        self.refilter();
    }

    pub fn tolerance_percent(&self) -> u8 {
        self.tolerance_percent
    }

    fn refilter(&mut self) {
        let tolerance = tolerance_from_percent(self.tolerance_percent);
        self.visible = self
            .recipes
            .iter()
            .enumerate()
            .filter(|(_, recipe)| recipe.match_score >= tolerance)
            .map(|(index, _)| index)
            .collect();
        self.position = 0;

        debug!(
            tolerance_percent = self.tolerance_percent,
            visible = self.visible.len(),
            "Swipe deck filtered"
        );
    }

    /// The card on top of the deck, if any are left
    pub fn current(&self) -> Option<&MatchedRecipe> {
        self.visible
            .get(self.position)
            .map(|&index| &self.recipes[index])
    }

    /// Number of cards not swiped yet, including the current one
    pub fn remaining(&self) -> usize {
        self.visible.len().saturating_sub(self.position)
    }

    /// Number of cards that pass the current tolerance
    pub fn visible_count(&self) -> usize {
        self.visible.len()
    }

    /// Swipe the current card and advance. Returns `None` when the deck is
    /// exhausted.
    pub fn swipe(
        &mut self,
        direction: SwipeDirection,
        session: &SessionContext,
    ) -> Option<SwipeOutcome> {
        let recipe = self.current()?.clone();
        let action = SwipeAction::from(direction);

        let swipe = RecipeSwipe {
            recipe_id: recipe.recipe.id,
            session_id: session.id().to_string(),
            action,
            match_score: recipe.match_score,
        };

        let cart_recipe = match action {
            SwipeAction::Like => Some(CartRecipe::new(
                recipe.recipe,
                DEFAULT_SERVINGS_MULTIPLIER,
            )),
            SwipeAction::Dislike => None,
        };

        info!(
            session_id = %session,
            recipe_id = swipe.recipe_id,
            action = action.as_str(),
            "Recipe swiped"
        );

        self.position += 1;
        Some(SwipeOutcome { swipe, cart_recipe })
    }

    /// Go back to the first card
    pub fn reset(&mut self) {
        self.position = 0;
    }
}
