//! # Shopping Cart
//!
//! Per-session cart holding whole recipes (scaled by a servings multiplier)
//! and loose inventory items.
//!
//! ## Usage
//!
//! ```rust
//! use pantry_matcher::cart::Cart;
//! use pantry_matcher::recipe_model::{InventoryItem, Recipe};
//! use pantry_matcher::session::SessionContext;
//!
//! let mut cart = Cart::new(SessionContext::new());
//! let rice = InventoryItem::new(1, "R1", "rice", 10);
//!
//! cart.add_item(&rice, 2)?;
//! cart.add_item(&rice, 1)?;
//! cart.add_recipe(Recipe::new(5, "Rice bowl").with_ingredients(["1 cup rice"]), 2.0)?;
//!
//! assert_eq!(cart.total_items(), 3);
//! assert_eq!(cart.total_recipes(), 1);
//! # Ok::<(), pantry_matcher::cart::CartError>(())
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::recipe_model::{InventoryItem, Recipe};
use crate::session::SessionContext;

/// Servings multiplier for recipes added without one
pub const DEFAULT_SERVINGS_MULTIPLIER: f64 = 1.0;

/// A loose inventory item in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Database id of the inventory item
    pub inventory_item_id: i64,
    /// External item code
    pub item_id: String,
    pub item_name: String,
    /// Units requested
    pub quantity: u32,
    /// Units on hand when the item was added
    pub available_quantity: i32,
}

/// A recipe in the cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartRecipe {
    pub recipe: Recipe,
    pub servings_multiplier: f64,
}

impl CartRecipe {
    pub fn new(recipe: Recipe, servings_multiplier: f64) -> Self {
        Self {
            recipe,
            servings_multiplier,
        }
    }
}

/// Snapshot of a cart handed to the external cart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportData {
    pub recipes: Vec<CartRecipe>,
    pub items: Vec<CartItem>,
    pub total_items: u64,
    pub total_recipes: usize,
}

/// Cart for one session
#[derive(Debug, Clone)]
pub struct Cart {
    session: SessionContext,
    items: Vec<CartItem>,
    recipes: Vec<CartRecipe>,
}

impl Cart {
    /// Create an empty cart
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            items: Vec::new(),
            recipes: Vec::new(),
        }
    }

    /// Rebuild a cart from stored lines
    pub fn from_parts(
        session: SessionContext,
        items: Vec<CartItem>,
        recipes: Vec<CartRecipe>,
    ) -> Self {
        Self {
            session,
            items,
            recipes,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn recipes(&self) -> &[CartRecipe] {
        &self.recipes
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.recipes.is_empty()
    }

    /// Add units of an inventory item. Adding an item already in the cart
    /// increases its quantity; a sum that does not fit a `u32` is rejected
    /// and the line is left unchanged.
    pub fn add_item(&mut self, item: &InventoryItem, quantity: u32) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        if let Some(existing) = self
            .items
            .iter_mut()
            .find(|line| line.inventory_item_id == item.id)
        {
            existing.quantity = existing
                .quantity
                .checked_add(quantity)
                .ok_or(CartError::QuantityOverflow(item.id))?;
            debug!(
                session_id = %self.session,
                inventory_item_id = item.id,
                quantity = existing.quantity,
                "Merged item into existing cart line"
            );
            return Ok(());
        }

        self.items.push(CartItem {
            inventory_item_id: item.id,
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            quantity,
            available_quantity: item.quantity,
        });
        info!(
            session_id = %self.session,
            inventory_item_id = item.id,
            quantity,
            "Item added to cart"
        );
        Ok(())
    }

    /// Set the quantity of an item already in the cart
    pub fn update_item_quantity(
        &mut self,
        inventory_item_id: i64,
        quantity: u32,
    ) -> Result<(), CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity(quantity));
        }

        let line = self
            .items
            .iter_mut()
            .find(|line| line.inventory_item_id == inventory_item_id)
            .ok_or(CartError::UnknownItem(inventory_item_id))?;
        line.quantity = quantity;
        Ok(())
    }

    pub fn remove_item(&mut self, inventory_item_id: i64) -> Result<CartItem, CartError> {
        let position = self
            .items
            .iter()
            .position(|line| line.inventory_item_id == inventory_item_id)
            .ok_or(CartError::UnknownItem(inventory_item_id))?;
        Ok(self.items.remove(position))
    }

    /// Add a recipe at the given servings multiplier. Adding a recipe
    /// already in the cart adds to its multiplier; the merged multiplier
    /// must still be valid or the line is left unchanged.
    pub fn add_recipe(
        &mut self,
        recipe: Recipe,
        servings_multiplier: f64,
    ) -> Result<(), CartError> {
        validate_servings(servings_multiplier)?;

        if let Some(existing) = self
            .recipes
            .iter_mut()
            .find(|line| line.recipe.id == recipe.id)
        {
            let merged = existing.servings_multiplier + servings_multiplier;
            validate_servings(merged)?;
            existing.servings_multiplier = merged;
            return Ok(());
        }

        info!(
            session_id = %self.session,
            recipe_id = recipe.id,
            servings_multiplier,
            "Recipe added to cart"
        );
        self.recipes.push(CartRecipe::new(recipe, servings_multiplier));
        Ok(())
    }

    /// Add a recipe produced by a like on the swipe deck
    pub fn add_cart_recipe(&mut self, cart_recipe: CartRecipe) -> Result<(), CartError> {
        self.add_recipe(cart_recipe.recipe, cart_recipe.servings_multiplier)
    }

    pub fn update_recipe_servings(
        &mut self,
        recipe_id: i64,
        servings_multiplier: f64,
    ) -> Result<(), CartError> {
        validate_servings(servings_multiplier)?;

        let line = self
            .recipes
            .iter_mut()
            .find(|line| line.recipe.id == recipe_id)
            .ok_or(CartError::UnknownRecipe(recipe_id))?;
        line.servings_multiplier = servings_multiplier;
        Ok(())
    }

    pub fn remove_recipe(&mut self, recipe_id: i64) -> Result<CartRecipe, CartError> {
        let position = self
            .recipes
            .iter()
            .position(|line| line.recipe.id == recipe_id)
            .ok_or(CartError::UnknownRecipe(recipe_id))?;
        Ok(self.recipes.remove(position))
    }

    /// Sum of item quantities
    pub fn total_items(&self) -> u64 {
        self.items.iter().map(|line| u64::from(line.quantity)).sum()
    }

    pub fn total_recipes(&self) -> usize {
        self.recipes.len()
    }

    /// Sum of ingredient counts over all recipes
    pub fn total_ingredients(&self) -> usize {
        self.recipes
            .iter()
            .map(|line| line.recipe.ingredients.len())
            .sum()
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recipes.clear();
        info!(session_id = %self.session, "Cart cleared");
    }

    /// Snapshot the cart for export
    pub fn export(&self) -> ExportData {
        ExportData {
            recipes: self.recipes.clone(),
            items: self.items.clone(),
            total_items: self.total_items(),
            total_recipes: self.total_recipes(),
        }
    }
}

fn validate_servings(servings_multiplier: f64) -> Result<(), CartError> {
    if servings_multiplier.is_finite() && servings_multiplier > 0.0 {
        Ok(())
    } else {
        Err(CartError::InvalidServings(servings_multiplier))
    }
}

/// Errors returned by cart operations
#[derive(Debug, Clone, PartialEq)]
pub enum CartError {
    /// No cart line for this inventory item
    UnknownItem(i64),
    /// No cart line for this recipe
    UnknownRecipe(i64),
    /// Quantities must be at least one
    InvalidQuantity(u32),
    /// Merging into this item's line would exceed `u32::MAX`
    QuantityOverflow(i64),
    /// Multipliers must be finite and positive
    InvalidServings(f64),
}

impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CartError::UnknownItem(id) => write!(f, "Item {id} is not in the cart"),
            CartError::UnknownRecipe(id) => write!(f, "Recipe {id} is not in the cart"),
            CartError::InvalidQuantity(q) => write!(f, "Invalid quantity: {q}"),
            CartError::QuantityOverflow(id) => write!(f, "Quantity of item {id} is too large"),
            CartError::InvalidServings(m) => write!(f, "Invalid servings multiplier: {m}"),
        }
    }
}

impl std::error::Error for CartError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn cart() -> Cart {
        Cart::new(SessionContext::from_existing("session-1"))
    }

    #[test]
    fn test_add_item_merges_lines() {
        let mut cart = cart();
        let beans = InventoryItem::new(4, "B4", "black beans", 6);

        cart.add_item(&beans, 2).unwrap();
        cart.add_item(&beans, 3).unwrap();

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.items()[0].available_quantity, 6);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = cart();
        let beans = InventoryItem::new(4, "B4", "black beans", 6);

        assert_eq!(cart.add_item(&beans, 0), Err(CartError::InvalidQuantity(0)));
        assert!(cart.is_empty());
    }

    #[test]
    fn test_servings_validation() {
        let mut cart = cart();

        assert!(cart.add_recipe(Recipe::new(1, "Soup"), 0.0).is_err());
        assert!(cart.add_recipe(Recipe::new(1, "Soup"), f64::NAN).is_err());
        assert!(cart.add_recipe(Recipe::new(1, "Soup"), 1.5).is_ok());
        assert!(cart.update_recipe_servings(1, -1.0).is_err());
    }

    #[test]
    fn test_unknown_lines() {
        let mut cart = cart();

        assert_eq!(cart.remove_item(9), Err(CartError::UnknownItem(9)));
        assert_eq!(cart.remove_recipe(9), Err(CartError::UnknownRecipe(9)));
        assert_eq!(
            cart.update_item_quantity(9, 1),
            Err(CartError::UnknownItem(9))
        );
    }

    #[test]
    fn test_item_merge_overflow_keeps_line() {
        let mut cart = cart();
        let rice = InventoryItem::new(1, "R1", "rice", 10);

        cart.add_item(&rice, u32::MAX).unwrap();
        assert_eq!(cart.add_item(&rice, 1), Err(CartError::QuantityOverflow(1)));
        assert_eq!(cart.items()[0].quantity, u32::MAX);
    }

    #[test]
    fn test_total_items_exceeds_u32() {
        let mut cart = cart();
        let rice = InventoryItem::new(1, "R1", "rice", 10);
        let milk = InventoryItem::new(2, "M1", "milk", 4);

        cart.add_item(&rice, u32::MAX).unwrap();
        cart.add_item(&milk, 1).unwrap();

        assert_eq!(cart.total_items(), u64::from(u32::MAX) + 1);
        assert_eq!(cart.export().total_items, u64::from(u32::MAX) + 1);
    }

    #[test]
    fn test_recipe_merge_must_stay_finite() {
        let mut cart = cart();

        cart.add_recipe(Recipe::new(1, "Soup"), f64::MAX).unwrap();
        assert!(matches!(
            cart.add_recipe(Recipe::new(1, "Soup"), f64::MAX),
            Err(CartError::InvalidServings(m)) if m.is_infinite()
        ));
        assert_eq!(cart.recipes()[0].servings_multiplier, f64::MAX);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(CartError::UnknownRecipe(3).to_string(), "Recipe 3 is not in the cart");
    }
}
