//! # External Cart Export
//!
//! Flattens a cart into the line-item format of the partner ordering system
//! and posts it over HTTP.
//!
//! Each recipe ingredient becomes one line with a synthetic item id
//! (`recipe_{recipe_id}_ingredient_{index}`) and a quantity equal to the
//! recipe's servings multiplier rounded up. Loose items keep their own code
//! and quantity.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::cart::ExportData;

/// Value of the `source` field sent with every export
pub const EXPORT_SOURCE: &str = "recipe_matcher";

/// Recipe provenance attached to ingredient lines
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCartMetadata {
    pub recipe_id: i64,
    pub recipe_title: String,
    pub servings_multiplier: f64,
}

/// One line of the external cart
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCartItem {
    pub item_id: String,
    pub item_name: String,
    pub quantity: u32,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub metadata: Option<ExternalCartMetadata>,
}

/// Request body posted to the external cart
#[derive(Debug, Clone, Serialize)]
pub struct ExternalCartPayload {
    pub items: Vec<ExternalCartItem>,
    pub source: &'static str,
    pub timestamp: DateTime<Utc>,
}

/// Result of an export attempt
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ExportOutcome {
    fn ok() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Convert a cart snapshot into external cart lines
pub fn convert_to_external_cart_format(export: &ExportData) -> Vec<ExternalCartItem> {
    let mut lines = Vec::new();

    for cart_recipe in &export.recipes {
        let quantity = cart_recipe.servings_multiplier.ceil().max(0.0) as u32;

        for (index, ingredient) in cart_recipe.recipe.ingredients.iter().enumerate() {
            lines.push(ExternalCartItem {
                item_id: format!("recipe_{}_ingredient_{}", cart_recipe.recipe.id, index),
                item_name: ingredient.clone(),
                quantity,
                metadata: Some(ExternalCartMetadata {
                    recipe_id: cart_recipe.recipe.id,
                    recipe_title: cart_recipe.recipe.title.clone(),
                    servings_multiplier: cart_recipe.servings_multiplier,
                }),
            });
        }
    }

    for item in &export.items {
        lines.push(ExternalCartItem {
            item_id: item.item_id.clone(),
            item_name: item.item_name.clone(),
            quantity: item.quantity,
            metadata: None,
        });
    }

    lines
}

/// Build the request body for an export
pub fn build_payload(export: &ExportData) -> ExternalCartPayload {
    ExternalCartPayload {
        items: convert_to_external_cart_format(export),
        source: EXPORT_SOURCE,
        timestamp: Utc::now(),
    }
}

/// Post a cart snapshot to the external cart endpoint
///
/// Failures are reported in the returned [`ExportOutcome`], never as an
/// error, so callers can show the message directly.
pub async fn export_to_external_cart(
    client: &Client,
    url: &str,
    export: &ExportData,
) -> ExportOutcome {
    let payload = build_payload(export);
    let line_count = payload.items.len();

    let response = match client.post(url).json(&payload).send().await {
        Ok(response) => response,
        Err(e) => {
            error!(url, error = %e, "Failed to reach external cart");
            return ExportOutcome::failed(e.to_string());
        }
    };

    if !response.status().is_success() {
        error!(url, status = %response.status(), "External cart rejected export");
        return ExportOutcome::failed("Failed to export to external cart");
    }

    info!(url, lines = line_count, "Cart exported to external cart");
    ExportOutcome::ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::{CartItem, CartRecipe};
    use crate::recipe_model::Recipe;

    fn export() -> ExportData {
        ExportData {
            recipes: vec![CartRecipe::new(
                Recipe::new(12, "Chili").with_ingredients(["1 lb beans", "2 cups tomatoes"]),
                1.5,
            )],
            items: vec![CartItem {
                inventory_item_id: 3,
                item_id: "MILK-1".to_string(),
                item_name: "milk".to_string(),
                quantity: 2,
                available_quantity: 8,
            }],
            total_items: 2,
            total_recipes: 1,
        }
    }

    #[test]
    fn test_recipe_lines_use_synthetic_ids() {
        let lines = convert_to_external_cart_format(&export());

        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].item_id, "recipe_12_ingredient_0");
        assert_eq!(lines[1].item_id, "recipe_12_ingredient_1");
        assert_eq!(lines[1].item_name, "2 cups tomatoes");
    }

    #[test]
    fn test_recipe_quantity_rounds_multiplier_up() {
        let lines = convert_to_external_cart_format(&export());

        assert_eq!(lines[0].quantity, 2);
        let metadata = lines[0].metadata.as_ref().unwrap();
        assert_eq!(metadata.recipe_title, "Chili");
        assert_eq!(metadata.servings_multiplier, 1.5);
    }

    #[test]
    fn test_loose_items_follow_recipes() {
        let lines = convert_to_external_cart_format(&export());

        assert_eq!(lines[2].item_id, "MILK-1");
        assert_eq!(lines[2].quantity, 2);
        assert!(lines[2].metadata.is_none());
    }

    #[test]
    fn test_payload_shape() {
        let value = serde_json::to_value(build_payload(&export())).unwrap();

        assert_eq!(value["source"], "recipe_matcher");
        assert!(value["timestamp"].is_string());
        assert_eq!(value["items"].as_array().unwrap().len(), 3);
        assert!(value["items"][2].get("metadata").is_none());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_reports_failure() {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(2))
            .build()
            .unwrap();

        let outcome = export_to_external_cart(&client, "http://127.0.0.1:9/cart", &export()).await;

        assert!(!outcome.success);
        assert!(outcome.error.is_some());
    }
}
