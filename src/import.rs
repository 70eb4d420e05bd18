//! # Import Payloads
//!
//! Parses the JSON documents posted to the recipe import and inventory sync
//! endpoints into rows ready for the data-access layer.
//!
//! Both documents must be JSON arrays. Optional fields get defaults:
//! recipes without ingredients or directions get empty lists, recipes
//! without a source are labelled "Imported", and inventory items without a
//! quantity get zero.
//!
//! ## Usage
//!
//! ```rust
//! use pantry_matcher::import::parse_recipe_import;
//!
//! let json = r#"[{"title": "Toast", "ingredients": ["2 slices bread"]}]"#;
//! let recipes = parse_recipe_import(json)?;
//! assert_eq!(recipes[0].source, "Imported");
//! # Ok::<(), pantry_matcher::import::ImportError>(())
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Source label for recipes that do not name one
pub const DEFAULT_RECIPE_SOURCE: &str = "Imported";

/// One recipe of an import request
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecipeImport {
    pub title: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
    #[serde(default)]
    pub directions: Vec<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// A recipe row ready for insertion
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewRecipe {
    pub title: String,
    pub ingredients: Vec<String>,
    pub directions: Vec<String>,
    pub link: Option<String>,
    pub source: String,
    pub image_url: Option<String>,
}

/// One item of an inventory sync request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryImport {
    pub item_id: String,
    pub item_name: String,
    #[serde(default)]
    pub quantity: i32,
}

/// Result of a successful import or sync
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub success: bool,
    pub count: usize,
}

impl ImportSummary {
    pub fn new(count: usize) -> Self {
        Self {
            success: true,
            count,
        }
    }
}

impl RecipeImport {
    /// Apply defaults and produce an insertable row
    pub fn into_new_recipe(self) -> NewRecipe {
        NewRecipe {
            title: self.title,
            ingredients: self.ingredients,
            directions: self.directions,
            link: self.link,
            source: self
                .source
                .unwrap_or_else(|| DEFAULT_RECIPE_SOURCE.to_string()),
            image_url: self.image_url,
        }
    }
}

/// Parse a recipe import document
pub fn parse_recipe_import(json: &str) -> Result<Vec<NewRecipe>, ImportError> {
    let elements = parse_array(json, "recipes")?;
    debug!(count = elements.len(), "Parsing recipe import");

    let mut recipes = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        let recipe: RecipeImport = serde_json::from_value(element).map_err(|e| {
            warn!(index, error = %e, "Rejected recipe in import");
            ImportError::InvalidItem {
                index,
                reason: e.to_string(),
            }
        })?;

        if recipe.title.trim().is_empty() {
            return Err(ImportError::InvalidItem {
                index,
                reason: "title is empty".to_string(),
            });
        }

        recipes.push(recipe.into_new_recipe());
    }

    info!(count = recipes.len(), "Parsed recipe import");
    Ok(recipes)
}

/// Parse an inventory sync document
pub fn parse_inventory_import(json: &str) -> Result<Vec<InventoryImport>, ImportError> {
    let elements = parse_array(json, "inventory items")?;
    debug!(count = elements.len(), "Parsing inventory import");

    let mut items = Vec::with_capacity(elements.len());
    for (index, element) in elements.into_iter().enumerate() {
        let item: InventoryImport = serde_json::from_value(element).map_err(|e| {
            warn!(index, error = %e, "Rejected inventory item in import");
            ImportError::InvalidItem {
                index,
                reason: e.to_string(),
            }
        })?;

        if item.quantity < 0 {
            return Err(ImportError::InvalidItem {
                index,
                reason: format!("negative quantity {}", item.quantity),
            });
        }

        items.push(item);
    }

    info!(count = items.len(), "Parsed inventory import");
    Ok(items)
}

fn parse_array(json: &str, expected: &'static str) -> Result<Vec<Value>, ImportError> {
    match serde_json::from_str::<Value>(json)? {
        Value::Array(elements) => Ok(elements),
        other => {
            warn!(received = json_type_name(&other), "Import payload is not an array");
            Err(ImportError::ExpectedArray(expected))
        }
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Errors that can occur while parsing an import document
#[derive(Debug)]
pub enum ImportError {
    /// The document is not valid JSON
    Json(serde_json::Error),
    /// The document is valid JSON but not an array
    ExpectedArray(&'static str),
    /// An element of the array could not be used
    InvalidItem { index: usize, reason: String },
}

impl std::fmt::Display for ImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImportError::Json(e) => write!(f, "Invalid JSON: {e}"),
            ImportError::ExpectedArray(what) => write!(f, "Expected an array of {what}"),
            ImportError::InvalidItem { index, reason } => {
                write!(f, "Invalid element at index {index}: {reason}")
            }
        }
    }
}

impl std::error::Error for ImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ImportError::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ImportError {
    fn from(err: serde_json::Error) -> Self {
        ImportError::Json(err)
    }
}
