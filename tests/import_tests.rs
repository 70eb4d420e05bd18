use pantry_matcher::import::{
    parse_inventory_import, parse_recipe_import, ImportError, ImportSummary,
};
use pantry_matcher::matcher::match_and_rank;
use pantry_matcher::recipe_model::{InventoryItem, Recipe};

const RECIPES_JSON: &str = r#"[
    {
        "title": "Salsa",
        "ingredients": ["2 cups diced tomatoes", "1 onion, chopped", "3 tbsp olive oil"],
        "directions": ["Chop", "Mix"],
        "image_url": "https://img.example/salsa.png"
    },
    {
        "title": "Bean bowl",
        "ingredients": ["1 can black beans", "1 cup rice"],
        "source": "Pantry Staples"
    }
]"#;

const INVENTORY_JSON: &str = r#"[
    {"item_id": "T-1", "item_name": "Tomatoes", "quantity": 12},
    {"item_id": "O-1", "item_name": "Yellow Onions", "quantity": 3},
    {"item_id": "R-1", "item_name": "Rice"}
]"#;

#[test]
fn test_imported_documents_feed_the_matcher() {
    let recipes: Vec<Recipe> = parse_recipe_import(RECIPES_JSON)
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, new)| {
            Recipe::new(i as i64 + 1, &new.title)
                .with_ingredients(new.ingredients)
                .with_directions(new.directions)
                .with_source(&new.source)
        })
        .collect();

    let inventory: Vec<InventoryItem> = parse_inventory_import(INVENTORY_JSON)
        .unwrap()
        .into_iter()
        .enumerate()
        .map(|(i, item)| {
            InventoryItem::new(i as i64 + 1, &item.item_id, &item.item_name, item.quantity)
        })
        .collect();

    assert_eq!(recipes[1].source.as_deref(), Some("Pantry Staples"));
    assert_eq!(recipes[0].source.as_deref(), Some("Imported"));
    assert!(!inventory[2].is_in_stock());

    let ranked = match_and_rank(&recipes, &inventory, 0.5);
    let ids: Vec<i64> = ranked.iter().map(|r| r.recipe.id).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(ranked[1].missing_ingredients, vec!["1 can black beans"]);
}

#[test]
fn test_rejections_name_the_element() {
    let err = parse_inventory_import(r#"[{"item_id": "A"}]"#).unwrap_err();

    match err {
        ImportError::InvalidItem { index, ref reason } => {
            assert_eq!(index, 0);
            assert!(reason.contains("item_name"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_import_summary_serialization() {
    let summary = ImportSummary::new(2);
    let value = serde_json::to_value(summary).unwrap();

    assert_eq!(value["success"], true);
    assert_eq!(value["count"], 2);
}
