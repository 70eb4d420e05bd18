//! # Database Module
//!
//! Postgres storage for recipes, inventory, swipes and carts. Every
//! function takes the pool explicitly and returns `anyhow::Result` with a
//! context message describing the failed step.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgRow};
use sqlx::Row;
use tracing::{debug, info};

use crate::cart::{Cart, CartItem, CartRecipe};
use crate::import::{InventoryImport, NewRecipe};
use crate::recipe_model::{InventoryItem, Recipe};
use crate::session::SessionContext;
use crate::sources::{InventorySource, RecipeSource};
use crate::swipe::RecipeSwipe;

const RECIPE_COLUMNS: &str =
    "id, title, ingredients, directions, link, source, image_url, created_at";

const INVENTORY_COLUMNS: &str = "id, item_id, item_name, quantity, last_synced";

/// Initialize the database schema
pub async fn init_database_schema(pool: &PgPool) -> Result<()> {
    info!("Initializing database schema...");

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipes (
            id BIGSERIAL PRIMARY KEY,
            title TEXT NOT NULL,
            ingredients TEXT[] NOT NULL DEFAULT '{}',
            directions TEXT[] NOT NULL DEFAULT '{}',
            link TEXT,
            source TEXT,
            image_url TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS inventory_items (
            id BIGSERIAL PRIMARY KEY,
            item_id TEXT NOT NULL,
            item_name TEXT NOT NULL,
            quantity INTEGER NOT NULL DEFAULT 0 CHECK (quantity >= 0),
            last_synced TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create inventory_items table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS recipe_swipes (
            id BIGSERIAL PRIMARY KEY,
            recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            session_id TEXT NOT NULL,
            action TEXT NOT NULL CHECK (action IN ('like', 'dislike')),
            match_score DOUBLE PRECISION,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create recipe_swipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cart_recipes (
            id BIGSERIAL PRIMARY KEY,
            session_id TEXT NOT NULL,
            recipe_id BIGINT NOT NULL REFERENCES recipes(id) ON DELETE CASCADE,
            servings_multiplier DOUBLE PRECISION NOT NULL DEFAULT 1.0,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create cart_recipes table")?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS cart_items (
            id BIGSERIAL PRIMARY KEY,
            session_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity > 0),
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )",
    )
    .execute(pool)
    .await
    .context("Failed to create cart_items table")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cart_recipes_session ON cart_recipes(session_id)")
        .execute(pool)
        .await
        .context("Failed to create cart_recipes index")?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_cart_items_session ON cart_items(session_id)")
        .execute(pool)
        .await
        .context("Failed to create cart_items index")?;

    info!("Database schema initialized successfully");
    Ok(())
}

fn recipe_from_row(row: &PgRow) -> Result<Recipe, sqlx::Error> {
    Ok(Recipe {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        ingredients: row
            .try_get::<Option<Vec<String>>, _>("ingredients")?
            .unwrap_or_default(),
        directions: row
            .try_get::<Option<Vec<String>>, _>("directions")?
            .unwrap_or_default(),
        link: row.try_get("link")?,
        source: row.try_get("source")?,
        image_url: row.try_get("image_url")?,
        created_at: row.try_get::<Option<DateTime<Utc>>, _>("created_at")?,
    })
}

fn inventory_from_row(row: &PgRow) -> Result<InventoryItem, sqlx::Error> {
    Ok(InventoryItem {
        id: row.try_get("id")?,
        item_id: row.try_get("item_id")?,
        item_name: row.try_get("item_name")?,
        quantity: row.try_get::<Option<i32>, _>("quantity")?.unwrap_or(0),
        last_synced: row.try_get::<Option<DateTime<Utc>>, _>("last_synced")?,
    })
}

/// Insert imported recipes in a single transaction and return the stored rows
pub async fn import_recipes(pool: &PgPool, recipes: &[NewRecipe]) -> Result<Vec<Recipe>> {
    info!(count = recipes.len(), "Importing recipes");

    let mut tx = pool.begin().await.context("Failed to start transaction")?;
    let mut stored = Vec::with_capacity(recipes.len());

    for recipe in recipes {
        let row = sqlx::query(&format!(
            "INSERT INTO recipes (title, ingredients, directions, link, source, image_url)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {RECIPE_COLUMNS}"
        ))
        .bind(&recipe.title)
        .bind(&recipe.ingredients)
        .bind(&recipe.directions)
        .bind(&recipe.link)
        .bind(&recipe.source)
        .bind(&recipe.image_url)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert recipe '{}'", recipe.title))?;

        stored.push(recipe_from_row(&row).context("Failed to decode inserted recipe")?);
    }

    tx.commit().await.context("Failed to commit recipe import")?;

    info!(count = stored.len(), "Recipes imported successfully");
    Ok(stored)
}

/// List all recipes ordered by id
pub async fn list_recipes(pool: &PgPool) -> Result<Vec<Recipe>> {
    let rows = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes ORDER BY id"))
        .fetch_all(pool)
        .await
        .context("Failed to list recipes")?;

    let recipes = rows
        .iter()
        .map(recipe_from_row)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode recipe")?;

    debug!(count = recipes.len(), "Listed recipes");
    Ok(recipes)
}

/// Read a recipe by id
pub async fn read_recipe(pool: &PgPool, recipe_id: i64) -> Result<Option<Recipe>> {
    let row = sqlx::query(&format!("SELECT {RECIPE_COLUMNS} FROM recipes WHERE id = $1"))
        .bind(recipe_id)
        .fetch_optional(pool)
        .await
        .context("Failed to read recipe")?;

    match row {
        Some(row) => Ok(Some(recipe_from_row(&row).context("Failed to decode recipe")?)),
        None => {
            debug!(recipe_id, "No recipe found");
            Ok(None)
        }
    }
}

/// Replace the whole inventory with a new snapshot
///
/// Clearing and inserting happen in one transaction, so readers never see
/// a half-synced inventory.
pub async fn sync_inventory(
    pool: &PgPool,
    items: &[InventoryImport],
) -> Result<Vec<InventoryItem>> {
    info!(count = items.len(), "Syncing inventory");

    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let cleared = sqlx::query("DELETE FROM inventory_items")
        .execute(&mut *tx)
        .await
        .context("Failed to clear inventory")?
        .rows_affected();
    debug!(cleared, "Existing inventory cleared");

    let mut stored = Vec::with_capacity(items.len());
    for item in items {
        let row = sqlx::query(&format!(
            "INSERT INTO inventory_items (item_id, item_name, quantity)
             VALUES ($1, $2, $3)
             RETURNING {INVENTORY_COLUMNS}"
        ))
        .bind(&item.item_id)
        .bind(&item.item_name)
        .bind(item.quantity)
        .fetch_one(&mut *tx)
        .await
        .with_context(|| format!("Failed to insert inventory item '{}'", item.item_name))?;

        stored.push(inventory_from_row(&row).context("Failed to decode inserted inventory item")?);
    }

    tx.commit().await.context("Failed to commit inventory sync")?;

    info!(count = stored.len(), "Inventory synced successfully");
    Ok(stored)
}

/// List the whole inventory ordered by name
pub async fn list_inventory(pool: &PgPool) -> Result<Vec<InventoryItem>> {
    query_inventory(pool, "").await
}

/// List items with at least one unit on hand, ordered by name
pub async fn list_in_stock_inventory(pool: &PgPool) -> Result<Vec<InventoryItem>> {
    query_inventory(pool, "WHERE quantity > 0").await
}

async fn query_inventory(pool: &PgPool, filter: &str) -> Result<Vec<InventoryItem>> {
    let rows = sqlx::query(&format!(
        "SELECT {INVENTORY_COLUMNS} FROM inventory_items {filter} ORDER BY item_name, id"
    ))
    .fetch_all(pool)
    .await
    .context("Failed to list inventory")?;

    let items = rows
        .iter()
        .map(inventory_from_row)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode inventory item")?;

    debug!(count = items.len(), "Listed inventory");
    Ok(items)
}

/// Store a swipe and return its id
pub async fn record_swipe(pool: &PgPool, swipe: &RecipeSwipe) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO recipe_swipes (recipe_id, session_id, action, match_score)
         VALUES ($1, $2, $3, $4)
         RETURNING id",
    )
    .bind(swipe.recipe_id)
    .bind(&swipe.session_id)
    .bind(swipe.action.as_str())
    .bind(swipe.match_score)
    .fetch_one(pool)
    .await
    .context("Failed to record swipe")?;

    debug!(swipe_id = id, recipe_id = swipe.recipe_id, "Swipe recorded");
    Ok(id)
}

/// Count the swipes of a session
pub async fn count_swipes(pool: &PgPool, session: &SessionContext) -> Result<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM recipe_swipes WHERE session_id = $1")
        .bind(session.id())
        .fetch_one(pool)
        .await
        .context("Failed to count swipes")
}

/// Put a recipe in a session's cart and return the cart line id
pub async fn save_cart_recipe(
    pool: &PgPool,
    session: &SessionContext,
    recipe_id: i64,
    servings_multiplier: f64,
) -> Result<i64> {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO cart_recipes (session_id, recipe_id, servings_multiplier)
         VALUES ($1, $2, $3)
         RETURNING id",
    )
    .bind(session.id())
    .bind(recipe_id)
    .bind(servings_multiplier)
    .fetch_one(pool)
    .await
    .context("Failed to save cart recipe")?;

    info!(session_id = %session, recipe_id, cart_recipe_id = id, "Cart recipe saved");
    Ok(id)
}

/// Put an inventory item in a session's cart and return the cart line id
///
/// The line stores the item's external code rather than its row id, so it
/// survives [`sync_inventory`] as long as the code is still stocked.
pub async fn save_cart_item(
    pool: &PgPool,
    session: &SessionContext,
    inventory_item_id: i64,
    quantity: u32,
) -> Result<i64> {
    let quantity = i32::try_from(quantity).context("Cart quantity out of range")?;

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO cart_items (session_id, item_id, quantity)
         SELECT $1, item_id, $3 FROM inventory_items WHERE id = $2
         RETURNING id",
    )
    .bind(session.id())
    .bind(inventory_item_id)
    .bind(quantity)
    .fetch_optional(pool)
    .await
    .context("Failed to save cart item")?
    .ok_or_else(|| anyhow!("Inventory item {inventory_item_id} not found"))?;

    info!(session_id = %session, inventory_item_id, cart_item_id = id, "Cart item saved");
    Ok(id)
}

/// List the recipes in a session's cart in the order they were added
pub async fn list_cart_recipes(pool: &PgPool, session: &SessionContext) -> Result<Vec<CartRecipe>> {
    let rows = sqlx::query(
        "SELECT r.id, r.title, r.ingredients, r.directions, r.link, r.source, r.image_url,
                r.created_at, c.servings_multiplier
         FROM cart_recipes c
         JOIN recipes r ON r.id = c.recipe_id
         WHERE c.session_id = $1
         ORDER BY c.id",
    )
    .bind(session.id())
    .fetch_all(pool)
    .await
    .context("Failed to list cart recipes")?;

    rows.iter()
        .map(|row| -> Result<CartRecipe, sqlx::Error> {
            Ok(CartRecipe {
                recipe: recipe_from_row(row)?,
                servings_multiplier: row.try_get("servings_multiplier")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode cart recipe")
}

/// List the loose items in a session's cart in the order they were added
///
/// Lines are resolved against the current inventory by item code. Lines
/// whose code is no longer stocked are skipped but kept in storage.
pub async fn list_cart_items(pool: &PgPool, session: &SessionContext) -> Result<Vec<CartItem>> {
    let rows = sqlx::query(
        "SELECT i.id AS inventory_item_id, c.item_id, i.item_name,
                c.quantity, i.quantity AS available_quantity
         FROM cart_items c
         JOIN LATERAL (
             SELECT id, item_name, quantity FROM inventory_items
             WHERE item_id = c.item_id
             ORDER BY id
             LIMIT 1
         ) i ON TRUE
         WHERE c.session_id = $1
         ORDER BY c.id",
    )
    .bind(session.id())
    .fetch_all(pool)
    .await
    .context("Failed to list cart items")?;

    rows.iter()
        .map(|row| -> Result<CartItem, sqlx::Error> {
            let quantity: i32 = row.try_get("quantity")?;
            Ok(CartItem {
                inventory_item_id: row.try_get("inventory_item_id")?,
                item_id: row.try_get("item_id")?,
                item_name: row.try_get("item_name")?,
                quantity: quantity.max(0) as u32,
                available_quantity: row.try_get("available_quantity")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to decode cart item")
}

/// Load a session's whole cart
pub async fn load_cart(pool: &PgPool, session: &SessionContext) -> Result<Cart> {
    let items = list_cart_items(pool, session).await?;
    let recipes = list_cart_recipes(pool, session).await?;

    debug!(
        session_id = %session,
        items = items.len(),
        recipes = recipes.len(),
        "Cart loaded"
    );
    Ok(Cart::from_parts(session.clone(), items, recipes))
}

/// Remove every cart line of a session and return how many were deleted
pub async fn clear_cart(pool: &PgPool, session: &SessionContext) -> Result<u64> {
    let mut tx = pool.begin().await.context("Failed to start transaction")?;

    let items = sqlx::query("DELETE FROM cart_items WHERE session_id = $1")
        .bind(session.id())
        .execute(&mut *tx)
        .await
        .context("Failed to clear cart items")?
        .rows_affected();

    let recipes = sqlx::query("DELETE FROM cart_recipes WHERE session_id = $1")
        .bind(session.id())
        .execute(&mut *tx)
        .await
        .context("Failed to clear cart recipes")?
        .rows_affected();

    tx.commit().await.context("Failed to commit cart clear")?;

    info!(session_id = %session, items, recipes, "Cart cleared");
    Ok(items + recipes)
}

/// Postgres-backed recipe and inventory accessor
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl RecipeSource for PgStore {
    async fn recipes(&self) -> Result<Vec<Recipe>> {
        list_recipes(&self.pool).await
    }
}

impl InventorySource for PgStore {
    async fn inventory(&self) -> Result<Vec<InventoryItem>> {
        list_inventory(&self.pool).await
    }
}
