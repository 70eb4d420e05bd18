use anyhow::{anyhow, Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::env;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pantry_matcher::cart_export::export_to_external_cart;
use pantry_matcher::config::AppConfig;
use pantry_matcher::db::{self, PgStore};
use pantry_matcher::session::SessionContext;
use pantry_matcher::sources::load_and_rank;

/// Usage: `pantry-matcher [SESSION_ID]`
///
/// Ranks every recipe against the current inventory. When a session id is
/// given, that session's cart is also summarized and, if
/// `EXTERNAL_CART_URL` is set, exported.
#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = AppConfig::from_env()?;

    info!("Starting Pantry Matcher");

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;

    // Initialize database schema
    db::init_database_schema(&pool).await?;

    let store = PgStore::new(pool.clone());
    let ranked = load_and_rank(&store, &store, config.tolerance).await?;

    info!(
        matched = ranked.len(),
        tolerance = config.tolerance,
        "Recipes ranked against current inventory"
    );

    for recipe in &ranked {
        info!(
            recipe_id = recipe.recipe.id,
            title = %recipe.recipe.title,
            match_percent = recipe.match_percent(),
            available = recipe.available_count(),
            total = recipe.total_ingredients,
            "Matched recipe"
        );
    }

    if let Some(session_id) = env::args().nth(1) {
        export_session_cart(&pool, &config, &SessionContext::from_existing(&session_id)).await?;
    }

    Ok(())
}

async fn export_session_cart(
    pool: &PgPool,
    config: &AppConfig,
    session: &SessionContext,
) -> Result<()> {
    let cart = db::load_cart(pool, session).await?;

    info!(
        session_id = %session,
        items = cart.total_items(),
        recipes = cart.total_recipes(),
        ingredients = cart.total_ingredients(),
        "Loaded cart"
    );

    let Some(url) = config.external_cart_url.as_deref() else {
        warn!("EXTERNAL_CART_URL not set, skipping cart export");
        return Ok(());
    };

    if cart.is_empty() {
        info!(session_id = %session, "Cart is empty, nothing to export");
        return Ok(());
    }

    let client = reqwest::Client::new();
    let outcome = export_to_external_cart(&client, url, &cart.export()).await;
    if outcome.success {
        Ok(())
    } else {
        Err(anyhow!(
            "Cart export failed: {}",
            outcome.error.unwrap_or_default()
        ))
    }
}
