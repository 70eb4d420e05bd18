//! # Configuration Module
//!
//! Runtime settings read from the environment (and a `.env` file when one
//! is present).
//!
//! | Variable            | Required | Default |
//! |---------------------|----------|---------|
//! | `DATABASE_URL`      | yes      |         |
//! | `MATCH_TOLERANCE`   | no       | `0.7`   |
//! | `EXTERNAL_CART_URL` | no       |         |
//!
//! Log filtering is controlled separately through `RUST_LOG`.

use anyhow::{anyhow, Context, Result};
use std::env;
use tracing::info;

use crate::matcher::DEFAULT_TOLERANCE;

pub const DATABASE_URL_VAR: &str = "DATABASE_URL";
pub const MATCH_TOLERANCE_VAR: &str = "MATCH_TOLERANCE";
pub const EXTERNAL_CART_URL_VAR: &str = "EXTERNAL_CART_URL";

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Postgres connection string
    pub database_url: String,
    /// Minimum match score for ranked recipes
    pub tolerance: f64,
    /// Endpoint receiving cart exports, if exporting is enabled
    pub external_cart_url: Option<String>,
}

impl AppConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        // Load environment variables from .env file
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup(DATABASE_URL_VAR)
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| anyhow!("{DATABASE_URL_VAR} must be set"))?;

        let tolerance = match lookup(MATCH_TOLERANCE_VAR) {
            Some(raw) => raw
                .trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid {MATCH_TOLERANCE_VAR} value: {raw}"))?,
            None => {
                info!("{MATCH_TOLERANCE_VAR} not set, using default: {DEFAULT_TOLERANCE}");
                DEFAULT_TOLERANCE
            }
        };

        let external_cart_url =
            lookup(EXTERNAL_CART_URL_VAR).filter(|value| !value.trim().is_empty());

        Ok(Self {
            database_url,
            tolerance,
            external_cart_url,
        })
    }
}
