//! # Pantry Matcher
//!
//! Back-end of a food bank recipe matcher: scores recipes against the food
//! bank's current inventory, lets shoppers swipe through the best matches
//! and collects their picks in a cart that can be exported to an external
//! ordering system.

pub mod cart;
pub mod cart_export;
pub mod config;
pub mod db;
pub mod import;
pub mod matcher;
pub mod recipe_model;
pub mod session;
pub mod sources;
pub mod swipe;
pub mod text_processing;
