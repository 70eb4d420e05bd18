//! # Text Processing Module
//!
//! This module canonicalizes free-text ingredient lines and inventory names
//! so they can be compared word by word.
//!
//! ## Features
//!
//! - Lower-casing and removal of digits, punctuation and symbols
//! - Removal of measurement units (cups, tbsp, grams, ...)
//! - Removal of function words and preparation words (fresh, diced, ...)
//! - Whitespace collapsing

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use tracing::trace;

/// Measurement units dropped during normalization
pub const UNIT_WORDS: &[&str] = &[
    "cup", "cups", "tablespoon", "tablespoons", "teaspoon", "teaspoons", "tbsp", "tsp", "oz",
    "lb", "pound", "pounds", "gram", "grams", "g", "ml", "liter",
];

/// Articles, prepositions and conjunctions dropped during normalization
pub const FUNCTION_WORDS: &[&str] = &["of", "the", "a", "an", "to", "and", "or"];

/// Preparation descriptors dropped during normalization
pub const PREPARATION_WORDS: &[&str] = &["fresh", "dried", "chopped", "minced", "diced", "sliced"];

lazy_static! {
    // Anything that is not a lowercase ASCII letter or whitespace
    static ref NON_LETTER_REGEX: Regex =
        Regex::new(r"[^a-z\s]").expect("Non-letter pattern should be valid");

    static ref STOP_WORDS: HashSet<&'static str> = UNIT_WORDS
        .iter()
        .chain(FUNCTION_WORDS)
        .chain(PREPARATION_WORDS)
        .copied()
        .collect();
}

/// Check if a word is removed by [`normalize`]
pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(word)
}

/// Normalize a free-text ingredient line into its content words
///
/// Lower-cases the text, strips every character that is not `a-z` or
/// whitespace, removes units, function words and preparation words, and
/// joins what remains with single spaces.
///
/// # Examples
///
/// ```rust
/// use pantry_matcher::text_processing::normalize;
///
/// assert_eq!(normalize("2 Cups Fresh, Diced Tomatoes!"), "tomatoes");
/// assert_eq!(normalize("3 tbsp olive oil"), "olive oil");
/// assert_eq!(normalize("1 cup of the"), "");
/// ```
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let letters_only = NON_LETTER_REGEX.replace_all(&lowered, "");

    let normalized = letters_only
        .split_whitespace()
        .filter(|word| !is_stop_word(word))
        .collect::<Vec<&str>>()
        .join(" ");

    trace!(input = %text, output = %normalized, "Normalized ingredient text");
    normalized
}

/// Split a line into its normalized content words
///
/// Returns an empty vector when every token is a stop word.
///
/// # Examples
///
/// ```rust
/// use pantry_matcher::text_processing::content_words;
///
/// assert_eq!(content_words("1 can black beans"), vec!["can", "black", "beans"]);
/// assert!(content_words("2 cups").is_empty());
/// ```
pub fn content_words(text: &str) -> Vec<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
