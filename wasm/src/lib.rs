//! WebAssembly module for the Contract Farming Marketplace
//!
//! Provides client-side computation for:
//! - Validating composed opportunity payloads before rendering
//! - Rating aggregates for listing cards
//! - Status checks for listing forms

use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {}

/// Validate a composed payload and return the read model as JSON
///
/// Aggregates in the result are recomputed from the nested reviews.
#[wasm_bindgen]
pub fn parse_opportunities_json(payload: &str) -> Result<String, JsValue> {
    read_model_json(payload).map_err(|e| JsValue::from_str(&e))
}

/// Rating summary (`{"average": .., "count": ..}`) for a JSON array of ratings
#[wasm_bindgen]
pub fn summarize_ratings(ratings_json: &str) -> Result<String, JsValue> {
    rating_summary_json(ratings_json).map_err(|e| JsValue::from_str(&e))
}

/// Whether `value` names a listing status
#[wasm_bindgen]
pub fn is_valid_status(value: &str) -> bool {
    value.parse::<OpportunityStatus>().is_ok()
}

fn read_model_json(payload: &str) -> Result<String, String> {
    let opportunities = shared::parse_opportunities_str(payload)
        .map_err(|e| format!("Invalid opportunity payload: {}", e))?;
    shared::ensure_newest_first(&opportunities).map_err(|e| e.to_string())?;
    serde_json::to_string(&opportunities).map_err(|e| e.to_string())
}

fn rating_summary_json(ratings_json: &str) -> Result<String, String> {
    let ratings: Vec<i32> = serde_json::from_str(ratings_json)
        .map_err(|e| format!("Invalid ratings JSON: {}", e))?;
    for &rating in &ratings {
        validate_rating(rating).map_err(str::to_string)?;
    }
    serde_json::to_string(&RatingSummary::from_ratings(&ratings)).map_err(|e| e.to_string())
}
