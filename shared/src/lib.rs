//! Shared types and models for the Contract Farming Marketplace
//!
//! This crate holds the canonical relational shape of the contract-farming
//! read model. It is shared between the backend, the browser (via WASM),
//! and any other consumer that needs to interpret query results.

pub mod models;
pub mod records;
pub mod types;
pub mod validation;

pub use models::*;
pub use records::*;
pub use types::*;
pub use validation::*;
