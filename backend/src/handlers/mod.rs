//! HTTP handlers

pub mod contract_farming;
pub mod health;

pub use contract_farming::*;
pub use health::*;
