//! Domain models for the contract-farming read model

mod document;
mod opportunity;
mod review;

pub use document::*;
pub use opportunity::*;
pub use review::*;
