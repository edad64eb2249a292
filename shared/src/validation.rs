//! Validation utilities for the contract-farming read model
//!
//! Payloads coming back from the remote store are checked against the
//! declared shape before they reach callers. Mismatches are reported as
//! [`ShapeError`].

use rust_decimal::Decimal;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{MAX_RATING, MIN_RATING};

/// A remote payload that does not match the declared read-model shape
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShapeError {
    #[error("payload does not decode into the read model: {0}")]
    Decode(String),

    #[error("opportunity {opportunity_id} has unknown status '{value}'")]
    UnknownStatus { opportunity_id: Uuid, value: String },

    #[error("{entity} {id} references opportunity {found}, expected {expected}")]
    ForeignReference {
        entity: &'static str,
        id: Uuid,
        expected: Uuid,
        found: Uuid,
    },

    #[error("review {review_id} has rating {rating} outside 1..=5")]
    RatingOutOfRange { review_id: Uuid, rating: i32 },

    #[error("review {review_id} carries profile {profile_id}, expected {reviewer_id}")]
    ProfileMismatch {
        review_id: Uuid,
        reviewer_id: Uuid,
        profile_id: Uuid,
    },

    #[error("document {document_id} has an empty url")]
    EmptyDocumentUrl { document_id: Uuid },

    #[error("opportunity {opportunity_id}: {reason}")]
    InvalidAmount {
        opportunity_id: Uuid,
        reason: &'static str,
    },

    #[error("records are not ordered newest first at position {index}")]
    Ordering { index: usize },
}

// ============================================================================
// Commercial Validations
// ============================================================================

/// Validate price and quantity bounds of a listing
pub fn validate_commercial_terms(
    price_per_unit: Option<Decimal>,
    minimum_quantity: Option<Decimal>,
    maximum_quantity: Option<Decimal>,
) -> Result<(), &'static str> {
    if price_per_unit.is_some_and(|p| p < Decimal::ZERO) {
        return Err("Price per unit cannot be negative");
    }
    if minimum_quantity.is_some_and(|q| q < Decimal::ZERO)
        || maximum_quantity.is_some_and(|q| q < Decimal::ZERO)
    {
        return Err("Quantities cannot be negative");
    }
    if let (Some(min), Some(max)) = (minimum_quantity, maximum_quantity) {
        if min > max {
            return Err("Minimum quantity cannot exceed maximum quantity");
        }
    }
    Ok(())
}

/// Validate a review rating is within the accepted scale
pub fn validate_rating(rating: i32) -> Result<(), &'static str> {
    if !(MIN_RATING..=MAX_RATING).contains(&rating) {
        return Err("Rating must be between 1 and 5");
    }
    Ok(())
}

// ============================================================================
// Contact Validations
// ============================================================================

/// Validate a contact phone number
/// Accepts digits with optional leading +, spaces, dashes and parentheses;
/// 6 to 15 digits in total.
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, ' ' | '-' | '(' | ')'))
    {
        return Err("Phone number contains invalid characters");
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(6..=15).contains(&digits) {
        return Err("Phone number must contain 6 to 15 digits");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_commercial_terms() {
        assert!(validate_commercial_terms(None, None, None).is_ok());
        let terms = (Some(dec("12.50")), Some(dec("100")), Some(dec("500")));
        assert!(validate_commercial_terms(terms.0, terms.1, terms.2).is_ok());
        assert!(validate_commercial_terms(Some(dec("-1")), None, None).is_err());
        assert!(validate_commercial_terms(None, Some(dec("600")), Some(dec("500"))).is_err());
        assert!(validate_commercial_terms(None, Some(dec("-5")), None).is_err());
    }

    #[test]
    fn test_rating_bounds() {
        assert!(validate_rating(1).is_ok());
        assert!(validate_rating(5).is_ok());
        assert!(validate_rating(0).is_err());
        assert!(validate_rating(6).is_err());
    }

    #[test]
    fn test_phone_formats() {
        assert!(validate_phone("0812345678").is_ok());
        assert!(validate_phone("+66 81-234-5678").is_ok());
        assert!(validate_phone("(02) 123 4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("call me").is_err());
    }
}
