//! Read model property tests
//!
//! Decodes generated nested payloads and checks the aggregate and ordering
//! guarantees of the canonical read model.

use proptest::prelude::*;
use serde_json::{json, Value};
use shared::{ensure_newest_first, parse_opportunities, RatingSummary, ShapeError};
use uuid::Uuid;

fn review(opportunity_id: Uuid, rating: i32) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "opportunity_id": opportunity_id,
        "reviewer_id": Uuid::new_v4(),
        "rating": rating,
        "comment": null,
        "created_at": "2024-04-01T00:00:00Z"
    })
}

fn row(day: u32, ratings: &[i32], status: &str) -> Value {
    let id = Uuid::new_v4();
    json!({
        "id": id,
        "title": "Organic rice contract",
        "description": "Mill buys jasmine paddy",
        "company_name": "Surin Rice Mill",
        "location": "Surin",
        "crop_type": "rice",
        "contract_duration": "1 year",
        "requirements": "Organic certified",
        "benefits": "Premium over market",
        "contact_person": "Wichai",
        "contact_email": "wichai@example.com",
        "contact_phone": "044-511-000",
        "price_per_unit": null,
        "minimum_quantity": null,
        "maximum_quantity": null,
        "unit": null,
        "status": status,
        "created_by": Uuid::new_v4(),
        "created_at": format!("2024-01-{:02}T00:00:00Z", day),
        "updated_at": "2024-01-01T00:00:00Z",
        "expires_at": null,
        "documents": [],
        "reviews": ratings.iter().map(|&r| review(id, r)).collect::<Vec<_>>()
    })
}

#[test]
fn test_four_and_five_average_four_and_a_half() {
    let summary = RatingSummary::from_ratings(&[4, 5]);
    assert_eq!(summary.count, 2);
    assert_eq!(summary.average, Some(4.5));
}

#[test]
fn test_misordered_payload_detected() {
    let payload = json!([row(1, &[], "active"), row(2, &[], "active")]);
    let records = parse_opportunities(payload).unwrap();
    assert_eq!(
        ensure_newest_first(&records),
        Err(ShapeError::Ordering { index: 1 })
    );
}

#[test]
fn test_one_bad_record_fails_whole_payload() {
    let payload = json!([row(3, &[5], "active"), row(2, &[], "paused")]);
    assert!(matches!(
        parse_opportunities(payload),
        Err(ShapeError::UnknownStatus { .. })
    ));
}

proptest! {
    /// The mean lies within the rating scale and the count matches the input
    #[test]
    fn prop_summary_bounds(ratings in prop::collection::vec(1i32..=5, 0..50)) {
        let summary = RatingSummary::from_ratings(&ratings);
        prop_assert_eq!(summary.count as usize, ratings.len());
        match summary.average {
            None => prop_assert!(ratings.is_empty()),
            Some(average) => prop_assert!((1.0..=5.0).contains(&average)),
        }
    }

    /// Decoded aggregates follow the nested reviews
    #[test]
    fn prop_decoded_aggregates(ratings in prop::collection::vec(1i32..=5, 0..10)) {
        let records = parse_opportunities(json!([row(1, &ratings, "active")])).unwrap();
        prop_assert_eq!(records[0].review_count as usize, ratings.len());
        prop_assert_eq!(records[0].average_rating, RatingSummary::from_ratings(&ratings).average);
    }

    /// Out-of-range ratings never decode
    #[test]
    fn prop_out_of_range_rating_rejected(rating in prop_oneof![-100i32..1, 6i32..100]) {
        let result = parse_opportunities(json!([row(1, &[rating], "active")]));
        let is_rating_error = matches!(result, Err(ShapeError::RatingOutOfRange { .. }));
        prop_assert!(is_rating_error);
    }

    /// Payloads sorted by day descending pass the ordering check
    #[test]
    fn prop_sorted_days_pass(mut days in prop::collection::vec(1u32..=28, 0..10)) {
        days.sort_unstable_by(|a, b| b.cmp(a));
        let payload = Value::Array(days.iter().map(|&d| row(d, &[], "active")).collect());
        let records = parse_opportunities(payload).unwrap();
        prop_assert!(ensure_newest_first(&records).is_ok());
    }
}
