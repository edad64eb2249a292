//! Listing management tests
//!
//! Ownership rules for status changes and documents, plus the review rules:
//! one review per reviewer and no reviews on one's own listing.

mod common;

use common::*;
use contract_farming::store::MemoryStore;
use contract_farming::AppError;
use rust_decimal::Decimal;
use shared::{NewDocument, NewOpportunity, NewReview, OpportunityStatus};
use uuid::Uuid;

fn new_opportunity() -> NewOpportunity {
    NewOpportunity {
        title: "Cassava supply contract".to_string(),
        description: "Starch mill buys fresh roots at harvest".to_string(),
        company_name: "Isan Starch Co.".to_string(),
        location: "Nakhon Ratchasima".to_string(),
        crop_type: "cassava".to_string(),
        contract_duration: "12 months".to_string(),
        requirements: "Minimum 10 rai planted".to_string(),
        benefits: "Guaranteed floor price".to_string(),
        contact_person: "Somchai".to_string(),
        contact_email: "somchai@example.com".to_string(),
        contact_phone: "+66 81 234 5678".to_string(),
        price_per_unit: Some(Decimal::new(275, 2)),
        minimum_quantity: Some(Decimal::new(5_000, 0)),
        maximum_quantity: Some(Decimal::new(50_000, 0)),
        unit: Some("kg".to_string()),
        status: OpportunityStatus::Active,
        expires_at: None,
    }
}

fn new_review(rating: i32) -> NewReview {
    NewReview {
        rating,
        comment: Some("Fair grading at the mill".to_string()),
    }
}

// ============================================================================
// Creation
// ============================================================================

#[tokio::test]
async fn test_create_opportunity_reads_back_composed() {
    let store = MemoryStore::new();
    let owner = user(Uuid::new_v4());

    let created = service(&store)
        .create_opportunity(&owner, new_opportunity())
        .await
        .unwrap();

    assert_eq!(created.row.created_by, owner.user_id);
    assert_eq!(created.row.status, OpportunityStatus::Active);
    assert!(created.documents.is_empty());
    assert_eq!(created.review_count, 0);
    assert!(created.average_rating.is_none());
    assert_eq!(store.opportunity_count().await, 1);
}

#[tokio::test]
async fn test_create_rejects_inverted_quantity_range() {
    let store = MemoryStore::new();
    let mut input = new_opportunity();
    input.minimum_quantity = Some(Decimal::new(60_000, 0));

    let result = service(&store)
        .create_opportunity(&user(Uuid::new_v4()), input)
        .await;

    assert!(matches!(result, Err(AppError::Validation { .. })));
    assert_eq!(store.opportunity_count().await, 0);
}

#[tokio::test]
async fn test_create_rejects_bad_email() {
    let store = MemoryStore::new();
    let mut input = new_opportunity();
    input.contact_email = "not-an-email".to_string();

    let result = service(&store)
        .create_opportunity(&user(Uuid::new_v4()), input)
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

// ============================================================================
// Status and documents
// ============================================================================

#[tokio::test]
async fn test_owner_changes_status() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let id = seed_opportunity(&store, owner, base_time(), &[], 0).await;

    let updated = service(&store)
        .update_status(&user(owner), id, OpportunityStatus::Completed)
        .await
        .unwrap();

    assert_eq!(updated.row.status, OpportunityStatus::Completed);
}

#[tokio::test]
async fn test_stranger_cannot_change_status() {
    let store = MemoryStore::new();
    let id = seed_opportunity(&store, Uuid::new_v4(), base_time(), &[], 0).await;

    let result = service(&store)
        .update_status(&user(Uuid::new_v4()), id, OpportunityStatus::Cancelled)
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_admin_manages_any_listing() {
    let store = MemoryStore::new();
    let id = seed_opportunity(&store, Uuid::new_v4(), base_time(), &[], 0).await;
    let service = service(&store);

    let updated = service
        .update_status(&admin(), id, OpportunityStatus::Inactive)
        .await
        .unwrap();
    assert_eq!(updated.row.status, OpportunityStatus::Inactive);

    let document = service
        .add_document(
            &admin(),
            id,
            NewDocument {
                name: "Price schedule".to_string(),
                url: "https://files.example.com/prices.pdf".to_string(),
                file_type: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(document.opportunity_id, id);
}

#[tokio::test]
async fn test_document_add_then_delete() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let id = seed_opportunity(&store, owner, base_time(), &[], 0).await;
    let service = service(&store);

    let document = service
        .add_document(
            &user(owner),
            id,
            NewDocument {
                name: "Planting guide".to_string(),
                url: "https://files.example.com/guide.pdf".to_string(),
                file_type: Some("application/pdf".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(service.get_opportunity(id).await.unwrap().documents.len(), 1);

    service
        .delete_document(&user(owner), id, document.id)
        .await
        .unwrap();
    assert!(service.get_opportunity(id).await.unwrap().documents.is_empty());

    let again = service.delete_document(&user(owner), id, document.id).await;
    assert!(matches!(again, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_document_rejects_invalid_url() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let id = seed_opportunity(&store, owner, base_time(), &[], 0).await;

    let result = service(&store)
        .add_document(
            &user(owner),
            id,
            NewDocument {
                name: "Broken link".to_string(),
                url: "not a url".to_string(),
                file_type: None,
            },
        )
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

// ============================================================================
// Reviews
// ============================================================================

#[tokio::test]
async fn test_review_updates_aggregates() {
    let store = MemoryStore::new();
    let id = seed_opportunity(&store, Uuid::new_v4(), base_time(), &[4], 0).await;
    let reviewer = Uuid::new_v4();
    store.insert_profile(profile(reviewer, "Niran")).await;
    let service = service(&store);

    service
        .submit_review(&user(reviewer), id, new_review(5))
        .await
        .unwrap();

    let opportunity = service.get_opportunity(id).await.unwrap();
    assert_eq!(opportunity.review_count, 2);
    assert_eq!(opportunity.average_rating, Some(4.5));
}

#[tokio::test]
async fn test_owner_cannot_review_own_listing() {
    let store = MemoryStore::new();
    let owner = Uuid::new_v4();
    let id = seed_opportunity(&store, owner, base_time(), &[], 0).await;

    let result = service(&store)
        .submit_review(&user(owner), id, new_review(5))
        .await;

    assert!(matches!(result, Err(AppError::Forbidden(_))));
}

#[tokio::test]
async fn test_second_review_from_same_reviewer_conflicts() {
    let store = MemoryStore::new();
    let id = seed_opportunity(&store, Uuid::new_v4(), base_time(), &[], 0).await;
    let reviewer = Uuid::new_v4();
    store.insert_profile(profile(reviewer, "Niran")).await;
    let service = service(&store);

    service
        .submit_review(&user(reviewer), id, new_review(3))
        .await
        .unwrap();
    let result = service.submit_review(&user(reviewer), id, new_review(4)).await;

    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_review_rating_out_of_range_rejected() {
    let store = MemoryStore::new();
    let id = seed_opportunity(&store, Uuid::new_v4(), base_time(), &[], 0).await;

    let result = service(&store)
        .submit_review(&user(Uuid::new_v4()), id, new_review(6))
        .await;

    assert!(matches!(result, Err(AppError::InvalidInput(_))));
}

#[tokio::test]
async fn test_review_on_missing_listing_not_found() {
    let store = MemoryStore::new();

    let result = service(&store)
        .submit_review(&user(Uuid::new_v4()), Uuid::new_v4(), new_review(4))
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
}
