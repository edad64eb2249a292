//! Raw records returned by the remote store and their conversion into the
//! read model.
//!
//! The remote store answers the composed query with a JSON array of
//! opportunity rows, each carrying nested `documents` and `reviews` (reviews
//! carry a nested `profile`). Nothing in that payload is trusted: every row
//! is decoded into [`OpportunityRecord`] and then checked by
//! [`OpportunityRecord::into_read_model`].

use serde::Deserialize;

use crate::models::{
    ContractFarmingOpportunity, Document, OpportunityRow, OpportunityStatus, RatingSummary, Review,
};
use crate::validation::{validate_commercial_terms, validate_rating, ShapeError};

/// One opportunity row as delivered by the remote store
///
/// `status` stays a plain string so that values outside the enumeration are
/// reported as [`ShapeError::UnknownStatus`] with the offending row id.
/// Any stored aggregate columns in the payload are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct OpportunityRecord {
    #[serde(flatten)]
    pub row: OpportunityRow<String>,
    #[serde(alias = "contract_farming_documents")]
    pub documents: Vec<Document>,
    #[serde(alias = "contract_farming_reviews")]
    pub reviews: Vec<Review>,
}

impl OpportunityRecord {
    /// Check the record against the declared shape and compute aggregates
    pub fn into_read_model(self) -> Result<ContractFarmingOpportunity, ShapeError> {
        let id = self.row.id;
        let status = self.row.status.parse::<OpportunityStatus>().map_err(|_| {
            ShapeError::UnknownStatus {
                opportunity_id: id,
                value: self.row.status.clone(),
            }
        })?;

        validate_commercial_terms(
            self.row.price_per_unit,
            self.row.minimum_quantity,
            self.row.maximum_quantity,
        )
        .map_err(|reason| ShapeError::InvalidAmount {
            opportunity_id: id,
            reason,
        })?;

        for document in &self.documents {
            if document.opportunity_id != id {
                return Err(ShapeError::ForeignReference {
                    entity: "document",
                    id: document.id,
                    expected: id,
                    found: document.opportunity_id,
                });
            }
            if document.url.trim().is_empty() {
                return Err(ShapeError::EmptyDocumentUrl {
                    document_id: document.id,
                });
            }
        }

        for review in &self.reviews {
            if review.opportunity_id != id {
                return Err(ShapeError::ForeignReference {
                    entity: "review",
                    id: review.id,
                    expected: id,
                    found: review.opportunity_id,
                });
            }
            if validate_rating(review.rating).is_err() {
                return Err(ShapeError::RatingOutOfRange {
                    review_id: review.id,
                    rating: review.rating,
                });
            }
            if let Some(profile) = &review.profile {
                if profile.id != review.reviewer_id {
                    return Err(ShapeError::ProfileMismatch {
                        review_id: review.id,
                        reviewer_id: review.reviewer_id,
                        profile_id: profile.id,
                    });
                }
            }
        }

        let ratings = RatingSummary::from_reviews(&self.reviews);

        Ok(ContractFarmingOpportunity {
            row: self.row.with_status(status),
            documents: self.documents,
            reviews: self.reviews,
            average_rating: ratings.average,
            review_count: ratings.count,
        })
    }
}

fn into_read_models(
    decoded: Result<Vec<OpportunityRecord>, serde_json::Error>,
) -> Result<Vec<ContractFarmingOpportunity>, ShapeError> {
    decoded
        .map_err(|e| ShapeError::Decode(e.to_string()))?
        .into_iter()
        .map(OpportunityRecord::into_read_model)
        .collect()
}

/// Decode and validate a composed-query payload
pub fn parse_opportunities(
    payload: serde_json::Value,
) -> Result<Vec<ContractFarmingOpportunity>, ShapeError> {
    into_read_models(Vec::<OpportunityRecord>::deserialize(payload))
}

/// Same as [`parse_opportunities`] for a payload still in text form
pub fn parse_opportunities_str(
    payload: &str,
) -> Result<Vec<ContractFarmingOpportunity>, ShapeError> {
    into_read_models(serde_json::from_str(payload))
}

/// Check that records are ordered by `created_at`, newest first
pub fn ensure_newest_first(records: &[ContractFarmingOpportunity]) -> Result<(), ShapeError> {
    match records
        .windows(2)
        .position(|pair| pair[0].row.created_at < pair[1].row.created_at)
    {
        Some(index) => Err(ShapeError::Ordering { index: index + 1 }),
        None => Ok(()),
    }
}
