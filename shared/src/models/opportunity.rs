//! Contract farming opportunity models

use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::Validate;

use super::{Document, Review};

/// Lifecycle status of an opportunity
///
/// Owners and administrators may assign any of the four values at any time;
/// there is no transition graph.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum OpportunityStatus {
    #[default]
    Active,
    Inactive,
    Completed,
    Cancelled,
}

impl OpportunityStatus {
    pub const ALL: [OpportunityStatus; 4] = [
        OpportunityStatus::Active,
        OpportunityStatus::Inactive,
        OpportunityStatus::Completed,
        OpportunityStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Active => "active",
            OpportunityStatus::Inactive => "inactive",
            OpportunityStatus::Completed => "completed",
            OpportunityStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for OpportunityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status string outside the four-value enumeration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown opportunity status '{0}'")]
pub struct UnknownStatus(pub String);

impl FromStr for OpportunityStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(OpportunityStatus::Active),
            "inactive" => Ok(OpportunityStatus::Inactive),
            "completed" => Ok(OpportunityStatus::Completed),
            "cancelled" => Ok(OpportunityStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A contract farming listing together with its documents and reviews.
///
/// This is the single canonical read-model shape. `average_rating` and
/// `review_count` are computed from `reviews` when the record is built and
/// are never read from storage.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ContractFarmingOpportunity {
    /// Root columns, serialized inline
    #[serde(flatten)]
    pub row: OpportunityRow,
    pub documents: Vec<Document>,
    pub reviews: Vec<Review>,
    pub average_rating: Option<f64>,
    pub review_count: u32,
}

impl ContractFarmingOpportunity {
    /// Whether the listing has passed its expiry time
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.row.expires_at.map(|at| at <= now).unwrap_or(false)
    }

    /// Narrow projection used by listing pages
    pub fn summary(&self, now: DateTime<Utc>) -> OpportunitySummary {
        let row = &self.row;
        OpportunitySummary {
            id: row.id,
            title: row.title.clone(),
            company_name: row.company_name.clone(),
            location: row.location.clone(),
            crop_type: row.crop_type.clone(),
            status: row.status,
            price_per_unit: row.price_per_unit,
            unit: row.unit.clone(),
            average_rating: self.average_rating,
            review_count: self.review_count,
            document_count: self.documents.len() as u32,
            created_at: row.created_at,
            expires_at: row.expires_at,
            is_expired: self.is_expired(now),
        }
    }
}

/// Listing-card projection of an opportunity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OpportunitySummary {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub location: String,
    pub crop_type: String,
    pub status: OpportunityStatus,
    pub price_per_unit: Option<Decimal>,
    pub unit: Option<String>,
    pub average_rating: Option<f64>,
    pub review_count: u32,
    pub document_count: u32,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub is_expired: bool,
}

/// Input for creating an opportunity
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewOpportunity {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 5000))]
    pub description: String,
    #[validate(length(min = 1, max = 200))]
    pub company_name: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    #[validate(length(min = 1, max = 100))]
    pub crop_type: String,
    #[validate(length(min = 1, max = 100))]
    pub contract_duration: String,
    #[validate(length(min = 1, max = 5000))]
    pub requirements: String,
    #[validate(length(min = 1, max = 5000))]
    pub benefits: String,
    #[validate(length(min = 1, max = 200))]
    pub contact_person: String,
    #[validate(email)]
    pub contact_email: String,
    #[validate(length(min = 6, max = 32))]
    pub contact_phone: String,
    pub price_per_unit: Option<Decimal>,
    pub minimum_quantity: Option<Decimal>,
    pub maximum_quantity: Option<Decimal>,
    #[validate(length(min = 1, max = 32))]
    pub unit: Option<String>,
    #[serde(default)]
    pub status: OpportunityStatus,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Root columns of an opportunity, without relations
///
/// `S` is the status representation: the enumeration once checked, or the
/// raw string while a remote row is still untrusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpportunityRow<S = OpportunityStatus> {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub company_name: String,
    pub location: String,
    pub crop_type: String,
    pub contract_duration: String,
    pub requirements: String,
    pub benefits: String,
    pub contact_person: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub price_per_unit: Option<Decimal>,
    pub minimum_quantity: Option<Decimal>,
    pub maximum_quantity: Option<Decimal>,
    pub unit: Option<String>,
    pub status: S,
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl<S> OpportunityRow<S> {
    /// Same row with a different status representation
    pub fn with_status<T>(self, status: T) -> OpportunityRow<T> {
        OpportunityRow {
            id: self.id,
            title: self.title,
            description: self.description,
            company_name: self.company_name,
            location: self.location,
            crop_type: self.crop_type,
            contract_duration: self.contract_duration,
            requirements: self.requirements,
            benefits: self.benefits,
            contact_person: self.contact_person,
            contact_email: self.contact_email,
            contact_phone: self.contact_phone,
            price_per_unit: self.price_per_unit,
            minimum_quantity: self.minimum_quantity,
            maximum_quantity: self.maximum_quantity,
            unit: self.unit,
            status,
            created_by: self.created_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
        }
    }
}

impl OpportunityRow {
    /// Build a fresh row from create input
    pub fn from_input(input: NewOpportunity, created_by: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            company_name: input.company_name,
            location: input.location,
            crop_type: input.crop_type,
            contract_duration: input.contract_duration,
            requirements: input.requirements,
            benefits: input.benefits,
            contact_person: input.contact_person,
            contact_email: input.contact_email,
            contact_phone: input.contact_phone,
            price_per_unit: input.price_per_unit,
            minimum_quantity: input.minimum_quantity,
            maximum_quantity: input.maximum_quantity,
            unit: input.unit,
            status: input.status,
            created_by,
            created_at: now,
            updated_at: now,
            expires_at: input.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OpportunityStatus::ALL {
            assert_eq!(status.as_str().parse::<OpportunityStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(
            "archived".parse::<OpportunityStatus>(),
            Err(UnknownStatus("archived".to_string()))
        );
        assert!("Active".parse::<OpportunityStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OpportunityStatus::Cancelled).unwrap();
        assert_eq!(json, "\"cancelled\"");
    }
}
