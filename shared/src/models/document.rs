//! Opportunity document models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A file attached to an opportunity (contract template, certificate, ...)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub name: String,
    pub url: String,
    pub file_type: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for attaching a document
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewDocument {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    #[validate(url)]
    pub url: String,
    #[validate(length(min = 1, max = 100))]
    pub file_type: Option<String>,
}

impl Document {
    pub fn from_input(input: NewDocument, opportunity_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            opportunity_id,
            name: input.name,
            url: input.url,
            file_type: input.file_type,
            created_at: now,
        }
    }
}
