//! Opportunity review models and rating aggregation

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// Lowest rating a reviewer may give
pub const MIN_RATING: i32 = 1;

/// Highest rating a reviewer may give
pub const MAX_RATING: i32 = 5;

/// A review left on an opportunity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    pub id: Uuid,
    pub opportunity_id: Uuid,
    pub reviewer_id: Uuid,
    pub rating: i32,
    pub comment: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Reviewer profile joined at read time
    #[serde(default, alias = "profiles", skip_serializing_if = "Option::is_none")]
    pub profile: Option<ReviewerProfile>,
}

/// Partial projection of a user profile shown next to a review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewerProfile {
    pub id: Uuid,
    pub full_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Input for submitting a review
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewReview {
    #[validate(range(min = 1, max = 5))]
    pub rating: i32,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
}

impl Review {
    pub fn from_input(
        input: NewReview,
        opportunity_id: Uuid,
        reviewer_id: Uuid,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            opportunity_id,
            reviewer_id,
            rating: input.rating,
            comment: input.comment,
            created_at: now,
            profile: None,
        }
    }
}

/// Rating aggregate computed from a set of reviews
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct RatingSummary {
    /// Arithmetic mean of ratings; `None` when there are no reviews
    pub average: Option<f64>,
    pub count: u32,
}

impl RatingSummary {
    pub fn from_ratings(ratings: &[i32]) -> Self {
        if ratings.is_empty() {
            return Self::default();
        }
        let total: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
        Self {
            average: Some(total as f64 / ratings.len() as f64),
            count: ratings.len() as u32,
        }
    }

    pub fn from_reviews(reviews: &[Review]) -> Self {
        let ratings: Vec<i32> = reviews.iter().map(|r| r.rating).collect();
        Self::from_ratings(&ratings)
    }
}
