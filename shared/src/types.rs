//! Common types used across the platform

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::OpportunityStatus;

/// Caller-supplied options for the composed opportunity read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadOptions {
    /// Restrict the read to a single opportunity
    pub opportunity_id: Option<Uuid>,
    pub status: Option<OpportunityStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl ReadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_opportunity(id: Uuid) -> Self {
        Self {
            opportunity_id: Some(id),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: OpportunityStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Resolve limit and offset against configured bounds
    pub fn page(&self, limits: PageLimits) -> Page {
        let limit = self
            .limit
            .unwrap_or(limits.default_limit)
            .clamp(1, limits.max_limit.max(1));
        Page {
            limit,
            offset: self.offset.unwrap_or(0),
        }
    }
}

/// Bounds applied to every read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_limit: u32,
    pub max_limit: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_limit: 50,
            max_limit: 200,
        }
    }
}

/// Resolved page window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}
