//! Contract farming read model accessor
//!
//! Issues the composed opportunity read against the remote store, validates
//! the payload against the declared shape and computes rating aggregates.
//! Listing owners and administrators manage status, documents and reviews
//! through the same service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared::{
    ensure_newest_first, parse_opportunities, validate_commercial_terms, validate_phone,
    ContractFarmingOpportunity, Document, NewDocument, NewOpportunity, NewReview,
    OpportunityRow, OpportunityStatus, OpportunitySummary, PageLimits, ReadOptions, Review,
};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use validator::Validate;

use crate::config::ReadModelConfig;
use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::store::{OpportunityQuery, RemoteStore};

/// Contract farming service
#[derive(Clone)]
pub struct ContractFarmingService {
    store: Arc<dyn RemoteStore>,
    limits: PageLimits,
    timeout: Duration,
}

impl ContractFarmingService {
    /// Create a new ContractFarmingService instance
    pub fn new(store: Arc<dyn RemoteStore>, settings: &ReadModelConfig) -> Self {
        Self {
            store,
            limits: settings.page_limits(),
            timeout: settings.request_timeout(),
        }
    }

    async fn bounded<T>(&self, call: impl Future<Output = AppResult<T>>) -> AppResult<T> {
        match tokio::time::timeout(self.timeout, call).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(store = self.store.name(), "Remote store call timed out");
                Err(AppError::Timeout(self.timeout))
            }
        }
    }

    // ========================================================================
    // Read model
    // ========================================================================

    /// Composed read: opportunities with documents, reviews and reviewer
    /// profiles, newest first
    pub async fn list_opportunities(
        &self,
        options: ReadOptions,
    ) -> AppResult<Vec<ContractFarmingOpportunity>> {
        let query = OpportunityQuery::from_options(&options, self.limits);
        let payload = self.bounded(self.store.fetch_opportunities(&query)).await?;

        let opportunities = parse_opportunities(payload).map_err(|e| {
            tracing::warn!(store = self.store.name(), "Payload failed shape validation: {}", e);
            AppError::DataShape(e)
        })?;
        ensure_newest_first(&opportunities)?;

        if opportunities.len() > query.page.limit as usize {
            return Err(AppError::Query(format!(
                "store returned {} rows for limit {}",
                opportunities.len(),
                query.page.limit
            )));
        }

        tracing::debug!(
            store = self.store.name(),
            count = opportunities.len(),
            limit = query.page.limit,
            offset = query.page.offset,
            "Loaded contract farming opportunities"
        );

        Ok(opportunities)
    }

    /// Same read as [`Self::list_opportunities`], abandoned when `cancel` fires
    pub async fn list_opportunities_cancellable(
        &self,
        options: ReadOptions,
        cancel: CancellationToken,
    ) -> AppResult<Vec<ContractFarmingOpportunity>> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(AppError::Cancelled),
            result = self.list_opportunities(options) => result,
        }
    }

    /// Get a single opportunity by ID
    pub async fn get_opportunity(
        &self,
        opportunity_id: Uuid,
    ) -> AppResult<ContractFarmingOpportunity> {
        let mut found = self
            .list_opportunities(ReadOptions::for_opportunity(opportunity_id).with_limit(1))
            .await?;

        match found.pop() {
            Some(opportunity) if opportunity.row.id == opportunity_id => Ok(opportunity),
            Some(other) => Err(AppError::Query(format!(
                "filter on {} returned opportunity {}",
                opportunity_id, other.row.id
            ))),
            None => Err(AppError::NotFound("Opportunity".to_string())),
        }
    }

    /// Listing-card projection of the composed read
    pub async fn list_summaries(&self, options: ReadOptions) -> AppResult<Vec<OpportunitySummary>> {
        let now = Utc::now();
        let opportunities = self.list_opportunities(options).await?;
        Ok(opportunities.iter().map(|o| o.summary(now)).collect())
    }

    // ========================================================================
    // Listing management
    // ========================================================================

    /// Create a new opportunity owned by `actor`
    pub async fn create_opportunity(
        &self,
        actor: &AuthUser,
        input: NewOpportunity,
    ) -> AppResult<ContractFarmingOpportunity> {
        input.validate()?;
        validate_commercial_terms(
            input.price_per_unit,
            input.minimum_quantity,
            input.maximum_quantity,
        )
        .map_err(|msg| AppError::validation("minimum_quantity", msg))?;
        validate_phone(&input.contact_phone)
            .map_err(|msg| AppError::validation("contact_phone", msg))?;

        let row = OpportunityRow::from_input(input, actor.user_id, Utc::now());
        self.bounded(self.store.insert_opportunity(&row)).await?;

        tracing::info!(
            opportunity_id = %row.id,
            created_by = %actor.user_id,
            "Created opportunity"
        );

        self.get_opportunity(row.id).await
    }

    /// Assign a new status; owner or administrator only
    pub async fn update_status(
        &self,
        actor: &AuthUser,
        opportunity_id: Uuid,
        status: OpportunityStatus,
    ) -> AppResult<ContractFarmingOpportunity> {
        let existing = self.get_opportunity(opportunity_id).await?;
        ensure_can_manage(actor, &existing)?;

        let updated = self
            .bounded(self.store.update_status(opportunity_id, status, Utc::now()))
            .await?;
        if !updated {
            return Err(AppError::NotFound("Opportunity".to_string()));
        }

        tracing::info!(
            %opportunity_id,
            from = %existing.row.status,
            to = %status,
            "Opportunity status changed"
        );

        self.get_opportunity(opportunity_id).await
    }

    /// Attach a document; owner or administrator only
    pub async fn add_document(
        &self,
        actor: &AuthUser,
        opportunity_id: Uuid,
        input: NewDocument,
    ) -> AppResult<Document> {
        input.validate()?;
        let existing = self.get_opportunity(opportunity_id).await?;
        ensure_can_manage(actor, &existing)?;

        let document = Document::from_input(input, opportunity_id, Utc::now());
        self.bounded(self.store.insert_document(&document)).await?;

        Ok(document)
    }

    /// Delete a document; owner or administrator only
    pub async fn delete_document(
        &self,
        actor: &AuthUser,
        opportunity_id: Uuid,
        document_id: Uuid,
    ) -> AppResult<()> {
        let existing = self.get_opportunity(opportunity_id).await?;
        ensure_can_manage(actor, &existing)?;

        let deleted = self
            .bounded(self.store.delete_document(opportunity_id, document_id))
            .await?;
        if !deleted {
            return Err(AppError::NotFound("Document".to_string()));
        }

        Ok(())
    }

    /// Submit a review; one per reviewer, never on one's own listing
    pub async fn submit_review(
        &self,
        actor: &AuthUser,
        opportunity_id: Uuid,
        input: NewReview,
    ) -> AppResult<Review> {
        input.validate()?;
        let existing = self.get_opportunity(opportunity_id).await?;

        if existing.row.created_by == actor.user_id {
            return Err(AppError::Forbidden(
                "Listing owners cannot review their own opportunity".to_string(),
            ));
        }
        if existing.reviews.iter().any(|r| r.reviewer_id == actor.user_id) {
            return Err(AppError::Conflict(
                "You have already reviewed this opportunity".to_string(),
            ));
        }

        let review = Review::from_input(input, opportunity_id, actor.user_id, Utc::now());
        self.bounded(self.store.insert_review(&review)).await?;

        Ok(review)
    }
}

fn ensure_can_manage(actor: &AuthUser, opportunity: &ContractFarmingOpportunity) -> AppResult<()> {
    if actor.can_manage(opportunity.row.created_by) {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only the listing owner or an administrator may change this opportunity".to_string(),
        ))
    }
}
