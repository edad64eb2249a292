//! Remote store adapters
//!
//! Every adapter answers the composed opportunity read with the same JSON
//! payload: an array of opportunity rows, each carrying nested `documents`
//! and `reviews`, each review carrying a nested `profile` projection.
//! Decoding and validating that payload is the caller's job.

pub mod memory;
pub mod postgres;
pub mod rest;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared::{Document, OpportunityRow, OpportunityStatus, Page, PageLimits, ReadOptions, Review};
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::error::{AppError, AppResult};

pub use memory::{InjectedFailure, MemoryStore};
pub use postgres::PostgresStore;
pub use rest::RestStore;

/// Table holding opportunity rows
pub const OPPORTUNITIES_TABLE: &str = "contract_farming_opportunities";
/// Table holding opportunity documents
pub const DOCUMENTS_TABLE: &str = "contract_farming_documents";
/// Table holding opportunity reviews
pub const REVIEWS_TABLE: &str = "contract_farming_reviews";
/// Table holding user profiles
pub const PROFILES_TABLE: &str = "profiles";

/// Resolved parameters of one composed read
#[derive(Debug, Clone, PartialEq)]
pub struct OpportunityQuery {
    pub opportunity_id: Option<Uuid>,
    pub status: Option<OpportunityStatus>,
    pub page: Page,
}

impl OpportunityQuery {
    pub fn from_options(options: &ReadOptions, limits: PageLimits) -> Self {
        Self {
            opportunity_id: options.opportunity_id,
            status: options.status,
            page: options.page(limits),
        }
    }
}

/// Access to the hosted relational store
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Short name used in logs and health output
    fn name(&self) -> &'static str;

    /// Composed read: root rows newest first, with nested relations
    async fn fetch_opportunities(&self, query: &OpportunityQuery) -> AppResult<serde_json::Value>;

    async fn insert_opportunity(&self, row: &OpportunityRow) -> AppResult<()>;

    /// Returns `false` when no row matched
    async fn update_status(
        &self,
        opportunity_id: Uuid,
        status: OpportunityStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool>;

    async fn insert_document(&self, document: &Document) -> AppResult<()>;

    /// Returns `false` when no row matched
    async fn delete_document(&self, opportunity_id: Uuid, document_id: Uuid) -> AppResult<bool>;

    /// Fails with `Conflict` when the reviewer already reviewed the opportunity
    async fn insert_review(&self, review: &Review) -> AppResult<()>;

    /// Cheap reachability check
    async fn ping(&self) -> AppResult<()>;
}

/// Build the store selected by configuration
pub async fn connect(config: &Config) -> AppResult<Arc<dyn RemoteStore>> {
    match config.remote_store.backend {
        StoreBackend::Rest => {
            if config.remote_store.url.is_empty() {
                return Err(AppError::Configuration(
                    "remote_store.url is required for the rest backend".to_string(),
                ));
            }
            let store = RestStore::new(
                &config.remote_store.url,
                &config.remote_store.api_key,
                &config.remote_store.schema,
                config.read_model.request_timeout(),
            )?;
            Ok(Arc::new(store))
        }
        StoreBackend::Postgres => {
            if config.database.url.is_empty() {
                return Err(AppError::Configuration(
                    "database.url is required for the postgres backend".to_string(),
                ));
            }
            let store = PostgresStore::connect(&config.database, Duration::from_secs(30)).await?;
            if !config.is_production() {
                store.migrate().await?;
            }
            Ok(Arc::new(store))
        }
        StoreBackend::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
