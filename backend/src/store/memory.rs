//! In-process remote store

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use shared::{Document, OpportunityRow, OpportunityStatus, Review, ReviewerProfile};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{OpportunityQuery, RemoteStore};
use crate::error::{AppError, AppResult};

/// Failure the in-memory store should report instead of answering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InjectedFailure {
    Connection,
    Authorization,
    Query,
}

impl InjectedFailure {
    fn into_error(self) -> AppError {
        match self {
            InjectedFailure::Connection => AppError::Connection("connection refused".to_string()),
            InjectedFailure::Authorization => {
                AppError::Authorization("permission denied for table".to_string())
            }
            InjectedFailure::Query => AppError::Query(
                "could not find a relationship between the tables".to_string(),
            ),
        }
    }
}

#[derive(Default)]
struct Tables {
    /// Kept as raw JSON, the way a remote store hands rows back
    opportunities: Vec<Value>,
    documents: Vec<Document>,
    reviews: Vec<Review>,
    profiles: HashMap<Uuid, ReviewerProfile>,
}

/// In-memory remote store for development and tests.
///
/// Produces the same nested payload as the hosted backends.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<RwLock<Tables>>,
    failure: Arc<RwLock<Option<InjectedFailure>>>,
    latency: Arc<RwLock<Option<Duration>>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `failure` (or succeed again with `None`).
    pub async fn set_failure(&self, failure: Option<InjectedFailure>) {
        *self.failure.write().await = failure;
    }

    /// Delays every subsequent call by `latency`.
    pub async fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write().await = latency;
    }

    pub async fn insert_profile(&self, profile: ReviewerProfile) {
        self.tables.write().await.profiles.insert(profile.id, profile);
    }

    /// Stores an opportunity row exactly as given, without any checks.
    pub async fn insert_raw_opportunity(&self, row: Value) {
        self.tables.write().await.opportunities.push(row);
    }

    pub async fn opportunity_count(&self) -> usize {
        self.tables.read().await.opportunities.len()
    }

    async fn begin(&self) -> AppResult<()> {
        let latency = *self.latency.read().await;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        match *self.failure.read().await {
            Some(failure) => Err(failure.into_error()),
            None => Ok(()),
        }
    }
}

fn row_id(row: &Value) -> Option<&str> {
    row.get("id").and_then(Value::as_str)
}

fn row_created_at(row: &Value) -> Option<DateTime<Utc>> {
    row.get("created_at")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
}

fn newest_first(a: &Value, b: &Value) -> Ordering {
    row_created_at(b)
        .cmp(&row_created_at(a))
        .then_with(|| row_id(b).cmp(&row_id(a)))
}

fn to_value<T: serde::Serialize>(item: &T) -> AppResult<Value> {
    serde_json::to_value(item).map_err(|e| AppError::Internal(e.to_string()))
}

#[async_trait]
impl RemoteStore for MemoryStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn fetch_opportunities(&self, query: &OpportunityQuery) -> AppResult<Value> {
        self.begin().await?;
        let tables = self.tables.read().await;

        let id_filter = query.opportunity_id.map(|id| id.to_string());
        let mut roots: Vec<&Value> = tables
            .opportunities
            .iter()
            .filter(|row| match &id_filter {
                Some(id) => row_id(row) == Some(id.as_str()),
                None => true,
            })
            .filter(|row| match query.status {
                Some(status) => row.get("status").and_then(Value::as_str) == Some(status.as_str()),
                None => true,
            })
            .collect();
        roots.sort_by(|a, b| newest_first(a, b));

        let mut payload = Vec::new();
        for root in roots
            .into_iter()
            .skip(query.page.offset as usize)
            .take(query.page.limit as usize)
        {
            let id = row_id(root).unwrap_or_default();

            let mut documents: Vec<&Document> = tables
                .documents
                .iter()
                .filter(|d| d.opportunity_id.to_string() == id)
                .collect();
            documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let mut reviews: Vec<&Review> = tables
                .reviews
                .iter()
                .filter(|r| r.opportunity_id.to_string() == id)
                .collect();
            reviews.sort_by(|a, b| b.created_at.cmp(&a.created_at));

            let mut nested_reviews = Vec::with_capacity(reviews.len());
            for review in reviews {
                let mut value = to_value(review)?;
                let profile = match tables.profiles.get(&review.reviewer_id) {
                    Some(profile) => to_value(profile)?,
                    None => Value::Null,
                };
                value["profile"] = profile;
                nested_reviews.push(value);
            }

            let mut row = root.clone();
            if let Some(fields) = row.as_object_mut() {
                fields.insert("documents".to_string(), to_value(&documents)?);
                fields.insert("reviews".to_string(), Value::Array(nested_reviews));
            }
            payload.push(row);
        }

        Ok(Value::Array(payload))
    }

    async fn insert_opportunity(&self, row: &OpportunityRow) -> AppResult<()> {
        self.begin().await?;
        let value = to_value(row)?;
        let mut tables = self.tables.write().await;
        let id = row.id.to_string();
        if tables.opportunities.iter().any(|r| row_id(r) == Some(id.as_str())) {
            return Err(AppError::Conflict(format!("opportunity {} already exists", row.id)));
        }
        tables.opportunities.push(value);
        Ok(())
    }

    async fn update_status(
        &self,
        opportunity_id: Uuid,
        status: OpportunityStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        self.begin().await?;
        let mut tables = self.tables.write().await;
        let id = opportunity_id.to_string();
        match tables
            .opportunities
            .iter_mut()
            .find(|r| row_id(r) == Some(id.as_str()))
        {
            Some(row) => {
                let updated_at = to_value(&updated_at)?;
                if let Some(fields) = row.as_object_mut() {
                    fields.insert("status".to_string(), json!(status.as_str()));
                    fields.insert("updated_at".to_string(), updated_at);
                }
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn insert_document(&self, document: &Document) -> AppResult<()> {
        self.begin().await?;
        let mut tables = self.tables.write().await;
        let parent = document.opportunity_id.to_string();
        if !tables.opportunities.iter().any(|r| row_id(r) == Some(parent.as_str())) {
            return Err(AppError::NotFound("Opportunity".to_string()));
        }
        tables.documents.push(document.clone());
        Ok(())
    }

    async fn delete_document(&self, opportunity_id: Uuid, document_id: Uuid) -> AppResult<bool> {
        self.begin().await?;
        let mut tables = self.tables.write().await;
        let before = tables.documents.len();
        tables
            .documents
            .retain(|d| !(d.id == document_id && d.opportunity_id == opportunity_id));
        Ok(tables.documents.len() < before)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        self.begin().await?;
        let mut tables = self.tables.write().await;
        let parent = review.opportunity_id.to_string();
        if !tables.opportunities.iter().any(|r| row_id(r) == Some(parent.as_str())) {
            return Err(AppError::NotFound("Opportunity".to_string()));
        }
        let duplicate = tables.reviews.iter().any(|r| {
            r.opportunity_id == review.opportunity_id && r.reviewer_id == review.reviewer_id
        });
        if duplicate {
            return Err(AppError::Conflict(
                "reviewer has already reviewed this opportunity".to_string(),
            ));
        }
        let mut stored = review.clone();
        stored.profile = None;
        tables.reviews.push(stored);
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        self.begin().await
    }
}
