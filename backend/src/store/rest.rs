//! Hosted REST gateway client (PostgREST-compatible)
//!
//! The composed read is expressed with resource embedding: documents and
//! reviews are embedded by their foreign key to the opportunity, and each
//! review embeds the reviewer's profile.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde_json::{json, Value};
use shared::{Document, OpportunityRow, OpportunityStatus, Review, ShapeError};
use uuid::Uuid;

use super::{
    OpportunityQuery, RemoteStore, DOCUMENTS_TABLE, OPPORTUNITIES_TABLE, PROFILES_TABLE,
    REVIEWS_TABLE,
};
use crate::error::{AppError, AppResult};

/// REST gateway client
#[derive(Clone)]
pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
    schema: String,
    timeout: Duration,
}

/// Projection of the composed read
pub fn composed_select() -> String {
    format!(
        "*,documents:{DOCUMENTS_TABLE}(*),\
         reviews:{REVIEWS_TABLE}(*,profile:{PROFILES_TABLE}(id,full_name,avatar_url))"
    )
}

/// Query-string parameters of the composed read
pub fn composed_params(query: &OpportunityQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("select", composed_select()),
        ("order", "created_at.desc,id.desc".to_string()),
        ("documents.order", "created_at.desc".to_string()),
        ("reviews.order", "created_at.desc".to_string()),
        ("limit", query.page.limit.to_string()),
        ("offset", query.page.offset.to_string()),
    ];
    if let Some(id) = query.opportunity_id {
        params.push(("id", format!("eq.{}", id)));
    }
    if let Some(status) = query.status {
        params.push(("status", format!("eq.{}", status)));
    }
    params
}

/// Classify a non-success gateway response
pub fn classify_failure(status: StatusCode, body: &str) -> AppError {
    let detail = format!("{} - {}", status, body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AppError::Authorization(detail),
        StatusCode::CONFLICT => AppError::Conflict(detail),
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND | StatusCode::NOT_ACCEPTABLE => {
            AppError::Query(detail)
        }
        s if s.is_server_error() => AppError::Connection(detail),
        _ => AppError::Internal(format!("Unexpected gateway response: {}", detail)),
    }
}

/// Classify a request that produced no usable response
pub fn classify_transport(err: reqwest::Error, timeout: Duration) -> AppError {
    if err.is_timeout() {
        AppError::Timeout(timeout)
    } else if err.is_decode() {
        AppError::DataShape(ShapeError::Decode(err.to_string()))
    } else {
        AppError::Connection(format!("Gateway request failed: {}", err))
    }
}

impl RestStore {
    /// Create a new RestStore
    pub fn new(base_url: &str, api_key: &str, schema: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Configuration(format!("HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            schema: schema.to_string(),
            timeout,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Accept-Profile", &self.schema)
            .header("Content-Profile", &self.schema)
    }

    async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| classify_transport(e, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "REST gateway rejected request");
            return Err(classify_failure(status, &body));
        }

        Ok(response)
    }

    async fn decode(&self, response: Response) -> AppResult<Value> {
        response
            .json()
            .await
            .map_err(|e| classify_transport(e, self.timeout))
    }

    /// Number of rows in a `return=representation` response
    async fn affected_rows(&self, response: Response) -> AppResult<usize> {
        let rows = self.decode(response).await?;
        Ok(rows.as_array().map(Vec::len).unwrap_or(0))
    }
}

#[async_trait]
impl RemoteStore for RestStore {
    fn name(&self) -> &'static str {
        "rest"
    }

    async fn fetch_opportunities(&self, query: &OpportunityQuery) -> AppResult<Value> {
        tracing::debug!(?query, "Fetching opportunities from REST gateway");
        let request = self
            .client
            .get(self.table_url(OPPORTUNITIES_TABLE))
            .query(&composed_params(query));
        let response = self.send(request).await?;
        self.decode(response).await
    }

    async fn insert_opportunity(&self, row: &OpportunityRow) -> AppResult<()> {
        let request = self
            .client
            .post(self.table_url(OPPORTUNITIES_TABLE))
            .header("Prefer", "return=minimal")
            .json(row);
        self.send(request).await?;
        Ok(())
    }

    async fn update_status(
        &self,
        opportunity_id: Uuid,
        status: OpportunityStatus,
        updated_at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let request = self
            .client
            .patch(self.table_url(OPPORTUNITIES_TABLE))
            .query(&[("id", format!("eq.{}", opportunity_id))])
            .header("Prefer", "return=representation")
            .json(&json!({ "status": status, "updated_at": updated_at }));
        let response = self.send(request).await?;
        Ok(self.affected_rows(response).await? > 0)
    }

    async fn insert_document(&self, document: &Document) -> AppResult<()> {
        let request = self
            .client
            .post(self.table_url(DOCUMENTS_TABLE))
            .header("Prefer", "return=minimal")
            .json(document);
        self.send(request).await?;
        Ok(())
    }

    async fn delete_document(&self, opportunity_id: Uuid, document_id: Uuid) -> AppResult<bool> {
        let request = self
            .client
            .delete(self.table_url(DOCUMENTS_TABLE))
            .query(&[
                ("id", format!("eq.{}", document_id)),
                ("opportunity_id", format!("eq.{}", opportunity_id)),
            ])
            .header("Prefer", "return=representation");
        let response = self.send(request).await?;
        Ok(self.affected_rows(response).await? > 0)
    }

    async fn insert_review(&self, review: &Review) -> AppResult<()> {
        let request = self
            .client
            .post(self.table_url(REVIEWS_TABLE))
            .header("Prefer", "return=minimal")
            .json(&json!({
                "id": review.id,
                "opportunity_id": review.opportunity_id,
                "reviewer_id": review.reviewer_id,
                "rating": review.rating,
                "comment": review.comment,
                "created_at": review.created_at,
            }));
        self.send(request).await?;
        Ok(())
    }

    async fn ping(&self) -> AppResult<()> {
        let request = self
            .client
            .get(self.table_url(OPPORTUNITIES_TABLE))
            .query(&[("select", "id"), ("limit", "1")]);
        self.send(request).await?;
        Ok(())
    }
}
