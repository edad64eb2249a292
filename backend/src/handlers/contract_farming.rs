//! HTTP handlers for contract farming endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use shared::{
    ContractFarmingOpportunity, Document, NewDocument, NewOpportunity, NewReview,
    OpportunityStatus, OpportunitySummary, ReadOptions, Review,
};
use uuid::Uuid;

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::services::ContractFarmingService;
use crate::AppState;

fn service(state: &AppState) -> ContractFarmingService {
    ContractFarmingService::new(state.store.clone(), &state.config.read_model)
}

// ============================================================================
// Read model
// ============================================================================

/// Query parameters for listing opportunities
#[derive(Debug, Deserialize)]
pub struct ListOpportunitiesQuery {
    pub status: Option<OpportunityStatus>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl From<ListOpportunitiesQuery> for ReadOptions {
    fn from(query: ListOpportunitiesQuery) -> Self {
        ReadOptions {
            opportunity_id: None,
            status: query.status,
            limit: query.limit,
            offset: query.offset,
        }
    }
}

/// List opportunities with documents and reviews, newest first
pub async fn list_opportunities(
    State(state): State<AppState>,
    Query(query): Query<ListOpportunitiesQuery>,
) -> AppResult<Json<Vec<ContractFarmingOpportunity>>> {
    let opportunities = service(&state).list_opportunities(query.into()).await?;
    Ok(Json(opportunities))
}

/// List opportunity summaries, newest first
pub async fn list_opportunity_summaries(
    State(state): State<AppState>,
    Query(query): Query<ListOpportunitiesQuery>,
) -> AppResult<Json<Vec<OpportunitySummary>>> {
    let summaries = service(&state).list_summaries(query.into()).await?;
    Ok(Json(summaries))
}

/// Get an opportunity by ID
pub async fn get_opportunity(
    State(state): State<AppState>,
    Path(opportunity_id): Path<Uuid>,
) -> AppResult<Json<ContractFarmingOpportunity>> {
    let opportunity = service(&state).get_opportunity(opportunity_id).await?;
    Ok(Json(opportunity))
}

// ============================================================================
// Listing management
// ============================================================================

/// Create an opportunity
pub async fn create_opportunity(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(input): Json<NewOpportunity>,
) -> AppResult<(StatusCode, Json<ContractFarmingOpportunity>)> {
    let opportunity = service(&state)
        .create_opportunity(&current_user.0, input)
        .await?;
    Ok((StatusCode::CREATED, Json(opportunity)))
}

/// Request body for status changes
#[derive(Debug, Deserialize)]
pub struct UpdateStatusInput {
    pub status: OpportunityStatus,
}

/// Change an opportunity's status
pub async fn update_opportunity_status(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(opportunity_id): Path<Uuid>,
    Json(input): Json<UpdateStatusInput>,
) -> AppResult<Json<ContractFarmingOpportunity>> {
    let opportunity = service(&state)
        .update_status(&current_user.0, opportunity_id, input.status)
        .await?;
    Ok(Json(opportunity))
}

/// Attach a document to an opportunity
pub async fn add_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(opportunity_id): Path<Uuid>,
    Json(input): Json<NewDocument>,
) -> AppResult<(StatusCode, Json<Document>)> {
    let document = service(&state)
        .add_document(&current_user.0, opportunity_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(document)))
}

/// Remove a document from an opportunity
pub async fn delete_document(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path((opportunity_id, document_id)): Path<(Uuid, Uuid)>,
) -> AppResult<StatusCode> {
    service(&state)
        .delete_document(&current_user.0, opportunity_id, document_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Review an opportunity
pub async fn submit_review(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(opportunity_id): Path<Uuid>,
    Json(input): Json<NewReview>,
) -> AppResult<(StatusCode, Json<Review>)> {
    let review = service(&state)
        .submit_review(&current_user.0, opportunity_id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
