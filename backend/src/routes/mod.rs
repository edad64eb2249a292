//! Route definitions for the Contract Farming Marketplace

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health check (public)
        .route("/health", get(handlers::health_check))
        // Contract farming listings (reads public, writes authenticated)
        .nest("/contract-farming", contract_farming_routes())
}

/// Contract farming routes
fn contract_farming_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/opportunities",
            get(handlers::list_opportunities).post(handlers::create_opportunity),
        )
        .route(
            "/opportunities/summaries",
            get(handlers::list_opportunity_summaries),
        )
        .route("/opportunities/:id", get(handlers::get_opportunity))
        .route(
            "/opportunities/:id/status",
            put(handlers::update_opportunity_status),
        )
        .route("/opportunities/:id/documents", post(handlers::add_document))
        .route(
            "/opportunities/:id/documents/:document_id",
            delete(handlers::delete_document),
        )
        .route("/opportunities/:id/reviews", post(handlers::submit_review))
}
