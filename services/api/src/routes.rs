//! API service routes
//!
//! Every resource lives under `/api/v1/` with trailing-slash paths.

pub mod comments;
pub mod reviews;
pub mod taxonomy;
pub mod titles;
pub mod users;

use std::collections::HashMap;

use axum::{Json, Router, extract::State, response::IntoResponse, routing::get};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
};

/// Raw query-string parameters
pub type Params = HashMap<String, String>;

/// Create the router for the API service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .merge(users::routes())
        .merge(taxonomy::routes())
        .merge(titles::routes())
        .merge(reviews::routes())
        .merge(comments::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "api-service",
        "database": database,
    }))
}

/// Numeric id from a path segment; anything else names no object
pub(crate) fn parse_id(segment: &str) -> ApiResult<i64> {
    segment.parse().map_err(|_| ApiError::not_found())
}
