//! `categories/` and `genres/` endpoints
//!
//! Both collections support list, create and delete. Deletion is addressed
//! by slug.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{delete, get},
};
use common::extract::JsonBody;
use tracing::info;

use super::Params;
use crate::{
    error::{ApiError, ApiResult},
    filters::SearchFilter,
    middleware::CurrentUser,
    models::{Taxon, TaxonRequest},
    pagination::{LimitOffset, Paginated},
    permissions::{IsAdminOrReadOnly, check_permission},
    repositories::TaxonomyRepository,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/categories/",
            get(list_categories).post(create_category),
        )
        .route("/api/v1/categories/:slug/", delete(delete_category))
        .route("/api/v1/genres/", get(list_genres).post(create_genre))
        .route("/api/v1/genres/:slug/", delete(delete_genre))
}

async fn list(
    state: &AppState,
    repository: &TaxonomyRepository,
    method: &Method,
    caller: &CurrentUser,
    uri: &Uri,
    params: &Params,
) -> ApiResult<Json<Paginated<Taxon>>> {
    check_permission(&IsAdminOrReadOnly, method, caller.user())?;

    let window = LimitOffset::from_params(params, &state.pagination);
    let filter = SearchFilter::from_params(params);
    let (taxa, count) = repository.list(&filter, window.limit, window.offset).await?;

    Ok(Json(window.paginate(uri, count, taxa)))
}

async fn create(
    repository: &TaxonomyRepository,
    method: &Method,
    caller: &CurrentUser,
    payload: &TaxonRequest,
) -> ApiResult<Response> {
    check_permission(&IsAdminOrReadOnly, method, caller.user())?;

    let new_taxon = payload.validate()?;
    let taxon = repository.create(&new_taxon).await?;

    Ok((StatusCode::CREATED, Json(taxon)).into_response())
}

async fn remove(
    repository: &TaxonomyRepository,
    method: &Method,
    caller: &CurrentUser,
    slug: &str,
) -> ApiResult<StatusCode> {
    check_permission(&IsAdminOrReadOnly, method, caller.user())?;

    if !repository.delete_by_slug(slug).await? {
        return Err(ApiError::not_found());
    }
    info!(kind = repository.kind().label(), slug, "Classifier deleted");

    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_categories(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<Taxon>>> {
    list(&state, &state.category_repository, &method, &caller, &uri, &params).await
}

pub async fn create_category(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<TaxonRequest>,
) -> ApiResult<Response> {
    create(&state.category_repository, &method, &caller, &payload).await
}

pub async fn delete_category(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    remove(&state.category_repository, &method, &caller, &slug).await
}

pub async fn list_genres(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<Taxon>>> {
    list(&state, &state.genre_repository, &method, &caller, &uri, &params).await
}

pub async fn create_genre(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<TaxonRequest>,
) -> ApiResult<Response> {
    create(&state.genre_repository, &method, &caller, &payload).await
}

pub async fn delete_genre(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<StatusCode> {
    remove(&state.genre_repository, &method, &caller, &slug).await
}
