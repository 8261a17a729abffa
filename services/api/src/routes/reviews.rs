//! `titles/{title_id}/reviews/` endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use common::extract::JsonBody;
use tracing::info;

use super::{Params, parse_id};
use crate::{
    error::{ApiError, ApiResult},
    filters::ReviewFilter,
    middleware::CurrentUser,
    models::{Review, ReviewRequest, ReviewResponse},
    pagination::{LimitOffset, Paginated},
    permissions::{IsAdminModeratorOwnerOrReadOnly, check_object_permission, check_permission},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/titles/:title_id/reviews/",
            get(list_reviews).post(create_review),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/",
            get(get_review)
                .put(replace_review)
                .patch(update_review)
                .delete(delete_review),
        )
}

/// Title id from the path, 404 unless the title exists
async fn existing_title(state: &AppState, title_id: &str) -> ApiResult<i64> {
    let title_id = parse_id(title_id)?;
    if !state.title_repository.exists(title_id).await? {
        return Err(ApiError::not_found());
    }
    Ok(title_id)
}

/// Review named by the path, 404 unless it belongs to the title
pub(crate) async fn find_review(
    state: &AppState,
    title_id: &str,
    review_id: &str,
) -> ApiResult<Review> {
    state
        .review_repository
        .find(parse_id(title_id)?, parse_id(review_id)?)
        .await?
        .ok_or_else(ApiError::not_found)
}

pub async fn list_reviews(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Path(title_id): Path<String>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<ReviewResponse>>> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;

    let title_id = existing_title(&state, &title_id).await?;
    let window = LimitOffset::from_params(&params, &state.pagination);
    let filter = ReviewFilter::from_params(&params)?;
    let (reviews, count) = state
        .review_repository
        .list(title_id, &filter, window.limit, window.offset)
        .await?;

    Ok(Json(
        window
            .paginate(&uri, count, reviews)
            .map(ReviewResponse::from),
    ))
}

/// Review the title as the caller
///
/// The author is always the caller and the title always the one in the
/// path. A second review of the same title by the same author is rejected.
pub async fn create_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(title_id): Path<String>,
    JsonBody(payload): JsonBody<ReviewRequest>,
) -> ApiResult<Response> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;
    let author = caller.user().ok_or(ApiError::Forbidden)?;

    let title_id = existing_title(&state, &title_id).await?;
    let changes = payload.validate(false)?;
    let review = state
        .review_repository
        .create(
            title_id,
            author.id,
            changes.text.as_deref().unwrap_or_default(),
            changes.score.unwrap_or_default(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(ReviewResponse::from(review))).into_response())
}

pub async fn get_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path((title_id, review_id)): Path<(String, String)>,
) -> ApiResult<Json<ReviewResponse>> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;

    let review = find_review(&state, &title_id, &review_id).await?;
    Ok(Json(ReviewResponse::from(review)))
}

pub async fn replace_review(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<(String, String)>,
    payload: JsonBody<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    apply_review_update(state, method, caller, path, payload, false).await
}

pub async fn update_review(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<(String, String)>,
    payload: JsonBody<ReviewRequest>,
) -> ApiResult<Json<ReviewResponse>> {
    apply_review_update(state, method, caller, path, payload, true).await
}

async fn apply_review_update(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path((title_id, review_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<ReviewRequest>,
    partial: bool,
) -> ApiResult<Json<ReviewResponse>> {
    let policy = IsAdminModeratorOwnerOrReadOnly;
    check_permission(&policy, &method, caller.user())?;

    let review = find_review(&state, &title_id, &review_id).await?;
    check_object_permission(&policy, &method, caller.user(), review.author_id)?;

    let changes = payload.validate(partial)?;
    let updated = state
        .review_repository
        .update(review.title_id, review.id, &changes)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(ReviewResponse::from(updated)))
}

/// Delete a review with its comments
pub async fn delete_review(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path((title_id, review_id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let policy = IsAdminModeratorOwnerOrReadOnly;
    check_permission(&policy, &method, caller.user())?;

    let review = find_review(&state, &title_id, &review_id).await?;
    check_object_permission(&policy, &method, caller.user(), review.author_id)?;

    state.review_repository.delete(review.id).await?;
    info!(review_id = review.id, "Review deleted");

    Ok(StatusCode::NO_CONTENT)
}
