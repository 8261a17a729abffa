//! `titles/{title_id}/reviews/{review_id}/comments/` endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use common::extract::JsonBody;
use tracing::info;

use super::{Params, parse_id, reviews::find_review};
use crate::{
    error::{ApiError, ApiResult},
    filters::CommentFilter,
    middleware::CurrentUser,
    models::{Comment, CommentRequest, CommentResponse},
    pagination::{LimitOffset, Paginated},
    permissions::{IsAdminModeratorOwnerOrReadOnly, check_object_permission, check_permission},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/",
            get(list_comments).post(create_comment),
        )
        .route(
            "/api/v1/titles/:title_id/reviews/:review_id/comments/:comment_id/",
            get(get_comment)
                .put(replace_comment)
                .patch(update_comment)
                .delete(delete_comment),
        )
}

/// Comment named by the path, 404 unless the whole chain matches
async fn find_comment(
    state: &AppState,
    (title_id, review_id, comment_id): &(String, String, String),
) -> ApiResult<Comment> {
    let review = find_review(state, title_id, review_id).await?;
    state
        .comment_repository
        .find(review.id, parse_id(comment_id)?)
        .await?
        .ok_or_else(ApiError::not_found)
}

pub async fn list_comments(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Path((title_id, review_id)): Path<(String, String)>,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<CommentResponse>>> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;

    let review = find_review(&state, &title_id, &review_id).await?;
    let window = LimitOffset::from_params(&params, &state.pagination);
    let filter = CommentFilter::from_params(&params)?;
    let (comments, count) = state
        .comment_repository
        .list(review.id, &filter, window.limit, window.offset)
        .await?;

    Ok(Json(
        window
            .paginate(&uri, count, comments)
            .map(CommentResponse::from),
    ))
}

/// Comment on the review as the caller
pub async fn create_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path((title_id, review_id)): Path<(String, String)>,
    JsonBody(payload): JsonBody<CommentRequest>,
) -> ApiResult<Response> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;
    let author = caller.user().ok_or(ApiError::Forbidden)?;

    let review = find_review(&state, &title_id, &review_id).await?;
    let text = payload.validate(false)?.unwrap_or_default();
    let comment = state
        .comment_repository
        .create(review.id, author.id, &text)
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))).into_response())
}

pub async fn get_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(ids): Path<(String, String, String)>,
) -> ApiResult<Json<CommentResponse>> {
    check_permission(&IsAdminModeratorOwnerOrReadOnly, &method, caller.user())?;

    let comment = find_comment(&state, &ids).await?;
    Ok(Json(CommentResponse::from(comment)))
}

pub async fn replace_comment(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<(String, String, String)>,
    payload: JsonBody<CommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    apply_comment_update(state, method, caller, path, payload, false).await
}

pub async fn update_comment(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<(String, String, String)>,
    payload: JsonBody<CommentRequest>,
) -> ApiResult<Json<CommentResponse>> {
    apply_comment_update(state, method, caller, path, payload, true).await
}

async fn apply_comment_update(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(ids): Path<(String, String, String)>,
    JsonBody(payload): JsonBody<CommentRequest>,
    partial: bool,
) -> ApiResult<Json<CommentResponse>> {
    let policy = IsAdminModeratorOwnerOrReadOnly;
    check_permission(&policy, &method, caller.user())?;

    let comment = find_comment(&state, &ids).await?;
    check_object_permission(&policy, &method, caller.user(), comment.author_id)?;

    let text = payload.validate(partial)?;
    let updated = state
        .comment_repository
        .update(comment.review_id, comment.id, text.as_deref())
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(CommentResponse::from(updated)))
}

pub async fn delete_comment(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(ids): Path<(String, String, String)>,
) -> ApiResult<StatusCode> {
    let policy = IsAdminModeratorOwnerOrReadOnly;
    check_permission(&policy, &method, caller.user())?;

    let comment = find_comment(&state, &ids).await?;
    check_object_permission(&policy, &method, caller.user(), comment.author_id)?;

    state.comment_repository.delete(comment.id).await?;
    info!(comment_id = comment.id, "Comment deleted");

    Ok(StatusCode::NO_CONTENT)
}
