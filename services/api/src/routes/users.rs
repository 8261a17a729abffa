//! `users/` endpoints: admin management and self-service profile

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
};
use common::extract::JsonBody;
use tracing::info;

use super::Params;
use crate::{
    error::{ApiError, ApiResult},
    filters::SearchFilter,
    middleware::{AuthUser, CurrentUser},
    models::{User, UserRequest, UserResponse},
    pagination::{PageNumber, Paginated},
    permissions::{IsAdmin, check_permission},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v1/users/", get(list_users).post(create_user))
        .route("/api/v1/users/me/", get(get_own_profile).patch(update_own_profile))
        .route(
            "/api/v1/users/:username/",
            get(get_user)
                .put(replace_user)
                .patch(update_user)
                .delete(delete_user),
        )
}

async fn find_user(state: &AppState, username: &str) -> ApiResult<User> {
    state
        .user_repository
        .find_by_username(username)
        .await?
        .ok_or_else(ApiError::not_found)
}

/// List users, page-number paginated
pub async fn list_users(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    uri: Uri,
    Query(params): Query<Params>,
) -> ApiResult<Json<Paginated<UserResponse>>> {
    check_permission(&IsAdmin, &method, caller.user())?;

    let page = PageNumber::from_params(&params, &state.pagination)?;
    let filter = SearchFilter::from_params(&params);
    let (users, count) = state
        .user_repository
        .list(&filter, page.limit(), page.offset())
        .await?;

    Ok(Json(page.paginate(&uri, count, users)?.map(UserResponse::from)))
}

/// Create a user with any role
pub async fn create_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    JsonBody(payload): JsonBody<UserRequest>,
) -> ApiResult<Response> {
    check_permission(&IsAdmin, &method, caller.user())?;

    let new_user = payload.validate_new()?;
    let user = state.user_repository.create(&new_user).await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))).into_response())
}

pub async fn get_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<Json<UserResponse>> {
    check_permission(&IsAdmin, &method, caller.user())?;

    let user = find_user(&state, &username).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn replace_user(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<String>,
    payload: JsonBody<UserRequest>,
) -> ApiResult<Json<UserResponse>> {
    apply_user_update(state, method, caller, path, payload, false).await
}

pub async fn update_user(
    state: State<AppState>,
    method: Method,
    caller: CurrentUser,
    path: Path<String>,
    payload: JsonBody<UserRequest>,
) -> ApiResult<Json<UserResponse>> {
    apply_user_update(state, method, caller, path, payload, true).await
}

async fn apply_user_update(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(username): Path<String>,
    JsonBody(payload): JsonBody<UserRequest>,
    partial: bool,
) -> ApiResult<Json<UserResponse>> {
    check_permission(&IsAdmin, &method, caller.user())?;

    let user = find_user(&state, &username).await?;
    let changes = payload.validate_changes(partial)?;
    let updated = state
        .user_repository
        .update(user.id, &changes)
        .await?
        .ok_or_else(ApiError::not_found)?;

    info!(user_id = updated.id, "User updated");
    Ok(Json(UserResponse::from(updated)))
}

/// Delete a user; their reviews and comments go with them
pub async fn delete_user(
    State(state): State<AppState>,
    method: Method,
    caller: CurrentUser,
    Path(username): Path<String>,
) -> ApiResult<StatusCode> {
    check_permission(&IsAdmin, &method, caller.user())?;

    let user = find_user(&state, &username).await?;
    state.user_repository.delete(user.id).await?;
    info!(user_id = user.id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// The caller's own profile
pub async fn get_own_profile(AuthUser(user): AuthUser) -> Json<UserResponse> {
    Json(UserResponse::from(user))
}

/// Partially update the caller's own profile
///
/// The role is never changed through this endpoint, whatever the payload
/// says.
pub async fn update_own_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    JsonBody(payload): JsonBody<UserRequest>,
) -> ApiResult<Json<UserResponse>> {
    let mut changes = payload.validate_changes(true)?;
    changes.role = None;

    let updated = state
        .user_repository
        .update(user.id, &changes)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(UserResponse::from(updated)))
}
