//! Request authentication
//!
//! Tokens only carry the user id. The user and its role are loaded from the
//! database on every request, so a role change or a deleted account takes
//! effect immediately.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::{error, warn};

use crate::{error::ApiError, models::User, state::AppState};

/// Caller identity, `None` for anonymous requests
///
/// A request without an `Authorization` header is anonymous. A header that
/// is present but does not carry a valid token for an existing user is
/// rejected with 401 on every route.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn user(&self) -> Option<&User> {
        self.0.as_ref()
    }
}

/// Authenticated caller; anonymous requests are rejected with 401
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(header) = parts.headers.get(AUTHORIZATION) else {
            return Ok(CurrentUser(None));
        };

        let token = header
            .to_str()
            .ok()
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                ApiError::Unauthorized(
                    "Invalid Authorization header. Expected: Bearer <token>".to_string(),
                )
            })?;

        let claims = state.jwt_service.validate_token(token).map_err(|e| {
            warn!("Rejected access token: {}", e);
            ApiError::Unauthorized("Given token not valid for any token type".to_string())
        })?;

        let user = state
            .user_repository
            .find_by_id(claims.sub)
            .await
            .map_err(|e| {
                error!("Failed to load token user: {}", e);
                ApiError::InternalServerError
            })?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Ok(CurrentUser(Some(user)))
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, state).await? {
            CurrentUser(Some(user)) => Ok(AuthUser(user)),
            CurrentUser(None) => Err(ApiError::Unauthorized(
                "Authentication credentials were not provided.".to_string(),
            )),
        }
    }
}
