//! Authentication service routes

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use common::extract::JsonBody;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::{
    AppState,
    error::{AuthError, AuthResult},
    mailer::OutgoingEmail,
    models::{SignUpRequest, SignUpResponse, TokenRequest, TokenResponse, User},
};

/// Create the router for the authentication service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/v1/auth/signup/", post(signup))
        .route("/api/v1/auth/token/", post(get_token))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = common::database::health_check(&state.db_pool)
        .await
        .unwrap_or(false);

    Json(serde_json::json!({
        "status": if database { "ok" } else { "degraded" },
        "service": "auth-service",
        "database": database,
    }))
}

/// Registration endpoint
///
/// A username that is already taken triggers a fresh confirmation code for
/// that account and answers 400 with the submitted payload.
pub async fn signup(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> AuthResult<Response> {
    if let Some(username) = payload.username.as_deref() {
        if let Some(existing) = state.user_repository.find_by_username(username).await? {
            info!(username, "Signup for existing username, resending confirmation code");

            if state.rate_limiter.is_allowed(&existing.username).await {
                send_confirmation_code(&state, &existing).await;
            }

            return Ok((StatusCode::BAD_REQUEST, Json(payload)).into_response());
        }
    }

    let new_user = payload.validate()?;
    let user = state.user_repository.create(&new_user).await?;
    info!(user_id = user.id, username = %user.username, "User registered");

    send_confirmation_code(&state, &user).await;

    Ok((StatusCode::OK, Json(SignUpResponse::from(user))).into_response())
}

/// Exchange a confirmation code for an access token
pub async fn get_token(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<TokenRequest>,
) -> AuthResult<Json<TokenResponse>> {
    let (username, code) = payload.validate()?;

    let user = state
        .user_repository
        .find_by_username(&username)
        .await?
        .ok_or_else(|| AuthError::NotFound("User not found".to_string()))?;

    if !state.confirmation_codes.check_code(&user, &code) {
        warn!(username = %user.username, "Invalid confirmation code");
        return Err(AuthError::Validation(
            common::validation::FieldErrors::single(
                "confirmation_code",
                "Invalid or expired confirmation code.",
            ),
        ));
    }

    let token = state
        .jwt_service
        .generate_access_token(user.id)
        .map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthError::InternalServerError
        })?;

    state.user_repository.record_login(user.id, Utc::now()).await?;
    info!(user_id = user.id, "Access token issued");

    Ok(Json(TokenResponse { token }))
}

/// Email a confirmation code; delivery failures are logged and swallowed
async fn send_confirmation_code(state: &AppState, user: &User) {
    let code = state.confirmation_codes.make_code(user);
    let email = OutgoingEmail::confirmation_code(&user.email, &code);

    if let Err(e) = state.mailer.send(&email).await {
        warn!(user_id = user.id, "Failed to send confirmation code: {}", e);
    }
}
