//! Request extractors shared by the services

use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::json;

/// JSON request body whose rejection is always a `400 Bad Request`
///
/// Axum's own [`Json`] answers some malformed bodies with 415 or 422; the
/// API contract reports every unreadable payload as a client error.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

/// Rejection produced by [`JsonBody`]
#[derive(Debug)]
pub struct JsonBodyRejection(pub String);

impl IntoResponse for JsonBodyRejection {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "error": self.0,
        }));

        (StatusCode::BAD_REQUEST, body).into_response()
    }
}

impl From<JsonRejection> for JsonBodyRejection {
    fn from(rejection: JsonRejection) -> Self {
        Self(rejection.body_text())
    }
}

#[axum::async_trait]
impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonBodyRejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}
