//! Helpers shared by the API integration tests

#![allow(dead_code)]

use api::{AppState, pagination::PaginationConfig, routes};
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header::AUTHORIZATION, header::CONTENT_TYPE},
};
use common::jwt::{JwtConfig, JwtService};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "api-test-secret";

pub fn jwt_service() -> JwtService {
    JwtService::new(JwtConfig {
        secret: JWT_SECRET.to_string(),
        access_token_expiry: 3600,
    })
}

pub fn build_app(pool: PgPool) -> Router {
    build_app_with(pool, PaginationConfig::default())
}

pub fn build_app_with(pool: PgPool, pagination: PaginationConfig) -> Router {
    routes::create_router(AppState::new(pool, jwt_service(), pagination))
}

/// Insert a user directly and return `(id, access token)`
pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> (i64, String) {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO users (username, email, role) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(username)
    .bind(format!("{username}@example.com"))
    .bind(role)
    .fetch_one(pool)
    .await
    .unwrap();

    let token = jwt_service().generate_access_token(id).unwrap();
    (id, token)
}

pub async fn create_taxon(pool: &PgPool, table: &str, name: &str, slug: &str) -> i64 {
    sqlx::query_scalar(&format!(
        "INSERT INTO {table} (name, slug) VALUES ($1, $2) RETURNING id"
    ))
    .bind(name)
    .bind(slug)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Insert a title in `category_id` linked to `genre_ids`
pub async fn create_title(
    pool: &PgPool,
    name: &str,
    year: i32,
    category_id: Option<i64>,
    genre_ids: &[i64],
) -> i64 {
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO titles (name, year, category_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(name)
    .bind(year)
    .bind(category_id)
    .fetch_one(pool)
    .await
    .unwrap();

    for genre_id in genre_ids {
        sqlx::query("INSERT INTO titles_genres (title_id, genre_id) VALUES ($1, $2)")
            .bind(id)
            .bind(genre_id)
            .execute(pool)
            .await
            .unwrap();
    }
    id
}

pub async fn create_review(pool: &PgPool, title_id: i64, author_id: i64, score: i16) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO reviews (title_id, author_id, text, score) VALUES ($1, $2, 'Review', $3) RETURNING id",
    )
    .bind(title_id)
    .bind(author_id)
    .bind(score)
    .fetch_one(pool)
    .await
    .unwrap()
}

pub async fn create_comment(pool: &PgPool, review_id: i64, author_id: i64, text: &str) -> i64 {
    sqlx::query_scalar(
        "INSERT INTO comments (review_id, author_id, text) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(review_id)
    .bind(author_id)
    .bind(text)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Send one request through `app` and decode the JSON body (`Null` if empty)
pub async fn send(
    app: Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
