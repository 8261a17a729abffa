//! YaMDb authentication service
//!
//! Registers users through emailed confirmation codes and exchanges those
//! codes for access tokens.

pub mod confirmation;
pub mod error;
pub mod mailer;
pub mod models;
pub mod rate_limiter;
pub mod repositories;
pub mod routes;

use std::sync::Arc;

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::{
    confirmation::ConfirmationCodes, mailer::Mailer, rate_limiter::RateLimiter,
    repositories::UserRepository,
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub confirmation_codes: ConfirmationCodes,
    pub mailer: Arc<dyn Mailer>,
    pub user_repository: UserRepository,
    pub rate_limiter: RateLimiter,
}
