//! Application state shared across handlers

use common::jwt::JwtService;
use sqlx::PgPool;

use crate::{
    models::TaxonomyKind,
    pagination::PaginationConfig,
    repositories::{
        CommentRepository, ReviewRepository, TaxonomyRepository, TitleRepository, UserRepository,
    },
};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub jwt_service: JwtService,
    pub pagination: PaginationConfig,
    pub user_repository: UserRepository,
    pub category_repository: TaxonomyRepository,
    pub genre_repository: TaxonomyRepository,
    pub title_repository: TitleRepository,
    pub review_repository: ReviewRepository,
    pub comment_repository: CommentRepository,
}

impl AppState {
    /// Wire every repository to `pool`
    pub fn new(pool: PgPool, jwt_service: JwtService, pagination: PaginationConfig) -> Self {
        Self {
            user_repository: UserRepository::new(pool.clone()),
            category_repository: TaxonomyRepository::new(pool.clone(), TaxonomyKind::Category),
            genre_repository: TaxonomyRepository::new(pool.clone(), TaxonomyKind::Genre),
            title_repository: TitleRepository::new(pool.clone()),
            review_repository: ReviewRepository::new(pool.clone()),
            comment_repository: CommentRepository::new(pool.clone()),
            db_pool: pool,
            jwt_service,
            pagination,
        }
    }
}
