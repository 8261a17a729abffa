//! YaMDb content API
//!
//! Serves users, categories, genres, titles, reviews and comments under
//! `/api/v1/`. Callers authenticate with access tokens issued by the
//! authentication service.

pub mod bootstrap;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod permissions;
pub mod repositories;
pub mod routes;
pub mod state;

pub use state::AppState;
