//! Common library for the YaMDb services
//!
//! This crate provides shared functionality used by the auth and API
//! services: database connectivity and migrations, error handling, JWT
//! tokens, user roles, input validation and server bootstrap helpers.
//!
//! ```rust,no_run
//! use common::database::{DatabaseConfig, health_check, init_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env()?;
//!     let pool = init_pool(&config).await?;
//!     run_migrations(&pool).await?;
//!     let is_healthy = health_check(&pool).await?;
//!     println!("Database health check: {}", is_healthy);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod database;
pub mod error;
pub mod extract;
pub mod jwt;
pub mod role;
pub mod telemetry;
pub mod validation;

pub use role::Role;
