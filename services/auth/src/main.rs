use std::sync::Arc;

use anyhow::Result;
use auth::{
    AppState,
    confirmation::{ConfirmationCodes, ConfirmationConfig},
    mailer::{LogMailer, Mailer, SmtpConfig, SmtpMailer},
    rate_limiter::{RateLimiter, RateLimiterConfig},
    repositories::UserRepository,
    routes,
};
use common::{
    config::ServerConfig,
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    common::telemetry::init_tracing()?;

    info!("Starting authentication service");

    // Initialize database connection pool
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;

    // Check database connectivity
    if database::health_check(&pool).await? {
        info!("Database connection successful");
    } else {
        anyhow::bail!("Failed to connect to database");
    }

    database::run_migrations(&pool).await?;

    // Initialize JWT service
    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let confirmation_codes = ConfirmationCodes::new(ConfirmationConfig::from_env()?)?;

    let mailer: Arc<dyn Mailer> = match SmtpConfig::from_env() {
        Some(config) => {
            info!(host = %config.host, port = config.port, "SMTP delivery enabled");
            Arc::new(SmtpMailer::new(config)?)
        }
        None => {
            warn!("SMTP_HOST not set, confirmation codes will only be logged");
            Arc::new(LogMailer)
        }
    };

    let rate_limiter = RateLimiter::new(RateLimiterConfig::from_env());
    info!(
        max_attempts = rate_limiter.config().max_attempts,
        window_seconds = rate_limiter.config().window_seconds,
        "Signup resend limit configured"
    );

    let app_state = AppState {
        user_repository: UserRepository::new(pool.clone()),
        db_pool: pool,
        jwt_service,
        confirmation_codes,
        mailer,
        rate_limiter,
    };

    info!("Authentication service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::from_env("AUTH", 3000)?;
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Authentication service listening on {}", server_config.address());

    axum::serve(listener, app).await?;

    Ok(())
}
