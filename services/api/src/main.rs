use anyhow::Result;
use api::{AppState, bootstrap::AdminConfig, pagination::PaginationConfig, routes};
use common::{
    config::ServerConfig,
    database::{self, DatabaseConfig},
    jwt::{JwtConfig, JwtService},
};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    common::telemetry::init_tracing()?;

    info!("Starting API service");

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

    let jwt_service = JwtService::new(JwtConfig::from_env()?);
    let pagination = PaginationConfig::from_env();
    info!(
        users_page_size = pagination.users_page_size,
        default_limit = pagination.default_limit,
        "Pagination configured"
    );

    let app_state = AppState::new(pool, jwt_service, pagination);

    if let Some(admin) = AdminConfig::from_env()? {
        admin.apply(&app_state.user_repository).await?;
    }

    info!("API service initialized successfully");

    // Start the web server
    let app = routes::create_router(app_state);

    let server_config = ServerConfig::from_env("API", 3001)?;
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("API service listening on {}", server_config.address());

    axum::serve(listener, app).await?;

    Ok(())
}
