//! Askly - Q&A backend server

use anyhow::Result;
use std::path::Path;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use askly::{
    api::{self, AppState},
    config::Config,
    db,
    services::{Services, TokenIssuer},
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "askly=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting askly...");

    // Load configuration
    let config = Config::load_with_env(Path::new("config.yml"))?;
    tracing::info!("Configuration loaded");

    // Initialize database
    let pool = db::create_pool(&config.database).await?;
    tracing::info!("Database connected: {}", config.database.url);

    // Run migrations
    let applied = db::migrations::run_migrations(&pool).await?;
    tracing::info!("Database migrations completed ({} applied)", applied);

    let issuer = TokenIssuer::from_config(&config.auth)?;
    tracing::info!("Session TTL: {} hours", config.auth.session_ttl_hours);

    let services = Services::new(pool, issuer);

    if let Some(admin) = &config.auth.admin {
        if services.users.ensure_admin(admin).await? {
            tracing::info!("Administrator account created: {}", admin.username);
        }
    }

    // Build router
    let app = api::build_router(AppState::from(services), &config.server.cors_origin);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
