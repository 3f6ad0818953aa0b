//! Stockade Server
//!
//! Multi-tenant shop server with two-step login, session-backed access
//! tokens, and role-gated inventory/order operations.

use std::sync::Arc;

use anyhow::Result;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stockade_server::{
    cache, crypto, routes, AppState, CodeDispatcher, Config, ConsoleDispatcher, SmtpConfig,
    SmtpDispatcher, SqliteRepository,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "stockade_server=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env();
    tracing::info!(port = config.port, database = %config.database_path, "Loaded configuration");

    // Open the repository and seed defaults
    let repo = SqliteRepository::open(&config.database_path)
        .map_err(|e| anyhow::anyhow!("failed to open database: {}", e))?;
    repo.ensure_default_company()
        .map_err(|e| anyhow::anyhow!("failed to seed default company: {}", e))?;
    let admin_hash = crypto::hash_password(&config.default_admin_password)?;
    repo.ensure_default_admin(&config.default_admin_email, &admin_hash)
        .map_err(|e| anyhow::anyhow!("failed to seed default admin: {}", e))?;

    // Connect the session/code cache (falls back to in-process when Redis
    // is unreachable)
    let cache = cache::connect(config.redis_url.as_deref()).await;

    // Pick a code dispatcher: SMTP when configured, console otherwise
    let dispatcher: Box<dyn CodeDispatcher> = match SmtpConfig::from_env() {
        Some(smtp) => Box::new(
            SmtpDispatcher::new(smtp).map_err(|e| anyhow::anyhow!("SMTP setup failed: {}", e))?,
        ),
        None => Box::new(ConsoleDispatcher::new()),
    };

    // Create app state
    let state = Arc::new(AppState::new(&config, repo, cache, dispatcher));

    // Create router
    let app = routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
