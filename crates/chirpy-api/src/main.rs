//! Chirpy API Server

use anyhow::Context;
use chirpy_api::{create_router, state::AppState};
use chirpy_core::config::{AppConfig, LoggingConfig};
use chirpy_core::PgStore;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));

    let registry = tracing_subscriber::registry().with(filter);
    if logging.json_format {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }
}

fn load_config() -> anyhow::Result<AppConfig> {
    let config = match std::env::var("CHIRPY_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)
            .with_context(|| format!("Failed to load config file {path}"))?
            .with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };
    config.validate()?;
    Ok(config)
}

async fn build_state(config: AppConfig) -> anyhow::Result<AppState> {
    let Some(url) = config.database.url.clone() else {
        tracing::warn!("No database URL configured, using the in-memory store");
        return Ok(AppState::in_memory(config));
    };

    let store = PgStore::new(&url, config.database.max_connections)
        .await
        .context("Failed to connect to PostgreSQL")?;
    store
        .init_schema()
        .await
        .context("Failed to apply database schema")?;
    tracing::info!("Connected to PostgreSQL");

    let store = Arc::new(store);
    Ok(AppState::new(config, store.clone(), store.clone(), store))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    let config = load_config()?;
    init_tracing(&config.logging);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        platform = ?config.server.platform,
        file_root = %config.server.file_root.display(),
        "Configuration loaded"
    );

    let state = Arc::new(build_state(config).await?);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Chirpy API Server starting on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui/", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
