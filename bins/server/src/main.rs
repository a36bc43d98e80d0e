//! Trialcheck API Server
//!
//! Main entry point for the trial balance validation service.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trialcheck_api::{AppState, create_router};
use trialcheck_core::storage::{OperatorStore, StorageProvider};
use trialcheck_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "trialcheck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("failed to load configuration")?;

    // Open result storage
    let provider = StorageProvider::from_settings(&config.storage)?;
    let store = OperatorStore::from_provider(&provider)?;
    info!(provider = store.provider_name(), "Storage configured");

    // Create application state
    let state = AppState::new(Arc::new(store), config.upload.max_bytes);

    // Create router
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
