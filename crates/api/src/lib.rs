//! HTTP API layer with Axum routes.
//!
//! This crate provides:
//! - REST API routes
//! - Error responses

pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use trialcheck_core::storage::OperatorStore;
use trialcheck_core::trial_balance::TrialBalanceService;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Trial balance upload and lookup.
    pub trial_balance: Arc<TrialBalanceService<OperatorStore>>,
    /// Maximum accepted request body in bytes.
    pub max_upload_bytes: usize,
    /// Name of the configured storage backend.
    pub storage_provider: &'static str,
}

impl AppState {
    /// Creates state around a store.
    #[must_use]
    pub fn new(store: Arc<OperatorStore>, max_upload_bytes: usize) -> Self {
        Self {
            storage_provider: store.provider_name(),
            trial_balance: Arc::new(TrialBalanceService::new(store)),
            max_upload_bytes,
        }
    }
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(routes::api_routes())
        .layer(DefaultBodyLimit::max(state.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
