//! API route definitions.

use axum::Router;

use crate::AppState;

pub mod health;
pub mod trial_balance;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(trial_balance::routes())
}
