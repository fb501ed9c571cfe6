//! API routes.

pub mod health;
pub mod jobs;

use axum::Router;

use crate::AppState;

/// Build the main API router. Job routes are bearer-authenticated; health is
/// open.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(jobs::router(state.clone()))
        .merge(health::router())
        .with_state(state)
}
