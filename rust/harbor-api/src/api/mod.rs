//! HTTP API endpoints.

pub mod entities;
pub mod health;
pub mod library;
pub mod speech;

use axum::Router;

use crate::AppState;

/// Create the API router.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(entities::router())
        .merge(library::router())
        .merge(speech::router())
}
