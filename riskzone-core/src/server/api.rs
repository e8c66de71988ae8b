//! API routes definition

use super::handlers;
use super::state::AppState;
use super::ws;
use axum::{routing::get, Router};
use std::sync::Arc;

/// Build the API router with all endpoints
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pull channel
        .route(
            "/zones",
            get(handlers::list_zones)
                .post(handlers::create_zone)
                .delete(handlers::reset_zones),
        )
        // Push channel
        .route("/ws", get(ws::ws_handler))
        .route("/health", get(handlers::health))
        .with_state(state)
}
