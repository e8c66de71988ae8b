//! HTTP and WebSocket surface
//!
//! - `GET/POST/DELETE /zones`: pull channel
//! - `GET /ws`: push channel
//! - `GET /health`

pub mod api;
pub mod handlers;
pub mod server;
pub mod state;
pub mod types;
pub mod ws;

pub use api::build_router;
pub use handlers::ApiError;
pub use server::{start_server, ZoneServer};
pub use state::AppState;
pub use types::{ErrorResponse, ResetResponse};
