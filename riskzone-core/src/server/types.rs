//! Request/Response types for the HTTP surface

use serde::{Deserialize, Serialize};

/// Body of every 4xx/5xx produced by the zone endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description
    pub error: String,
    /// Stable reason code, e.g. `malformed_geometry`
    pub reason: String,
}

/// Body of `DELETE /zones`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetResponse {
    pub cleared: usize,
}
