//! Shared state for request handlers

use std::sync::Arc;

use crate::health::HealthChecker;
use crate::sync::SyncHubHandle;

/// Component name the hub reports health under
pub const HUB_COMPONENT: &str = "sync_hub";

/// Server state shared across requests
#[derive(Clone)]
pub struct AppState {
    /// Only path to the zone store
    pub hub: SyncHubHandle,

    pub health: Arc<HealthChecker>,

    /// Used to grade hub health by connection load
    pub max_connections: usize,
}

impl AppState {
    pub fn new(hub: SyncHubHandle, max_connections: usize) -> Self {
        Self {
            hub,
            health: Arc::new(HealthChecker::new(env!("CARGO_PKG_VERSION"))),
            max_connections,
        }
    }
}
