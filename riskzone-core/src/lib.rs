//! RiskZone core
//!
//! Shared risk-zone map kept consistent across every connected client. The
//! `sync` hub owns the zone store and is the only writer; HTTP and WebSocket
//! surfaces in `server` talk to it through a handle, and the `client` module
//! mirrors its state on the viewer side.

pub mod client;
pub mod config;
pub mod health;
pub mod logging;
pub mod metrics;
pub mod server;
pub mod shutdown;
pub mod sync;
pub mod test_utils;
pub mod zones;

pub use config::Config;
pub use logging::{init_logging, LogLevel};
pub use sync::{SyncHub, SyncHubHandle};
pub use zones::{RiskLevel, Zone, ZoneCandidate};
