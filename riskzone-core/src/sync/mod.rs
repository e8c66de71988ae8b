//! Real-time zone synchronization
//!
//! The hub actor owns the zone store and fans out events to every connection;
//! `events` defines the push-channel contract and `connection` the
//! per-connection state machine.

pub mod connection;
pub mod errors;
pub mod events;
pub mod hub;

pub use connection::{ConnectionId, ConnectionState, DeliveryFailure};
pub use errors::{SyncError, SyncResult};
pub use events::{ClientRequest, RejectionNotice, ServerEvent};
pub use hub::{HubStats, Subscription, SyncHub, SyncHubHandle};
