//! Client side of the zone protocol
//!
//! - `view_model`: local reconciled zone list, driven purely by hub events
//! - `remote`: HTTP pull channel and WebSocket push channel
//! - `viewer`: the two combined into a live, self-healing view

pub mod errors;
pub mod remote;
pub mod view_model;
pub mod viewer;

pub use errors::{ClientError, ClientResult};
pub use remote::{ZoneClient, ZoneFeed};
pub use view_model::ClientViewModel;
pub use viewer::ZoneViewer;
