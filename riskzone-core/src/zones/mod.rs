//! Zone domain: data model, admission rules, alerting and the authoritative store.

pub mod alert;
pub mod errors;
pub mod model;
pub mod store;
pub mod validator;

pub use alert::{AlertEvaluator, AlertMessage, DEFAULT_HIGH_RISK_MESSAGE};
pub use errors::{GeometryFault, RejectionReason};
pub use model::{
    AcceptedZone, LatLng, RiskLevel, RiskSummary, Zone, ZoneCandidate, ZoneId, ZoneShape,
};
pub use store::ZoneStore;
pub use validator::{ZoneValidator, DEFAULT_MAX_POLYGON_POINTS, MIN_POLYGON_POINTS};
