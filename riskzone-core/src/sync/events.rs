//! Push-channel event contract
//!
//! Every frame is an adjacently tagged JSON object:
//! `{"event": "<name>", "data": <payload>}`. Payload-free events omit `data`.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::zones::{AlertMessage, RejectionReason, Zone, ZoneCandidate};

/// Events sent from the hub to connected clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    /// A zone was admitted
    NewZone(Zone),
    /// Full replacement of the client's zone list
    UpdateZones(Vec<Zone>),
    /// Store was cleared; clients drop every zone
    ResetZones,
    /// A high-risk zone was admitted
    HighRiskAlert(AlertMessage),
    /// The connection's own submission was refused. Never broadcast.
    ZoneRejected(RejectionNotice),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::NewZone(_) => "new_zone",
            ServerEvent::UpdateZones(_) => "update_zones",
            ServerEvent::ResetZones => "reset_zones",
            ServerEvent::HighRiskAlert(_) => "high_risk_alert",
            ServerEvent::ZoneRejected(_) => "zone_rejected",
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Rejection as reported to the submitting client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectionNotice {
    pub reason: String,
    pub message: String,
}

impl From<&RejectionReason> for RejectionNotice {
    fn from(reason: &RejectionReason) -> Self {
        Self {
            reason: reason.code().to_string(),
            message: reason.to_string(),
        }
    }
}

const SUBMIT_ZONE: &str = "submit_zone";

/// Requests a client may send over its WebSocket connection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ClientRequest {
    SubmitZone(ZoneCandidate),
    RequestSnapshot,
    ResetZones,
}

impl ClientRequest {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// A `submit_zone` envelope always decodes, even with a missing or
    /// unusable payload, so the submitter still gets a `zone_rejected` back.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        let envelope: Value = serde_json::from_str(text)?;
        if envelope.get("event").and_then(Value::as_str) == Some(SUBMIT_ZONE) {
            let data = envelope.get("data").cloned().unwrap_or_default();
            return Ok(ClientRequest::SubmitZone(ZoneCandidate::from(data)));
        }
        serde_json::from_value(envelope)
    }
}
