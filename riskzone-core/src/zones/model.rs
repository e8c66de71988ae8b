/*
    model.rs - Zone data model

    Defines:
    - ZoneId (server-assigned, immutable)
    - RiskLevel (closed enum, lowercase on the wire)
    - LatLng points and the stored Zone record
    - ZoneCandidate (raw client input) and AcceptedZone (validated, not yet stored)
    - RiskSummary tallies
*/

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;

use super::errors::RejectionReason;

/// Unique identifier for a stored zone
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ZoneId(pub String);

impl ZoneId {
    pub fn generate() -> Self {
        ZoneId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Geometry kind of a zone. Only polygons are admitted today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneShape {
    #[default]
    Polygon,
}

impl ZoneShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneShape::Polygon => "polygon",
        }
    }
}

/// Risk classification attached to a zone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = RejectionReason;

    /// Case-insensitive; anything outside the three labels is rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            _ => Err(RejectionReason::InvalidRiskLevel(s.to_string())),
        }
    }
}

/// A single `[latitude, longitude]` point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng(pub f64, pub f64);

/// An admitted zone as stored by the hub and broadcast to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    pub id: ZoneId,
    #[serde(rename = "type")]
    pub shape: ZoneShape,
    /// Implicitly closed ring; the last point connects back to the first.
    pub coordinates: Vec<LatLng>,
    pub risk: RiskLevel,
    pub created_at: DateTime<Utc>,
}

/// Zone proposal as submitted by a client, before admission
///
/// Fields are kept as raw JSON so that any object decodes and every type
/// fault is reported by the validator with a reason code. A body that is not
/// an object decodes to an empty candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct ZoneCandidate {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub shape: Option<Value>,
    pub coordinates: Value,
    pub risk: Value,
}

impl ZoneCandidate {
    pub fn polygon(points: &[(f64, f64)], risk: impl Into<String>) -> Self {
        Self {
            shape: Some(Value::from(ZoneShape::Polygon.as_str())),
            coordinates: points.iter().map(|(lat, lng)| json!([lat, lng])).collect(),
            risk: Value::String(risk.into()),
        }
    }
}

impl From<Value> for ZoneCandidate {
    fn from(value: Value) -> Self {
        let mut fields = match value {
            Value::Object(fields) => fields,
            _ => return Self::default(),
        };

        Self {
            shape: fields.remove("type"),
            coordinates: fields.remove("coordinates").unwrap_or_default(),
            risk: fields.remove("risk").unwrap_or_default(),
        }
    }
}

/// Output of a successful validation: normalized geometry and risk, no identity yet
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedZone {
    pub shape: ZoneShape,
    pub coordinates: Vec<LatLng>,
    pub risk: RiskLevel,
}

/// Per-level zone counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl RiskSummary {
    pub fn tally<'a>(zones: impl IntoIterator<Item = &'a Zone>) -> Self {
        let mut summary = RiskSummary::default();
        for zone in zones {
            match zone.risk {
                RiskLevel::Low => summary.low += 1,
                RiskLevel::Medium => summary.medium += 1,
                RiskLevel::High => summary.high += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.low + self.medium + self.high
    }
}
