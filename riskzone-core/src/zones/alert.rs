//! High-risk alert derivation

use serde::{Deserialize, Serialize};

use super::model::{RiskLevel, Zone};

/// Banner text broadcast when a high-risk zone is admitted
pub const DEFAULT_HIGH_RISK_MESSAGE: &str = "⚠️ High Risk Zone Added!";

/// Fire-and-forget alert payload. Carries no zone reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertMessage {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    message: String,
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        Self::new(DEFAULT_HIGH_RISK_MESSAGE)
    }
}

impl AlertEvaluator {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns an alert iff the zone is high risk
    pub fn evaluate(&self, zone: &Zone) -> Option<AlertMessage> {
        (zone.risk == RiskLevel::High).then(|| AlertMessage {
            message: self.message.clone(),
        })
    }
}
