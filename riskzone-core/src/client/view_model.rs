//! Client-side reconciled view
//!
//! Render-only mirror of the hub's zone list. It trusts the hub completely and
//! changes only in response to server events.

use crate::sync::{RejectionNotice, ServerEvent};
use crate::zones::{RiskSummary, Zone};

#[derive(Debug, Clone, Default)]
pub struct ClientViewModel {
    zones: Vec<Zone>,
    alert: Option<String>,
    last_rejection: Option<RejectionNotice>,
    synced: bool,
}

impl ClientViewModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reconcile one hub event into the local view
    pub fn apply(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::NewZone(zone) => self.zones.push(zone),
            ServerEvent::UpdateZones(zones) => {
                self.zones = zones;
                self.synced = true;
            }
            ServerEvent::ResetZones => self.zones.clear(),
            ServerEvent::HighRiskAlert(alert) => self.alert = Some(alert.message),
            ServerEvent::ZoneRejected(notice) => self.last_rejection = Some(notice),
        }
    }

    /// Same as an `update_zones` event; used with pull-channel snapshots
    pub fn replace(&mut self, zones: Vec<Zone>) {
        self.apply(ServerEvent::UpdateZones(zones));
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn is_synced(&self) -> bool {
        self.synced
    }

    pub fn risk_summary(&self) -> RiskSummary {
        RiskSummary::tally(&self.zones)
    }

    /// Current alert banner, if any
    pub fn alert(&self) -> Option<&str> {
        self.alert.as_deref()
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn last_rejection(&self) -> Option<&RejectionNotice> {
        self.last_rejection.as_ref()
    }
}
