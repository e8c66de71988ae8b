//! Metrics names and descriptions for the `metrics` facade
//!
//! Nothing here installs a recorder; the embedding binary decides where
//! metrics go. Without a recorder every macro is a no-op.

use metrics::{counter, describe_counter, describe_gauge, gauge};

pub const ZONES_ADMITTED: &str = "zones.admitted";
pub const ZONES_REJECTED: &str = "zones.rejected";
pub const ZONES_RESETS: &str = "zones.resets";
pub const ZONES_STORED: &str = "zones.stored";
pub const ALERTS_HIGH_RISK: &str = "alerts.high_risk";
pub const HUB_CONNECTIONS: &str = "hub.connections";
pub const HUB_DELIVERY_FAILURES: &str = "hub.delivery_failures";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(ZONES_ADMITTED, "Zones that passed validation and were stored");
    describe_counter!(ZONES_REJECTED, "Zone submissions refused, labelled by reason");
    describe_counter!(ZONES_RESETS, "Full zone store resets");
    describe_gauge!(ZONES_STORED, "Zones currently held in the store");
    describe_counter!(ALERTS_HIGH_RISK, "High-risk alerts broadcast");
    describe_gauge!(HUB_CONNECTIONS, "Live push-channel connections");
    describe_counter!(
        HUB_DELIVERY_FAILURES,
        "Connections dropped because an event could not be queued"
    );
}

/// Record a counter metric
pub fn record_counter(name: &'static str, value: u64) {
    counter!(name).increment(value);
}

/// Record a gauge metric
pub fn record_gauge(name: &'static str, value: f64) {
    gauge!(name).set(value);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder_is_noop() {
        init_metrics();
        record_counter(ZONES_ADMITTED, 1);
        record_gauge(HUB_CONNECTIONS, 3.0);
    }
}
