//! Test fixtures for zones and candidates
//!
//! Coordinates sit on the event venue used throughout the tests.

use crate::zones::ZoneCandidate;

/// Venue landmark: stage area
pub const STAGE_AREA: (f64, f64) = (6.9152, 79.9725);

/// Venue landmark: main gate
pub const MAIN_GATE: (f64, f64) = (6.9137, 79.9716);

/// Four-point polygon around the lecture halls
pub fn square() -> Vec<(f64, f64)> {
    vec![
        (6.9147, 79.9721),
        (6.9152, 79.9721),
        (6.9152, 79.9725),
        (6.9147, 79.9725),
    ]
}

/// Triangle spanning gate, stage and food court
pub fn triangle() -> Vec<(f64, f64)> {
    vec![MAIN_GATE, STAGE_AREA, (6.9149, 79.9718)]
}

/// Build a polygon candidate from `(lat, lng)` pairs
pub fn candidate(points: &[(f64, f64)], risk: &str) -> ZoneCandidate {
    ZoneCandidate::polygon(points, risk)
}
