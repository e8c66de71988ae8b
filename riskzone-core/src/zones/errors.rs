//! Admission error types

use thiserror::Error;

/// Why a candidate zone was refused admission
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RejectionReason {
    /// Geometry is not a well-formed polygon
    #[error("Malformed geometry: {0}")]
    MalformedGeometry(#[from] GeometryFault),

    /// Risk label is not one of low, medium, high
    #[error("Invalid risk level: {0:?} (expected low, medium or high)")]
    InvalidRiskLevel(String),
}

impl RejectionReason {
    /// Stable, machine-readable code reported to clients
    pub fn code(&self) -> &'static str {
        match self {
            RejectionReason::MalformedGeometry(_) => "malformed_geometry",
            RejectionReason::InvalidRiskLevel(_) => "invalid_risk_level",
        }
    }
}

/// Specific geometry defect found during validation
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryFault {
    #[error("unsupported zone type {0:?}")]
    UnsupportedShape(String),

    #[error("coordinates must be a list of [lat, lng] points")]
    CoordinatesNotList,

    #[error("point {index} is not a [lat, lng] pair")]
    PointNotList { index: usize },

    #[error("point {index} has a non-numeric value")]
    NonNumericCoordinate { index: usize },

    #[error("polygon needs at least {min} points, got {count}")]
    TooFewPoints { count: usize, min: usize },

    #[error("polygon has {count} points, limit is {max}")]
    TooManyPoints { count: usize, max: usize },

    #[error("point {index} has {len} values, expected [lat, lng]")]
    PointArity { index: usize, len: usize },

    #[error("point {index} latitude {value} outside [-90, 90]")]
    LatitudeOutOfRange { index: usize, value: f64 },

    #[error("point {index} longitude {value} outside [-180, 180]")]
    LongitudeOutOfRange { index: usize, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_codes() {
        let err = RejectionReason::from(GeometryFault::TooFewPoints { count: 2, min: 3 });
        assert_eq!(err.code(), "malformed_geometry");
        assert_eq!(
            err.to_string(),
            "Malformed geometry: polygon needs at least 3 points, got 2"
        );

        let err = RejectionReason::InvalidRiskLevel("extreme".to_string());
        assert_eq!(err.code(), "invalid_risk_level");
        assert!(err.to_string().contains("extreme"));
    }
}
