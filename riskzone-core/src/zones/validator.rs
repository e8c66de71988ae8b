//! Zone admission control
//!
//! Checks run in a fixed order and stop at the first failure: geometry first,
//! then the risk label. A rejected candidate never reaches the store.

use serde_json::Value;

use super::errors::{GeometryFault, RejectionReason};
use super::model::{AcceptedZone, LatLng, RiskLevel, ZoneCandidate, ZoneShape};

/// Minimum number of vertices for a polygon ring
pub const MIN_POLYGON_POINTS: usize = 3;

/// Default upper bound on polygon vertices
pub const DEFAULT_MAX_POLYGON_POINTS: usize = 10_000;

/// Validates candidate zones before they are admitted
#[derive(Debug, Clone)]
pub struct ZoneValidator {
    max_points: usize,
}

impl Default for ZoneValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_POLYGON_POINTS)
    }
}

impl ZoneValidator {
    pub fn new(max_points: usize) -> Self {
        Self {
            max_points: max_points.max(MIN_POLYGON_POINTS),
        }
    }

    pub fn validate(&self, candidate: &ZoneCandidate) -> Result<AcceptedZone, RejectionReason> {
        let shape = self.check_shape(candidate.shape.as_ref())?;
        let coordinates = self.check_geometry(&candidate.coordinates)?;
        let risk = self.check_risk(&candidate.risk)?;

        Ok(AcceptedZone {
            shape,
            coordinates,
            risk,
        })
    }

    fn check_shape(&self, shape: Option<&Value>) -> Result<ZoneShape, GeometryFault> {
        match shape {
            None | Some(Value::Null) => Ok(ZoneShape::Polygon),
            Some(Value::String(s)) if s.eq_ignore_ascii_case(ZoneShape::Polygon.as_str()) => {
                Ok(ZoneShape::Polygon)
            }
            Some(Value::String(other)) => Err(GeometryFault::UnsupportedShape(other.clone())),
            Some(other) => Err(GeometryFault::UnsupportedShape(other.to_string())),
        }
    }

    /// Non-string labels are reported by their JSON text
    fn check_risk(&self, risk: &Value) -> Result<RiskLevel, RejectionReason> {
        match risk {
            Value::String(label) => label.parse(),
            other => Err(RejectionReason::InvalidRiskLevel(other.to_string())),
        }
    }

    fn check_geometry(&self, coordinates: &Value) -> Result<Vec<LatLng>, GeometryFault> {
        let points = coordinates
            .as_array()
            .ok_or(GeometryFault::CoordinatesNotList)?;

        if points.len() < MIN_POLYGON_POINTS {
            return Err(GeometryFault::TooFewPoints {
                count: points.len(),
                min: MIN_POLYGON_POINTS,
            });
        }
        if points.len() > self.max_points {
            return Err(GeometryFault::TooManyPoints {
                count: points.len(),
                max: self.max_points,
            });
        }

        points
            .iter()
            .enumerate()
            .map(|(index, point)| {
                let values = point
                    .as_array()
                    .ok_or(GeometryFault::PointNotList { index })?;
                let (lat, lng) = match values.as_slice() {
                    [lat, lng] => (lat.as_f64(), lng.as_f64()),
                    _ => {
                        return Err(GeometryFault::PointArity {
                            index,
                            len: values.len(),
                        })
                    }
                };
                let (Some(lat), Some(lng)) = (lat, lng) else {
                    return Err(GeometryFault::NonNumericCoordinate { index });
                };

                if !(-90.0..=90.0).contains(&lat) {
                    return Err(GeometryFault::LatitudeOutOfRange { index, value: lat });
                }
                if !(-180.0..=180.0).contains(&lng) {
                    return Err(GeometryFault::LongitudeOutOfRange { index, value: lng });
                }
                Ok(LatLng(lat, lng))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn square() -> Vec<(f64, f64)> {
        vec![(6.9147, 79.9721), (6.9152, 79.9721), (6.9152, 79.9725), (6.9147, 79.9725)]
    }

    #[test]
    fn test_accepts_valid_polygon() {
        let validator = ZoneValidator::default();
        let accepted = validator
            .validate(&ZoneCandidate::polygon(&square(), "high"))
            .unwrap();

        assert_eq!(accepted.shape, ZoneShape::Polygon);
        assert_eq!(accepted.coordinates.len(), 4);
        assert_eq!(accepted.coordinates[0], LatLng(6.9147, 79.9721));
        assert_eq!(accepted.risk, RiskLevel::High);
    }

    #[test]
    fn test_normalizes_risk_case() {
        let validator = ZoneValidator::default();
        let accepted = validator
            .validate(&ZoneCandidate::polygon(&square(), "MeDiUm"))
            .unwrap();
        assert_eq!(accepted.risk, RiskLevel::Medium);
    }

    #[test]
    fn test_rejects_two_points() {
        let validator = ZoneValidator::default();
        let err = validator
            .validate(&ZoneCandidate::polygon(&[(6.9, 79.9), (6.91, 79.91)], "low"))
            .unwrap_err();

        assert_eq!(
            err,
            RejectionReason::MalformedGeometry(GeometryFault::TooFewPoints { count: 2, min: 3 })
        );
    }

    #[test]
    fn test_rejects_unknown_risk() {
        let validator = ZoneValidator::default();
        let err = validator
            .validate(&ZoneCandidate::polygon(&square()[..3], "extreme"))
            .unwrap_err();
        assert_eq!(err, RejectionReason::InvalidRiskLevel("extreme".to_string()));
    }

    #[test]
    fn test_geometry_checked_before_risk() {
        let validator = ZoneValidator::default();
        let err = validator
            .validate(&ZoneCandidate::polygon(&[(6.9, 79.9)], "extreme"))
            .unwrap_err();
        assert!(matches!(err, RejectionReason::MalformedGeometry(_)));
    }

    #[test]
    fn test_rejects_out_of_range_points() {
        let validator = ZoneValidator::default();

        let err = validator
            .validate(&ZoneCandidate::polygon(&[(6.9, 79.9), (91.0, 79.9), (6.9, 80.0)], "low"))
            .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::MalformedGeometry(GeometryFault::LatitudeOutOfRange {
                index: 1,
                value: 91.0
            })
        );

        let err = validator
            .validate(&ZoneCandidate::polygon(&[(6.9, 79.9), (6.9, 80.0), (6.9, -180.5)], "low"))
            .unwrap_err();
        assert!(matches!(
            err,
            RejectionReason::MalformedGeometry(GeometryFault::LongitudeOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_accepts_boundary_coordinates() {
        let validator = ZoneValidator::default();
        let corners = [(-90.0, -180.0), (90.0, -180.0), (90.0, 180.0)];
        assert!(validator.validate(&ZoneCandidate::polygon(&corners, "low")).is_ok());
    }

    #[test]
    fn test_rejects_nan() {
        // NaN has no JSON form and arrives as null
        let validator = ZoneValidator::default();
        let err = validator
            .validate(&ZoneCandidate::polygon(&[(f64::NAN, 79.9), (6.9, 79.9), (6.91, 79.91)], "low"))
            .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::MalformedGeometry(GeometryFault::NonNumericCoordinate { index: 0 })
        );
    }

    #[test]
    fn test_mistyped_risk_is_invalid_risk_level() {
        let validator = ZoneValidator::default();
        let mut candidate = ZoneCandidate::polygon(&square(), "low");

        candidate.risk = json!(5);
        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::InvalidRiskLevel("5".to_string())
        );

        candidate.risk = Value::Null;
        assert_eq!(
            validator.validate(&candidate).unwrap_err().code(),
            "invalid_risk_level"
        );
    }

    #[test]
    fn test_mistyped_coordinates_are_malformed() {
        let validator = ZoneValidator::default();
        let mut candidate = ZoneCandidate::polygon(&square(), "low");

        candidate.coordinates = json!("6.9,79.9");
        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::CoordinatesNotList)
        );

        candidate.coordinates = json!([[6.9, 79.9], "6.91,79.9", [6.91, 79.91]]);
        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::PointNotList { index: 1 })
        );

        candidate.coordinates = json!([[6.9, 79.9], [6.91, "79.9"], [6.91, 79.91]]);
        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::NonNumericCoordinate { index: 1 })
        );
    }

    #[test]
    fn test_empty_candidate_is_malformed() {
        let validator = ZoneValidator::default();
        assert_eq!(
            validator.validate(&ZoneCandidate::default()).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::CoordinatesNotList)
        );
    }

    #[test]
    fn test_rejects_bad_point_arity() {
        let validator = ZoneValidator::default();
        let candidate = ZoneCandidate {
            shape: None,
            coordinates: json!([[6.9, 79.9], [6.91], [6.91, 79.91]]),
            risk: json!("low"),
        };
        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::PointArity { index: 1, len: 1 })
        );
    }

    #[test]
    fn test_rejects_non_polygon_shape() {
        let validator = ZoneValidator::default();
        let mut candidate = ZoneCandidate::polygon(&square(), "low");
        candidate.shape = Some(json!("circle"));

        assert_eq!(
            validator.validate(&candidate).unwrap_err(),
            RejectionReason::MalformedGeometry(GeometryFault::UnsupportedShape("circle".to_string()))
        );
    }

    #[test]
    fn test_point_limit() {
        let validator = ZoneValidator::new(4);
        let mut points = square();
        points.push((6.915, 79.972));

        let err = validator
            .validate(&ZoneCandidate::polygon(&points, "low"))
            .unwrap_err();
        assert_eq!(
            err,
            RejectionReason::MalformedGeometry(GeometryFault::TooManyPoints { count: 5, max: 4 })
        );
    }
}
