use serde::{Deserialize, Serialize};

/// One camera's observations for a single study period.
///
/// Angles are in degrees. Numeric fields missing from an ingested document
/// default to zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CameraRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub trap_nights: f64,
    #[serde(default)]
    pub total_deer: f64,
    #[serde(default)]
    pub detection_distance: f64,
    #[serde(default)]
    pub detection_angle_left: f64,
    #[serde(default)]
    pub detection_angle_right: f64,
}

impl CameraRecord {
    pub fn new(
        id: impl Into<String>,
        trap_nights: f64,
        total_deer: f64,
        detection_distance: f64,
        detection_angle_left: f64,
        detection_angle_right: f64,
    ) -> Self {
        Self {
            id: id.into(),
            trap_nights,
            total_deer,
            detection_distance,
            detection_angle_left,
            detection_angle_right,
        }
    }
}

/// Average distance travelled per day by the study species.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct MovementRate(f64);

impl MovementRate {
    pub fn new(value: f64) -> CoreResult<Self> {
        if value.is_finite() && value > 0.0 {
            Ok(Self(value))
        } else {
            Err(CoreError::InvalidMovementRate(value))
        }
    }

    pub fn get(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for MovementRate {
    type Error = CoreError;

    fn try_from(value: f64) -> CoreResult<Self> {
        Self::new(value)
    }
}

impl From<MovementRate> for f64 {
    fn from(rate: MovementRate) -> Self {
        rate.0
    }
}

/// Density estimate for a single camera.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DensityResult {
    pub camera_id: String,
    pub density: f64,
}

/// Per-camera densities plus survey-wide summary statistics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculationResultSet {
    pub per_camera: Vec<DensityResult>,
    pub average_density: f64,
    /// Sample standard deviation (n - 1 divisor) of the per-camera densities.
    pub standard_deviation: f64,
    pub total_trap_nights: f64,
    pub average_detection_rate: f64,
    /// Degrees, as supplied.
    pub average_angle_left: f64,
    /// Degrees, as supplied.
    pub average_angle_right: f64,
}

impl CalculationResultSet {
    /// Result for a survey with no cameras: every aggregate is zero.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn camera_count(&self) -> usize {
        self.per_camera.len()
    }

    pub fn to_json_pretty(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Errors raised around the calculation, never by it.
#[derive(thiserror::Error, Debug)]
pub enum CoreError {
    #[error("invalid movement rate {0}: must be a finite value greater than 0")]
    InvalidMovementRate(f64),
    #[error("survey contains no cameras")]
    EmptySurvey,
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movement_rate_rejects_non_positive_values() {
        assert!(MovementRate::new(0.0).is_err());
        assert!(MovementRate::new(-0.5).is_err());
        assert!(MovementRate::new(f64::NAN).is_err());
        assert!(MovementRate::new(f64::INFINITY).is_err());
        assert_eq!(MovementRate::new(0.8).unwrap().get(), 0.8);
    }

    #[test]
    fn camera_record_missing_fields_default_to_zero() {
        let record: CameraRecord =
            serde_json::from_str(r#"{"id": "camera-0", "trapNights": 12}"#).unwrap();
        assert_eq!(record.trap_nights, 12.0);
        assert_eq!(record.total_deer, 0.0);
        assert_eq!(record.detection_angle_right, 0.0);
    }

    #[test]
    fn result_set_serializes_with_camel_case_keys() {
        let json = CalculationResultSet::empty().to_json_pretty().unwrap();
        assert!(json.contains("\"averageDetectionRate\""));
        assert!(json.contains("\"perCamera\""));
    }

    #[test]
    fn movement_rate_deserialization_validates() {
        assert!(serde_json::from_str::<MovementRate>("0.5").is_ok());
        assert!(serde_json::from_str::<MovementRate>("0").is_err());
    }
}
