use crate::math::angle::degrees_to_radians;
use crate::math::stats::StatsHelper;
use crate::prelude::{
    CalculationResultSet, CameraRecord, CoreError, CoreResult, DensityResult, MovementRate,
};
use crate::telemetry::log::LogManager;

/// Random Encounter Model estimator.
///
/// Per camera:
///
/// ```text
/// density = total_deer / (trap_nights * movement_rate * detection_distance * (2 + left + right))
/// ```
///
/// with both angles converted from degrees to radians. A zero denominator
/// yields a density of zero rather than a non-finite value.
pub struct DensityCalculator;

impl DensityCalculator {
    pub fn camera_density(record: &CameraRecord, movement_rate: f64) -> f64 {
        let angle_term = 2.0
            + degrees_to_radians(record.detection_angle_left)
            + degrees_to_radians(record.detection_angle_right);
        let denominator =
            record.trap_nights * movement_rate * record.detection_distance * angle_term;

        if denominator == 0.0 {
            return 0.0;
        }
        record.total_deer / denominator
    }

    /// Detections per trap night; zero when the camera logged no trap nights.
    pub fn detection_rate(record: &CameraRecord) -> f64 {
        if record.trap_nights == 0.0 {
            return 0.0;
        }
        record.total_deer / record.trap_nights
    }

    /// Computes every camera's density and the survey summary.
    ///
    /// Never fails: degenerate cases resolve to zero and non-finite inputs
    /// propagate through the arithmetic untouched.
    pub fn compute_all(records: &[CameraRecord], movement_rate: f64) -> CalculationResultSet {
        if records.is_empty() {
            return CalculationResultSet::empty();
        }

        let per_camera: Vec<DensityResult> = records
            .iter()
            .map(|record| DensityResult {
                camera_id: record.id.clone(),
                density: Self::camera_density(record, movement_rate),
            })
            .collect();
        let densities: Vec<f64> = per_camera.iter().map(|r| r.density).collect();

        let average_density = StatsHelper::mean(&densities);
        let standard_deviation = StatsHelper::sample_std_dev(&densities);

        let trap_nights: Vec<f64> = records.iter().map(|r| r.trap_nights).collect();
        let rates: Vec<f64> = records.iter().map(Self::detection_rate).collect();
        let angles_left: Vec<f64> = records.iter().map(|r| r.detection_angle_left).collect();
        let angles_right: Vec<f64> = records.iter().map(|r| r.detection_angle_right).collect();

        LogManager::new("density").record(&format!(
            "cameras {} mean density {:.6} sd {:.6}",
            records.len(),
            average_density,
            standard_deviation
        ));

        CalculationResultSet {
            per_camera,
            average_density,
            standard_deviation,
            total_trap_nights: StatsHelper::sum(&trap_nights),
            average_detection_rate: StatsHelper::mean(&rates),
            average_angle_left: StatsHelper::mean(&angles_left),
            average_angle_right: StatsHelper::mean(&angles_right),
        }
    }

    /// Same as [`compute_all`](Self::compute_all) but refuses an empty survey.
    pub fn compute_checked(
        records: &[CameraRecord],
        movement_rate: MovementRate,
    ) -> CoreResult<CalculationResultSet> {
        if records.is_empty() {
            return Err(CoreError::EmptySurvey);
        }
        Ok(Self::compute_all(records, movement_rate.get()))
    }
}
