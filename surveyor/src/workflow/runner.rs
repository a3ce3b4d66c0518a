use anyhow::{anyhow, Context};
use log::info;
use remcore::{CalculationResultSet, CameraRecord, DensityCalculator, MovementRate};

/// Checks the user-facing preconditions and hands the survey to the core.
#[derive(Clone, Debug)]
pub struct Runner {
    movement_rate: Option<f64>,
}

impl Runner {
    pub fn new(movement_rate: Option<f64>) -> Self {
        Self { movement_rate }
    }

    pub fn movement_rate(&self) -> anyhow::Result<MovementRate> {
        let value = self
            .movement_rate
            .ok_or_else(|| anyhow!("a movement rate greater than 0 is required"))?;
        MovementRate::new(value).context("movement rate must be greater than 0")
    }

    pub fn execute(&self, cameras: &[CameraRecord]) -> anyhow::Result<CalculationResultSet> {
        let rate = self.movement_rate()?;
        let result = DensityCalculator::compute_checked(cameras, rate)
            .context("please add at least one camera")?;
        info!(
            "computed density for {} cameras: mean {:.4}, sd {:.4}",
            result.camera_count(),
            result.average_density,
            result.standard_deviation
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use remcore::CoreError;

    fn survey() -> Vec<CameraRecord> {
        vec![
            CameraRecord::new("camera-1", 30.0, 45.0, 15.0, 30.0, 30.0),
            CameraRecord::new("camera-2", 20.0, 10.0, 12.0, 25.0, 35.0),
        ]
    }

    #[test]
    fn runner_executes_survey() {
        let runner = Runner::new(Some(0.5));
        let result = runner.execute(&survey()).unwrap();
        assert_eq!(result.camera_count(), 2);
        assert_eq!(result.total_trap_nights, 50.0);
        assert!((result.per_camera[0].density - 0.0656).abs() < 1e-4);
    }

    #[test]
    fn runner_rejects_empty_survey() {
        let err = Runner::new(Some(0.5)).execute(&[]).unwrap_err();
        assert!(err.to_string().contains("at least one camera"));
        assert!(matches!(
            err.root_cause().downcast_ref::<CoreError>(),
            Some(CoreError::EmptySurvey)
        ));
    }

    #[test]
    fn runner_rejects_missing_or_non_positive_rate() {
        assert!(Runner::new(None).execute(&survey()).is_err());
        assert!(Runner::new(Some(0.0)).execute(&survey()).is_err());
        assert!(Runner::new(Some(-1.0)).execute(&survey()).is_err());
    }

    #[test]
    fn runner_exposes_validated_rate() {
        assert_eq!(Runner::new(Some(0.8)).movement_rate().unwrap().get(), 0.8);
    }
}
