use anyhow::ensure;
use rand::{rngs::StdRng, Rng, SeedableRng};
use remcore::CameraRecord;
use serde::Deserialize;

/// Configuration for generating a synthetic camera survey.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GeneratorConfig {
    pub cameras: usize,
    pub seed: u64,
    pub max_trap_nights: f64,
    pub max_detections: f64,
    /// Nominal detection distance; each camera varies by up to 10%.
    pub detection_distance: f64,
    /// Upper bound for each detection angle, in degrees.
    pub max_angle: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            cameras: 10,
            seed: 0,
            max_trap_nights: 60.0,
            max_detections: 80.0,
            detection_distance: 0.015,
            max_angle: 45.0,
        }
    }
}

impl GeneratorConfig {
    fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.max_trap_nights >= 1.0, "max_trap_nights must be at least 1");
        ensure!(self.max_detections >= 0.0, "max_detections must not be negative");
        ensure!(self.detection_distance > 0.0, "detection_distance must be positive");
        ensure!(
            self.max_angle > 0.0 && self.max_angle < 180.0,
            "max_angle must lie in (0, 180)"
        );
        Ok(())
    }
}

pub fn build_survey(config: &GeneratorConfig) -> anyhow::Result<Vec<CameraRecord>> {
    config.validate()?;

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut cameras = Vec::with_capacity(config.cameras);

    for index in 0..config.cameras {
        let trap_nights = rng.gen_range(1.0..=config.max_trap_nights).round();
        let total_deer = rng.gen_range(0.0..=config.max_detections).round();
        let detection_distance = config.detection_distance * rng.gen_range(0.9..1.1);
        let angle_left = rng.gen_range(0.0..config.max_angle);
        let angle_right = rng.gen_range(0.0..config.max_angle);

        cameras.push(CameraRecord::new(
            format!("camera-{}", index + 1),
            trap_nights,
            total_deer,
            detection_distance,
            angle_left,
            angle_right,
        ));
    }

    Ok(cameras)
}

pub fn build_default_survey(cameras: usize, seed: u64) -> anyhow::Result<Vec<CameraRecord>> {
    let config = GeneratorConfig {
        cameras,
        seed,
        ..Default::default()
    };
    build_survey(&config)
}
