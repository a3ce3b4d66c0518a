use anyhow::Context;
use remcore::CameraRecord;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A survey as supplied by the user: camera observations plus the species'
/// daily movement rate. YAML and JSON documents share this shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SurveyConfig {
    #[serde(default)]
    pub movement_rate: Option<f64>,
    #[serde(default)]
    pub cameras: Vec<CameraRecord>,
}

impl SurveyConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading survey file {}", path_ref.display()))?;
        let config: SurveyConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing survey file {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(movement_rate: Option<f64>, cameras: Vec<CameraRecord>) -> Self {
        Self {
            movement_rate,
            cameras,
        }
    }

    /// Replaces the file's movement rate when one was given on the command line.
    pub fn with_movement_rate(mut self, movement_rate: Option<f64>) -> Self {
        if movement_rate.is_some() {
            self.movement_rate = movement_rate;
        }
        self
    }

    /// Cameras with `camera-<index>` assigned to any record lacking an id.
    pub fn normalized_cameras(&self) -> Vec<CameraRecord> {
        assign_missing_ids(self.cameras.clone())
    }
}

pub(crate) fn assign_missing_ids(mut cameras: Vec<CameraRecord>) -> Vec<CameraRecord> {
    for (index, camera) in cameras.iter_mut().enumerate() {
        if camera.id.trim().is_empty() {
            camera.id = format!("camera-{}", index);
        }
    }
    cameras
}
