use crate::workflow::config::assign_missing_ids;
use crate::workflow::runner::Runner;
use anyhow::bail;
use remcore::{CalculationResultSet, CameraRecord};
use serde::{Deserialize, Serialize};

/// Partial edit of a camera row. Fields left as `None` are unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CameraUpdate {
    pub trap_nights: Option<f64>,
    pub total_deer: Option<f64>,
    pub detection_distance: Option<f64>,
    pub detection_angle_left: Option<f64>,
    pub detection_angle_right: Option<f64>,
}

impl CameraUpdate {
    fn apply(&self, camera: &mut CameraRecord) {
        if let Some(v) = self.trap_nights {
            camera.trap_nights = v;
        }
        if let Some(v) = self.total_deer {
            camera.total_deer = v;
        }
        if let Some(v) = self.detection_distance {
            camera.detection_distance = v;
        }
        if let Some(v) = self.detection_angle_left {
            camera.detection_angle_left = v;
        }
        if let Some(v) = self.detection_angle_right {
            camera.detection_angle_right = v;
        }
    }
}

/// Rejects manually entered rows with a negative or non-numeric field.
pub fn validate_record(camera: &CameraRecord) -> anyhow::Result<()> {
    let fields = [
        ("trapNights", camera.trap_nights),
        ("totalDeer", camera.total_deer),
        ("detectionDistance", camera.detection_distance),
        ("detectionAngleLeft", camera.detection_angle_left),
        ("detectionAngleRight", camera.detection_angle_right),
    ];
    for (name, value) in fields {
        if !value.is_finite() {
            bail!("{}: required field", name);
        }
        if value < 0.0 {
            bail!("{}: must be positive", name);
        }
    }
    Ok(())
}

/// Mutable survey state held by the application between calculations.
#[derive(Debug, Clone, Default)]
pub struct SurveySession {
    cameras: Vec<CameraRecord>,
    movement_rate: Option<f64>,
    results: Option<CalculationResultSet>,
}

impl SurveySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cameras(&self) -> &[CameraRecord] {
        &self.cameras
    }

    pub fn movement_rate(&self) -> Option<f64> {
        self.movement_rate
    }

    pub fn results(&self) -> Option<&CalculationResultSet> {
        self.results.as_ref()
    }

    /// Appends a manually entered camera, naming it `camera-<n>` when it has no id.
    pub fn add_camera(&mut self, mut camera: CameraRecord) -> anyhow::Result<&CameraRecord> {
        validate_record(&camera)?;
        if camera.id.trim().is_empty() {
            camera.id = self.next_camera_id();
        }
        if self.cameras.iter().any(|c| c.id == camera.id) {
            bail!("camera {} already exists", camera.id);
        }
        self.cameras.push(camera);
        Ok(&self.cameras[self.cameras.len() - 1])
    }

    /// First free `camera-<n>` with `n` starting at the camera count plus one.
    fn next_camera_id(&self) -> String {
        (self.cameras.len() + 1..)
            .map(|n| format!("camera-{}", n))
            .find(|id| self.cameras.iter().all(|c| &c.id != id))
            .unwrap_or_default()
    }

    /// Replaces every camera with a bulk-loaded set.
    pub fn load_cameras(&mut self, cameras: Vec<CameraRecord>) {
        self.cameras = assign_missing_ids(cameras);
    }

    pub fn update_camera(&mut self, id: &str, update: &CameraUpdate) -> bool {
        match self.cameras.iter_mut().find(|c| c.id == id) {
            Some(camera) => {
                update.apply(camera);
                true
            }
            None => false,
        }
    }

    pub fn delete_camera(&mut self, id: &str) -> bool {
        let before = self.cameras.len();
        self.cameras.retain(|c| c.id != id);
        self.cameras.len() != before
    }

    pub fn set_movement_rate(&mut self, movement_rate: Option<f64>) {
        self.movement_rate = movement_rate;
    }

    pub fn calculate(&mut self) -> anyhow::Result<&CalculationResultSet> {
        let result = Runner::new(self.movement_rate).execute(&self.cameras)?;
        let stored: &CalculationResultSet = self.results.insert(result);
        Ok(stored)
    }

    pub fn reset(&mut self) {
        self.cameras.clear();
        self.movement_rate = None;
        self.results = None;
    }
}
