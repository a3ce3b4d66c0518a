//! Random Encounter Model (REM) density core for camera-trap surveys.
//!
//! Converts per-camera trap effort, detection counts and detection-zone
//! geometry into density estimates, then summarises them across the survey.
//! Everything here is a pure function of its inputs.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    CalculationResultSet, CameraRecord, CoreError, CoreResult, DensityResult, MovementRate,
};
pub use processing::DensityCalculator;
