pub mod state;

pub use state::{CameraUpdate, SurveySession};
