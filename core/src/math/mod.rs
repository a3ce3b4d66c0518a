pub mod angle;
pub mod stats;

pub use angle::degrees_to_radians;
pub use stats::StatsHelper;
