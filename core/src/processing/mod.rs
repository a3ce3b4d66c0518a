pub mod density;

pub use density::DensityCalculator;
