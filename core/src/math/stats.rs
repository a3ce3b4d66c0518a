pub struct StatsHelper;

impl StatsHelper {
    pub fn sum(values: &[f64]) -> f64 {
        values.iter().sum()
    }

    pub fn mean(values: &[f64]) -> f64 {
        if values.is_empty() {
            return 0.0;
        }
        Self::sum(values) / values.len() as f64
    }

    /// Sample standard deviation with Bessel's correction. Zero for fewer than two values.
    pub fn sample_std_dev(values: &[f64]) -> f64 {
        if values.len() <= 1 {
            return 0.0;
        }
        let mean = Self::mean(values);
        let sum_sq: f64 = values.iter().map(|&v| (v - mean) * (v - mean)).sum();
        (sum_sq / (values.len() - 1) as f64).sqrt()
    }
}
