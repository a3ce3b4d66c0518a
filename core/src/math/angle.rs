use std::f64::consts::PI;

pub fn degrees_to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn right_angle_converts_to_half_pi() {
        assert!((degrees_to_radians(90.0) - PI / 2.0).abs() < 1e-15);
        assert!((degrees_to_radians(90.0) + degrees_to_radians(90.0) - PI).abs() < 1e-15);
        assert_eq!(degrees_to_radians(0.0), 0.0);
    }
}
