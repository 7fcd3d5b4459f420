//! Confidence calibration.
//!
//! Maps the unbounded raw margin to a bounded score via a logistic squash.
//! This is a monotonic transform of hyperplane distance, NOT a calibrated
//! posterior probability; it is only guaranteed to order inputs by margin
//! and to sit at 0.5 exactly on the decision boundary.

/// Smallest distance from the interval ends; extreme margins saturate the
/// sigmoid in f64 and would otherwise return exactly 0.0 or 1.0.
const CONFIDENCE_EPS: f64 = 1e-12;

/// Squash a raw margin into the open interval (0, 1).
pub fn calibrate(raw_margin: f64) -> f64 {
    let sigmoid = 1.0 / (1.0 + (-raw_margin).exp());
    sigmoid.clamp(CONFIDENCE_EPS, 1.0 - CONFIDENCE_EPS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_margin_is_half() {
        assert!((calibrate(0.0) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn monotonic_in_raw_margin() {
        let margins = [-50.0, -5.0, -0.5, 0.0, 0.5, 5.0, 50.0];
        for pair in margins.windows(2) {
            assert!(calibrate(pair[0]) <= calibrate(pair[1]));
        }
    }

    #[test]
    fn stays_strictly_inside_unit_interval() {
        for margin in [-1e6, -100.0, 0.0, 100.0, 1e6] {
            let c = calibrate(margin);
            assert!(c > 0.0 && c < 1.0, "confidence {} out of (0,1)", c);
        }
    }

    #[test]
    fn symmetric_around_half() {
        let up = calibrate(1.25) - 0.5;
        let down = 0.5 - calibrate(-1.25);
        assert!((up - down).abs() < 1e-12);
    }
}
