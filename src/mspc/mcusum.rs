//! Multivariate CUSUM (MCUSUM) statistic.
//!
//! # Algorithm
//!
//! ```text
//! D_t = sqrt((x_t - mu)ᵀ · S⁻¹ · (x_t - mu))
//! C_t = C_{t-1} + max(0, D_t - k) · (x_t - mu),     C_0 = 0
//! Y_t = sqrt(C_tᵀ · S⁻¹ · C_t)
//! ```
//!
//! Deviations whose Mahalanobis distance stays within the slack `k` add
//! nothing to the cumulative vector, so an in-control stream keeps `C_t = 0`.
//!
//! # Parameters
//!
//! - **k**: slack (reference value), non-negative. Typical: 0.5.
//!
//! # Reference
//!
//! Crosier, R.B. (1988). "Multivariate generalizations of cumulative sum
//! quality-control schemes", *Technometrics* 30(3), pp. 291-303.

use crate::linalg::{linear_combination, quadratic_form, LinalgError, Matrix};

/// Next cumulative vector `C_t`.
pub fn accumulate(
    cusum: &[f64],
    deviation: &[f64],
    covariance_inverse: &Matrix,
    k: f64,
) -> Result<Vec<f64>, LinalgError> {
    let distance = quadratic_form(deviation, covariance_inverse)?.sqrt();
    let weight = (distance - k).max(0.0);
    linear_combination(1.0, cusum, weight, deviation)
}

/// MCUSUM statistic: Mahalanobis length of the cumulative vector.
pub fn statistic(cusum: &[f64], covariance_inverse: &Matrix) -> Result<f64, LinalgError> {
    Ok(quadratic_form(cusum, covariance_inverse)?.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stays_at_zero_within_slack() {
        // S = I, k = 1: every deviation has distance <= 1.
        let inv = Matrix::identity(2);
        let mut c = vec![0.0, 0.0];
        for dev in [[0.5, 0.5], [-0.6, 0.2], [0.0, 1.0], [0.7, -0.7]] {
            c = accumulate(&c, &dev, &inv, 1.0).expect("same dim");
            assert_eq!(c, vec![0.0, 0.0]);
            assert_eq!(statistic(&c, &inv).expect("same dim"), 0.0);
        }
    }

    #[test]
    fn test_accumulates_beyond_slack() {
        // p=1, S=[[1]], k=0.5, deviation 2: weight 1.5, C = 3, Y = 3.
        let inv = Matrix::identity(1);
        let c1 = accumulate(&[0.0], &[2.0], &inv, 0.5).expect("same dim");
        assert!((c1[0] - 3.0).abs() < 1e-12);
        assert!((statistic(&c1, &inv).expect("same dim") - 3.0).abs() < 1e-12);

        let c2 = accumulate(&c1, &[2.0], &inv, 0.5).expect("same dim");
        assert!((c2[0] - 6.0).abs() < 1e-12, "sustained shift keeps growing");
    }

    #[test]
    fn test_zero_slack_weights_by_distance() {
        // k = 0: weight equals the distance itself.
        let inv = Matrix::diagonal(&[0.25]);
        let c = accumulate(&[0.0], &[4.0], &inv, 0.0).expect("same dim");
        // distance = 4/2 = 2, C = 2·4 = 8, Y = 8/2 = 4
        assert!((c[0] - 8.0).abs() < 1e-12);
        assert!((statistic(&c, &inv).expect("same dim") - 4.0).abs() < 1e-12);
    }
}
