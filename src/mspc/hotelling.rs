//! Hotelling T² statistic for individual observations.
//!
//! # Algorithm
//!
//! ```text
//! T² = (x - mu)ᵀ · S⁻¹ · (x - mu)
//! ```
//!
//! The chart has no memory: each statistic depends only on the current
//! deviation, which makes it most sensitive to large, sudden shifts.
//!
//! # Reference
//!
//! Hotelling, H. (1947). "Multivariate quality control", in *Techniques of
//! Statistical Analysis*, McGraw-Hill, pp. 111-184.

use crate::linalg::{quadratic_form, LinalgError, Matrix};

/// Squared Mahalanobis distance of `deviation` under `covariance_inverse`.
///
/// # Examples
///
/// ```
/// use u_mspc::linalg::Matrix;
/// use u_mspc::mspc::hotelling;
///
/// // mu = [100, 50], S = diag(25, 9), x = [110, 50]
/// let inv = Matrix::diagonal(&[25.0, 9.0]).inverse().unwrap();
/// let t2 = hotelling::t_squared(&[10.0, 0.0], &inv).unwrap();
/// assert!((t2 - 4.0).abs() < 1e-12);
/// ```
pub fn t_squared(deviation: &[f64], covariance_inverse: &Matrix) -> Result<f64, LinalgError> {
    quadratic_form(deviation, covariance_inverse)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_deviation_is_zero() {
        let inv = Matrix::from_rows(&[vec![2.0, 0.5], vec![0.5, 1.0]])
            .expect("square")
            .inverse()
            .expect("positive definite");
        let t2 = t_squared(&[0.0, 0.0], &inv).expect("same dim");
        assert_eq!(t2, 0.0);
    }

    #[test]
    fn test_univariate_literals() {
        // mu = 100, sigma = 5
        let inv = Matrix::new(1, vec![25.0]).expect("1x1").inverse().expect("nonzero");
        for (x, expected) in [(110.0, 4.0), (90.0, 4.0), (105.0, 1.0), (115.0, 9.0), (100.0, 0.0)] {
            let t2 = t_squared(&[x - 100.0], &inv).expect("same dim");
            assert!(
                (t2 - expected).abs() < 1e-12,
                "x={x}: expected {expected}, got {t2}"
            );
        }
    }

    #[test]
    fn test_correlation_reduces_distance_along_major_axis() {
        // Strong positive correlation: a joint move along (1,1) is less
        // surprising than an opposing move along (1,-1).
        let inv = Matrix::from_rows(&[vec![1.0, 0.9], vec![0.9, 1.0]])
            .expect("square")
            .inverse()
            .expect("positive definite");
        let along = t_squared(&[1.0, 1.0], &inv).expect("same dim");
        let across = t_squared(&[1.0, -1.0], &inv).expect("same dim");
        assert!(along < across, "along={along}, across={across}");
    }
}
