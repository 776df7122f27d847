//! Multivariate EWMA (MEWMA) statistic.
//!
//! # Algorithm
//!
//! ```text
//! Z_t  = lambda · (x_t - mu) + (1 - lambda) · Z_{t-1},    Z_0 = lambda · (x_0 - mu)
//! T²_t = Z_tᵀ · [S · lambda / (2 - lambda)]⁻¹ · Z_t
//! ```
//!
//! Since `[c·S]⁻¹ = S⁻¹ / c`, the scaled inverse is never formed explicitly:
//! the quadratic form under `S⁻¹` is divided by `lambda / (2 - lambda)`.
//!
//! # Parameters
//!
//! - **lambda**: smoothing constant in (0, 1]. `lambda = 1` reduces the chart
//!   to Hotelling T².
//!
//! # Reference
//!
//! Lowry, C.A., Woodall, W.H., Champ, C.W. & Rigdon, S.E. (1992). "A
//! multivariate exponentially weighted moving average control chart",
//! *Technometrics* 34(1), pp. 46-53.

use crate::linalg::{linear_combination, quadratic_form, LinalgError, Matrix};

/// Next smoothed vector `Z_t`.
///
/// With no previous vector the recursion starts at `lambda · deviation`.
pub fn smooth(
    previous: Option<&[f64]>,
    deviation: &[f64],
    lambda: f64,
) -> Result<Vec<f64>, LinalgError> {
    match previous {
        Some(prev) => linear_combination(lambda, deviation, 1.0 - lambda, prev),
        None => Ok(deviation.iter().map(|d| lambda * d).collect()),
    }
}

/// MEWMA statistic of a smoothed vector.
pub fn statistic(
    smoothed: &[f64],
    covariance_inverse: &Matrix,
    lambda: f64,
) -> Result<f64, LinalgError> {
    let variance_factor = lambda / (2.0 - lambda);
    Ok(quadratic_form(smoothed, covariance_inverse)? / variance_factor)
}
