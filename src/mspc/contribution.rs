//! Per-variable decomposition of the squared statistical distance.
//!
//! # Algorithm
//!
//! With deviation `d = x - mu` and inverse covariance `S⁻¹`:
//!
//! ```text
//! c_i = | d_i · Σ_j S⁻¹_ij · d_j |
//! pct_i = 100 · c_i / Σ_k c_k          (0 when Σ_k c_k = 0)
//! ```
//!
//! The signed terms sum to the T² statistic. The decomposition is independent
//! of the selected chart, so the same "which variable drives the anomaly"
//! ranking is reported whichever statistic raised the alarm.
//!
//! # Reference
//!
//! Kourti, T. & MacGregor, J.F. (1996). "Multivariate SPC methods for process
//! and product monitoring", *Journal of Quality Technology* 28(4), pp. 409-428.

use serde::{Deserialize, Serialize};

use crate::linalg::{LinalgError, Matrix};

/// Contribution of one variable to the current deviation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Variable name.
    pub name: String,
    /// Absolute contribution `|c_i|`.
    pub contribution: f64,
    /// Share of the total, in percent.
    pub percentage: f64,
}

/// Default display name of variable `index` (zero-based).
pub fn default_variable_name(index: usize) -> String {
    format!("Variable {}", index + 1)
}

/// Computes contributions, sorted descending by `contribution`.
///
/// `names[i]` labels variable `i`; missing names fall back to
/// `"Variable {i+1}"`. Ties keep variable order.
///
/// # Examples
///
/// ```
/// use u_mspc::linalg::Matrix;
/// use u_mspc::mspc::contributions;
///
/// let inv = Matrix::diagonal(&[25.0, 9.0]).inverse().unwrap();
/// let names = vec!["temperature".to_string(), "pressure".to_string()];
/// let c = contributions(&[10.0, 3.0], &inv, &names).unwrap();
/// assert_eq!(c[0].name, "temperature");
/// assert!((c[0].percentage - 80.0).abs() < 1e-9);
/// ```
pub fn contributions(
    deviation: &[f64],
    covariance_inverse: &Matrix,
    names: &[String],
) -> Result<Vec<Contribution>, LinalgError> {
    let weighted = covariance_inverse.mul_vec(deviation)?;
    let raw: Vec<f64> = deviation
        .iter()
        .zip(&weighted)
        .map(|(d, w)| (d * w).abs())
        .collect();
    let total: f64 = raw.iter().sum();

    let mut out: Vec<Contribution> = raw
        .into_iter()
        .enumerate()
        .map(|(i, contribution)| Contribution {
            name: names
                .get(i)
                .cloned()
                .unwrap_or_else(|| default_variable_name(i)),
            contribution,
            percentage: if total > 0.0 {
                100.0 * contribution / total
            } else {
                0.0
            },
        })
        .collect();
    out.sort_by(|a, b| b.contribution.total_cmp(&a.contribution));
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn correlated_inverse() -> Matrix {
        Matrix::from_rows(&[
            vec![4.0, 1.2, 0.3],
            vec![1.2, 2.0, -0.4],
            vec![0.3, -0.4, 1.0],
        ])
        .expect("square")
        .inverse()
        .expect("positive definite")
    }

    #[test]
    fn test_independent_variables() {
        // S = diag(25, 9): contributions are the squared z-scores.
        let inv = Matrix::diagonal(&[25.0, 9.0]).inverse().expect("nonzero");
        let c = contributions(&[10.0, 3.0], &inv, &[]).expect("same dim");
        assert_eq!(c[0].name, "Variable 1");
        assert!((c[0].contribution - 4.0).abs() < 1e-12);
        assert_eq!(c[1].name, "Variable 2");
        assert!((c[1].contribution - 1.0).abs() < 1e-12);
        assert!((c[0].percentage - 80.0).abs() < 1e-9);
        assert!((c[1].percentage - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_sorted_descending() {
        let inv = Matrix::identity(4);
        let c = contributions(&[1.0, -3.0, 0.5, 2.0], &inv, &[]).expect("same dim");
        let names: Vec<&str> = c.iter().map(|x| x.name.as_str()).collect();
        assert_eq!(names, ["Variable 2", "Variable 4", "Variable 1", "Variable 3"]);
        for w in c.windows(2) {
            assert!(w[0].contribution >= w[1].contribution);
        }
    }

    #[test]
    fn test_zero_deviation_has_zero_percentages() {
        let inv = correlated_inverse();
        let c = contributions(&[0.0, 0.0, 0.0], &inv, &[]).expect("same dim");
        assert_eq!(c.len(), 3);
        for item in &c {
            assert_eq!(item.contribution, 0.0);
            assert_eq!(item.percentage, 0.0);
        }
    }

    #[test]
    fn test_partial_names_fall_back() {
        let inv = Matrix::identity(2);
        let names = vec!["flow".to_string()];
        let c = contributions(&[0.0, 1.0], &inv, &names).expect("same dim");
        assert_eq!(c[0].name, "Variable 2");
        assert_eq!(c[1].name, "flow");
    }

    #[test]
    fn test_dimension_mismatch() {
        let inv = Matrix::identity(3);
        assert!(contributions(&[1.0], &inv, &[]).is_err());
    }
}
