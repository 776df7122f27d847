//! Phase I baseline estimation.
//!
//! A baseline is the statistical model of the in-control process: the
//! per-variable mean vector, the unbiased sample covariance matrix and its
//! inverse. It is estimated once from a Phase I sample and is read-only
//! afterwards; a new baseline replaces the old one wholesale.
//!
//! # Algorithm
//!
//! ```text
//! mu_j  = (1/n) Σ_k x_kj
//! S_ij  = (1/(n-1)) Σ_k (x_ki - mu_i)(x_kj - mu_j)
//! ```
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*,
//!   8th ed., Section 11.3 (Phase I and Phase II of multivariate charts).

use u_numflow::stats;

use crate::error::{MspcError, Result};
use crate::linalg::{difference, quadratic_form, Matrix};

/// In-control process model estimated from Phase I data.
///
/// # Invariants
///
/// - `means.len() == covariance.dim() == covariance_inverse.dim() == p >= 1`
/// - `covariance` is symmetric and invertible
/// - `sample_size > p`
#[derive(Debug, Clone, PartialEq)]
pub struct Baseline {
    means: Vec<f64>,
    covariance: Matrix,
    covariance_inverse: Matrix,
    sample_size: usize,
}

impl Baseline {
    /// Estimates a baseline from Phase I observations.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] if the sample is empty, observations
    ///   have no values or inconsistent lengths, contain non-finite values,
    ///   or there are not more observations than variables.
    /// - [`MspcError::SingularMatrix`] if the covariance matrix cannot be
    ///   inverted (for example a constant or perfectly collinear variable).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mspc::mspc::Baseline;
    ///
    /// let samples = vec![
    ///     vec![10.0, 20.0],
    ///     vec![12.0, 19.0],
    ///     vec![11.0, 22.0],
    ///     vec![9.0, 21.0],
    /// ];
    /// let baseline = Baseline::estimate(&samples).unwrap();
    /// assert_eq!(baseline.dimension(), 2);
    /// assert!((baseline.means()[0] - 10.5).abs() < 1e-12);
    /// ```
    ///
    /// # Complexity
    ///
    /// Time: O(n·p² + p³), Space: O(n·p + p²)
    pub fn estimate<R: AsRef<[f64]>>(samples: &[R]) -> Result<Self> {
        let n = samples.len();
        let first = samples
            .first()
            .ok_or_else(|| MspcError::InvalidInput("Phase I sample set is empty".into()))?;
        let p = first.as_ref().len();
        if p == 0 {
            return Err(MspcError::InvalidInput(
                "Phase I observations have no variables".into(),
            ));
        }
        for (i, row) in samples.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != p {
                return Err(MspcError::InvalidInput(format!(
                    "Phase I observation {i} has {} values, expected {p}",
                    row.len()
                )));
            }
            if row.iter().any(|v| !v.is_finite()) {
                return Err(MspcError::InvalidInput(format!(
                    "Phase I observation {i} contains a non-finite value"
                )));
            }
        }
        if n <= p {
            return Err(MspcError::InvalidInput(format!(
                "Phase I needs at least {} observations for {p} variables, got {n}",
                p + 1
            )));
        }

        let columns: Vec<Vec<f64>> = (0..p)
            .map(|j| samples.iter().map(|row| row.as_ref()[j]).collect())
            .collect();

        let means = columns
            .iter()
            .map(|col| stats::mean(col))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| MspcError::InvalidInput("cannot compute Phase I means".into()))?;

        for (j, col) in columns.iter().enumerate() {
            if stats::min(col) == stats::max(col) {
                return Err(MspcError::SingularMatrix {
                    context: format!("Phase I variable {j} is constant"),
                });
            }
        }

        let centered: Vec<Vec<f64>> = columns
            .iter()
            .zip(&means)
            .map(|(col, mu)| col.iter().map(|x| x - mu).collect())
            .collect();
        let divisor = (n - 1) as f64;

        let mut data = vec![0.0; p * p];
        let mut products = vec![0.0; n];
        for i in 0..p {
            for j in i..p {
                for (k, prod) in products.iter_mut().enumerate() {
                    *prod = centered[i][k] * centered[j][k];
                }
                let cov = stats::kahan_sum(&products) / divisor;
                data[i * p + j] = cov;
                data[j * p + i] = cov;
            }
        }
        let covariance = Matrix::new(p, data)?;

        Self::assemble(means, covariance, n)
    }

    /// Builds a baseline from known parameters instead of Phase I data.
    ///
    /// `sample_size` is the size of the sample the parameters represent and
    /// only feeds the Hotelling T² control limit; it must exceed `p`.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] on dimension mismatch, non-finite values,
    ///   an asymmetric covariance, or `sample_size <= p`.
    /// - [`MspcError::SingularMatrix`] if the covariance is not invertible.
    pub fn from_parameters(means: Vec<f64>, covariance: Matrix, sample_size: usize) -> Result<Self> {
        let p = means.len();
        if p == 0 {
            return Err(MspcError::InvalidInput("baseline has no variables".into()));
        }
        if covariance.dim() != p {
            return Err(MspcError::InvalidInput(format!(
                "covariance is {0}x{0} but there are {p} means",
                covariance.dim()
            )));
        }
        if means.iter().chain(covariance.as_slice()).any(|v| !v.is_finite()) {
            return Err(MspcError::InvalidInput(
                "baseline parameters contain non-finite values".into(),
            ));
        }
        if !covariance.is_symmetric(1e-12) {
            return Err(MspcError::InvalidInput(
                "covariance matrix is not symmetric".into(),
            ));
        }
        if sample_size <= p {
            return Err(MspcError::InvalidInput(format!(
                "sample size {sample_size} must exceed the number of variables {p}"
            )));
        }
        Self::assemble(means, covariance, sample_size)
    }

    fn assemble(means: Vec<f64>, covariance: Matrix, sample_size: usize) -> Result<Self> {
        let covariance_inverse =
            covariance
                .inverse_covariance()
                .map_err(|_| MspcError::SingularMatrix {
                    context: "covariance matrix is not invertible; \
                              a variable may be constant or collinear with others"
                        .into(),
                })?;
        Ok(Self {
            means,
            covariance,
            covariance_inverse,
            sample_size,
        })
    }

    /// Number of monitored variables `p`.
    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    /// Phase I sample size `n`.
    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    /// Per-variable means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Sample covariance matrix (divisor n-1).
    pub fn covariance(&self) -> &Matrix {
        &self.covariance
    }

    /// Inverse of the covariance matrix.
    pub fn covariance_inverse(&self) -> &Matrix {
        &self.covariance_inverse
    }

    /// Per-variable standard deviations (square roots of the diagonal).
    pub fn std_devs(&self) -> Vec<f64> {
        self.covariance.diag().into_iter().map(f64::sqrt).collect()
    }

    /// Deviation `x - mu` of a validated observation.
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidInput`] if the observation has the wrong length or
    /// contains non-finite values.
    pub fn deviation(&self, observation: &[f64]) -> Result<Vec<f64>> {
        if observation.len() != self.dimension() {
            return Err(MspcError::InvalidInput(format!(
                "observation has {} values, baseline has {} variables",
                observation.len(),
                self.dimension()
            )));
        }
        if observation.iter().any(|v| !v.is_finite()) {
            return Err(MspcError::InvalidInput(
                "observation contains a non-finite value".into(),
            ));
        }
        Ok(difference(observation, &self.means)?)
    }

    /// Mahalanobis distance of an observation from the baseline mean.
    pub fn mahalanobis_distance(&self, observation: &[f64]) -> Result<f64> {
        let deviation = self.deviation(observation)?;
        Ok(quadratic_form(&deviation, &self.covariance_inverse)?.sqrt())
    }
}
