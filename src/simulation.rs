//! Seeded multivariate normal process simulator.
//!
//! Produces Phase I samples and Phase II observations for demonstrations and
//! tests. Correlated variables are generated from the lower Cholesky factor
//! `L` of the target covariance:
//!
//! ```text
//! x = mu + L · z,   z ~ N(0, I)
//! ```
//!
//! # Reference
//!
//! Gentle, J.E. (2003). *Random Number Generation and Monte Carlo Methods*,
//! 2nd ed., Springer, Section 5.3.1.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

use crate::error::{MspcError, Result};
use crate::linalg::Matrix;

/// Means of the five-variable demo process.
pub const DEMO_MEANS: [f64; 5] = [100.0, 50.0, 75.0, 25.0, 150.0];

/// Standard deviations of the five-variable demo process.
pub const DEMO_STD_DEVS: [f64; 5] = [5.0, 3.0, 4.0, 2.0, 10.0];

/// Multivariate normal observation generator.
///
/// # Examples
///
/// ```
/// use u_mspc::simulation::ProcessSimulator;
///
/// let mut sim = ProcessSimulator::demo(7);
/// let phase_i = sim.phase_i(30);
/// assert_eq!(phase_i.len(), 30);
/// assert!(phase_i.iter().all(|row| row.len() == 5));
/// ```
#[derive(Debug, Clone)]
pub struct ProcessSimulator {
    means: Vec<f64>,
    factor: Matrix,
    rng: StdRng,
}

impl ProcessSimulator {
    /// Independent variables with the given means and standard deviations.
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidInput`] if the lengths differ, the process is
    /// empty, or any value is non-finite or a standard deviation is negative.
    pub fn independent(means: Vec<f64>, std_devs: &[f64], seed: u64) -> Result<Self> {
        if means.len() != std_devs.len() {
            return Err(MspcError::InvalidInput(format!(
                "{} means but {} standard deviations",
                means.len(),
                std_devs.len()
            )));
        }
        if std_devs.iter().any(|s| !s.is_finite() || *s < 0.0) {
            return Err(MspcError::InvalidInput(
                "standard deviations must be finite and non-negative".into(),
            ));
        }
        Self::build(means, Matrix::diagonal(std_devs), seed)
    }

    /// Correlated variables with the given mean vector and covariance.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] on dimension mismatch or non-finite means.
    /// - [`MspcError::SingularMatrix`] if the covariance is not positive
    ///   definite.
    pub fn correlated(means: Vec<f64>, covariance: &Matrix, seed: u64) -> Result<Self> {
        if covariance.dim() != means.len() {
            return Err(MspcError::InvalidInput(format!(
                "covariance is {0}x{0} but there are {1} means",
                covariance.dim(),
                means.len()
            )));
        }
        let factor = covariance.cholesky()?;
        Self::build(means, factor, seed)
    }

    /// The five-variable demo process (independent variables).
    pub fn demo(seed: u64) -> Self {
        Self {
            means: DEMO_MEANS.to_vec(),
            factor: Matrix::diagonal(&DEMO_STD_DEVS),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn build(means: Vec<f64>, factor: Matrix, seed: u64) -> Result<Self> {
        if means.is_empty() {
            return Err(MspcError::InvalidInput(
                "process needs at least one variable".into(),
            ));
        }
        if means.iter().any(|m| !m.is_finite()) {
            return Err(MspcError::InvalidInput("means must be finite".into()));
        }
        Ok(Self {
            means,
            factor,
            rng: StdRng::seed_from_u64(seed),
        })
    }

    /// Number of variables.
    pub fn dimension(&self) -> usize {
        self.means.len()
    }

    /// Process means.
    pub fn means(&self) -> &[f64] {
        &self.means
    }

    /// Draws one in-control observation.
    pub fn sample(&mut self) -> Vec<f64> {
        let z: Vec<f64> = (0..self.dimension())
            .map(|_| self.rng.sample::<f64, _>(StandardNormal))
            .collect();
        self.means
            .iter()
            .enumerate()
            .map(|(i, m)| {
                // Lower triangular: only columns 0..=i contribute.
                m + (0..=i).map(|j| self.factor.get(i, j) * z[j]).sum::<f64>()
            })
            .collect()
    }

    /// Draws one observation with the mean of `variable` moved by `shift`
    /// (in the variable's own units).
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidInput`] if `variable` is out of range or `shift`
    /// is non-finite.
    pub fn sample_shifted(&mut self, variable: usize, shift: f64) -> Result<Vec<f64>> {
        if variable >= self.dimension() {
            return Err(MspcError::InvalidInput(format!(
                "variable {variable} out of range for {} variables",
                self.dimension()
            )));
        }
        if !shift.is_finite() {
            return Err(MspcError::InvalidInput("shift must be finite".into()));
        }
        let mut x = self.sample();
        x[variable] += shift;
        Ok(x)
    }

    /// Draws `n` in-control observations.
    pub fn phase_i(&mut self, n: usize) -> Vec<Vec<f64>> {
        (0..n).map(|_| self.sample()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mspc::Baseline;

    #[test]
    fn test_demo_moments_converge() {
        let mut sim = ProcessSimulator::demo(42);
        let baseline = Baseline::estimate(&sim.phase_i(10_000)).expect("non-singular");
        for (i, (&mean, &sd)) in DEMO_MEANS.iter().zip(&DEMO_STD_DEVS).enumerate() {
            let m = baseline.means()[i];
            let s = baseline.std_devs()[i];
            assert!((m - mean).abs() / mean < 0.05, "var {i}: mean {m} vs {mean}");
            assert!((s - sd).abs() / sd < 0.05, "var {i}: sd {s} vs {sd}");
        }
    }

    #[test]
    fn test_correlated_covariance_recovered() {
        let cov = Matrix::from_rows(&[vec![4.0, 1.2], vec![1.2, 1.0]]).expect("square");
        let mut sim = ProcessSimulator::correlated(vec![10.0, -5.0], &cov, 3).expect("PD");
        let baseline = Baseline::estimate(&sim.phase_i(10_000)).expect("non-singular");
        let est = baseline.covariance();
        assert!((est.get(0, 0) - 4.0).abs() < 0.3, "var0 {}", est.get(0, 0));
        assert!((est.get(1, 1) - 1.0).abs() < 0.1, "var1 {}", est.get(1, 1));
        assert!((est.get(0, 1) - 1.2).abs() < 0.15, "cov {}", est.get(0, 1));
        assert!((baseline.means()[1] + 5.0).abs() < 0.1);
    }

    #[test]
    fn test_same_seed_same_stream() {
        let a = ProcessSimulator::demo(11).phase_i(5);
        let b = ProcessSimulator::demo(11).phase_i(5);
        assert_eq!(a, b);
        let c = ProcessSimulator::demo(12).phase_i(5);
        assert_ne!(a, c);
    }

    #[test]
    fn test_zero_variance_reproduces_mean() {
        let mut sim =
            ProcessSimulator::independent(vec![1.0, 2.0], &[0.0, 0.0], 1).expect("valid");
        assert_eq!(sim.sample(), vec![1.0, 2.0]);
        assert_eq!(sim.sample_shifted(1, 3.5).expect("in range"), vec![1.0, 5.5]);
    }

    #[test]
    fn test_invalid_construction() {
        assert!(ProcessSimulator::independent(vec![1.0], &[1.0, 2.0], 0).is_err());
        assert!(ProcessSimulator::independent(vec![], &[], 0).is_err());
        assert!(ProcessSimulator::independent(vec![1.0], &[-1.0], 0).is_err());
        let not_pd = Matrix::from_rows(&[vec![1.0, 2.0], vec![2.0, 1.0]]).expect("square");
        assert!(matches!(
            ProcessSimulator::correlated(vec![0.0, 0.0], &not_pd, 0),
            Err(MspcError::SingularMatrix { .. })
        ));
        let mut sim = ProcessSimulator::demo(0);
        assert!(sim.sample_shifted(5, 1.0).is_err());
        assert!(sim.sample_shifted(0, f64::INFINITY).is_err());
    }
}
