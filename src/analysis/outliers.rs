//! Mahalanobis-distance screening of Phase I samples.

use crate::error::{MspcError, Result};
use crate::mspc::Baseline;

/// Default distance above which a Phase I observation is flagged.
pub const DEFAULT_OUTLIER_THRESHOLD: f64 = 3.0;

/// Mahalanobis distance of every sample from the sample's own mean and
/// covariance.
///
/// # Errors
///
/// Same as [`Baseline::estimate`].
pub fn mahalanobis_distances<R: AsRef<[f64]>>(samples: &[R]) -> Result<Vec<f64>> {
    let baseline = Baseline::estimate(samples)?;
    samples
        .iter()
        .map(|row| baseline.mahalanobis_distance(row.as_ref()))
        .collect()
}

/// Indices of samples whose Mahalanobis distance exceeds `threshold`.
///
/// # Errors
///
/// - [`MspcError::InvalidInput`] if `threshold` is not positive and finite,
///   or the sample is malformed.
/// - [`MspcError::SingularMatrix`] if the sample covariance is singular.
///
/// # Examples
///
/// ```
/// use u_mspc::analysis::mahalanobis_outliers;
///
/// let mut samples: Vec<Vec<f64>> = (0..40)
///     .map(|i| vec![(i % 5) as f64, (i % 7) as f64])
///     .collect();
/// samples.push(vec![40.0, -30.0]);
///
/// let outliers = mahalanobis_outliers(&samples, 3.0).unwrap();
/// assert_eq!(outliers, vec![40]);
/// ```
pub fn mahalanobis_outliers<R: AsRef<[f64]>>(samples: &[R], threshold: f64) -> Result<Vec<usize>> {
    if !threshold.is_finite() || threshold <= 0.0 {
        return Err(MspcError::InvalidInput(format!(
            "outlier threshold must be positive, got {threshold}"
        )));
    }
    Ok(mahalanobis_distances(samples)?
        .into_iter()
        .enumerate()
        .filter(|&(_, d)| d > threshold)
        .map(|(i, _)| i)
        .collect())
}
