//! Principal components of the baseline covariance.

use serde::Serialize;

use crate::error::Result;
use crate::mspc::Baseline;

/// Eigen-structure of a covariance matrix, ordered by decreasing variance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrincipalComponents {
    /// Eigenvalues (component variances), descending.
    pub eigenvalues: Vec<f64>,
    /// Unit eigenvectors; `eigenvectors[k]` belongs to `eigenvalues[k]`.
    /// Each vector is signed so its largest-magnitude loading is positive.
    pub eigenvectors: Vec<Vec<f64>>,
    /// Percent of total variance explained by each component.
    pub variance_explained: Vec<f64>,
    /// Running sum of `variance_explained`.
    pub cumulative_variance: Vec<f64>,
}

impl PrincipalComponents {
    /// Smallest number of components explaining at least `percent` of the
    /// total variance.
    pub fn components_for(&self, percent: f64) -> usize {
        self.cumulative_variance
            .iter()
            .position(|&c| c >= percent - 1e-9)
            .map_or(self.cumulative_variance.len(), |i| i + 1)
    }
}

/// Principal components of the baseline covariance matrix.
///
/// # Errors
///
/// [`crate::MspcError::Computation`] if the Jacobi iteration does not converge.
///
/// # Examples
///
/// ```
/// use u_mspc::analysis::principal_components;
/// use u_mspc::linalg::Matrix;
/// use u_mspc::mspc::Baseline;
///
/// let cov = Matrix::from_rows(&[vec![2.0, 1.0], vec![1.0, 2.0]]).unwrap();
/// let baseline = Baseline::from_parameters(vec![0.0, 0.0], cov, 50).unwrap();
/// let pca = principal_components(&baseline).unwrap();
/// assert!((pca.eigenvalues[0] - 3.0).abs() < 1e-12);
/// assert!((pca.variance_explained[0] - 75.0).abs() < 1e-9);
/// ```
pub fn principal_components(baseline: &Baseline) -> Result<PrincipalComponents> {
    let eig = baseline.covariance().symmetric_eigen()?;

    let mut order: Vec<usize> = (0..eig.values.len()).collect();
    order.sort_by(|&a, &b| eig.values[b].total_cmp(&eig.values[a]));

    let eigenvalues: Vec<f64> = order.iter().map(|&k| eig.values[k]).collect();
    let eigenvectors: Vec<Vec<f64>> = order
        .iter()
        .map(|&k| {
            let v = eig.vector(k);
            let pivot = v
                .iter()
                .copied()
                .fold(0.0_f64, |acc, x| if x.abs() > acc.abs() { x } else { acc });
            if pivot < 0.0 {
                v.into_iter().map(|x| -x).collect()
            } else {
                v
            }
        })
        .collect();

    let total: f64 = eigenvalues.iter().sum();
    let variance_explained: Vec<f64> = eigenvalues
        .iter()
        .map(|&l| if total > 0.0 { 100.0 * l / total } else { 0.0 })
        .collect();
    let cumulative_variance = variance_explained
        .iter()
        .scan(0.0, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect();

    Ok(PrincipalComponents {
        eigenvalues,
        eigenvectors,
        variance_explained,
        cumulative_variance,
    })
}
