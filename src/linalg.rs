//! Dense linear algebra for small multivariate problems.
//!
//! Process monitoring only needs a handful of operations on vectors of
//! length p and p×p matrices, with p typically between 2 and 10: inversion,
//! matrix-vector products and quadratic forms, plus a Cholesky factor for
//! simulation and a symmetric eigen-decomposition for principal components.
//!
//! Covariance matrices are inverted through [`Matrix::inverse_covariance`],
//! which equalizes the diagonal first so the singularity test does not depend
//! on the units of individual variables.
//! All operations are pure: inputs are borrowed immutably and results are
//! freshly allocated.
//!
//! Matrices are stored row-major in a flat `Vec<f64>`.
//!
//! # References
//!
//! - Golub, G.H. & Van Loan, C.F. (2013). *Matrix Computations*, 4th ed.,
//!   Chapters 3 (Gaussian elimination), 4.2 (Cholesky), 8.5 (Jacobi methods).

use thiserror::Error;

/// Relative pivot tolerance below which a matrix is treated as singular.
///
/// A pivot `|u_kk| <= SINGULARITY_TOLERANCE * max|a_ij|` aborts inversion.
/// For covariances the test runs on the correlation matrix, whose scale is 1.
pub const SINGULARITY_TOLERANCE: f64 = 1e-10;

/// Maximum number of cyclic Jacobi sweeps before giving up.
const MAX_JACOBI_SWEEPS: usize = 100;

/// Off-diagonal Frobenius norm (relative) at which Jacobi iteration stops.
const JACOBI_TOLERANCE: f64 = 1e-14;

/// Errors raised by the linear algebra kernel.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinalgError {
    /// The matrix has no numerically stable inverse.
    #[error("matrix is numerically singular")]
    Singular,
    /// Operand dimensions are incompatible.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    /// Cholesky factorization met a non-positive pivot.
    #[error("matrix is not positive definite")]
    NotPositiveDefinite,
    /// Jacobi eigen-decomposition did not converge.
    #[error("eigen-decomposition did not converge after {sweeps} sweeps")]
    NoConvergence { sweeps: usize },
}

/// A dense square matrix in row-major order.
///
/// # Examples
///
/// ```
/// use u_mspc::linalg::Matrix;
///
/// let m = Matrix::new(2, vec![4.0, 0.0, 0.0, 9.0]).unwrap();
/// let inv = m.inverse().unwrap();
/// assert!((inv.get(0, 0) - 0.25).abs() < 1e-15);
/// assert!((inv.get(1, 1) - 1.0 / 9.0).abs() < 1e-15);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Matrix {
    n: usize,
    data: Vec<f64>,
}

impl Matrix {
    /// Creates an n×n matrix from row-major data.
    ///
    /// Fails if `data.len() != n * n`.
    pub fn new(n: usize, data: Vec<f64>) -> Result<Self, LinalgError> {
        if data.len() != n * n {
            return Err(LinalgError::DimensionMismatch {
                expected: n * n,
                actual: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    /// Creates a matrix from a slice of equally long rows.
    pub fn from_rows<R: AsRef<[f64]>>(rows: &[R]) -> Result<Self, LinalgError> {
        let n = rows.len();
        let mut data = Vec::with_capacity(n * n);
        for row in rows {
            let row = row.as_ref();
            if row.len() != n {
                return Err(LinalgError::DimensionMismatch {
                    expected: n,
                    actual: row.len(),
                });
            }
            data.extend_from_slice(row);
        }
        Ok(Self { n, data })
    }

    /// The n×n zero matrix.
    pub fn zeros(n: usize) -> Self {
        Self {
            n,
            data: vec![0.0; n * n],
        }
    }

    /// The n×n identity matrix.
    pub fn identity(n: usize) -> Self {
        let mut m = Self::zeros(n);
        for i in 0..n {
            m.data[i * n + i] = 1.0;
        }
        m
    }

    /// Creates a diagonal matrix.
    pub fn diagonal(values: &[f64]) -> Self {
        let n = values.len();
        let mut m = Self::zeros(n);
        for (i, &v) in values.iter().enumerate() {
            m.data[i * n + i] = v;
        }
        m
    }

    /// Number of rows (equal to the number of columns).
    pub fn dim(&self) -> usize {
        self.n
    }

    /// Entry at row `i`, column `j`.
    ///
    /// # Panics
    ///
    /// Panics if `i` or `j` is out of bounds.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }

    fn rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact(0) panics; an empty matrix has no rows anyway
        self.data.chunks_exact(self.n.max(1))
    }

    /// The main diagonal.
    pub fn diag(&self) -> Vec<f64> {
        (0..self.n).map(|i| self.get(i, i)).collect()
    }

    /// Row-major backing data.
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Largest absolute entry, used as the matrix scale for tolerances.
    fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0_f64, |acc, v| acc.max(v.abs()))
    }

    /// Whether `|a_ij - a_ji| <= tol * max|a|` for all entries.
    pub fn is_symmetric(&self, tol: f64) -> bool {
        let bound = tol * self.max_abs().max(1.0);
        (0..self.n).all(|i| {
            ((i + 1)..self.n).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= bound)
        })
    }

    /// Matrix-vector product `self · v`.
    pub fn mul_vec(&self, v: &[f64]) -> Result<Vec<f64>, LinalgError> {
        self.check_len(v.len())?;
        Ok(self.rows().map(|row| dot_unchecked(row, v)).collect())
    }

    /// Inverse via Gauss-Jordan elimination with partial pivoting.
    ///
    /// # Errors
    ///
    /// [`LinalgError::Singular`] if the matrix is empty, contains non-finite
    /// entries, or a pivot falls below [`SINGULARITY_TOLERANCE`] relative to
    /// the largest absolute entry.
    ///
    /// # Complexity
    ///
    /// Time: O(n³), Space: O(n²)
    pub fn inverse(&self) -> Result<Matrix, LinalgError> {
        let n = self.n;
        if n == 0 || self.data.iter().any(|v| !v.is_finite()) {
            return Err(LinalgError::Singular);
        }
        let scale = self.max_abs();
        if scale <= 0.0 {
            return Err(LinalgError::Singular);
        }
        let tol = SINGULARITY_TOLERANCE * scale;

        let mut a = self.data.clone();
        let mut inv = Matrix::identity(n).data;

        for col in 0..n {
            let (pivot_row, pivot_abs) = (col..n)
                .map(|r| (r, a[r * n + col].abs()))
                .fold((col, -1.0), |best, cur| if cur.1 > best.1 { cur } else { best });
            if pivot_abs <= tol {
                return Err(LinalgError::Singular);
            }

            if pivot_row != col {
                for c in 0..n {
                    a.swap(col * n + c, pivot_row * n + c);
                    inv.swap(col * n + c, pivot_row * n + c);
                }
            }

            let pivot = a[col * n + col];
            for c in 0..n {
                a[col * n + c] /= pivot;
                inv[col * n + c] /= pivot;
            }

            for r in 0..n {
                if r == col {
                    continue;
                }
                let factor = a[r * n + col];
                if factor == 0.0 {
                    continue;
                }
                for c in 0..n {
                    a[r * n + c] -= factor * a[col * n + c];
                    inv[r * n + c] -= factor * inv[col * n + c];
                }
            }
        }

        Ok(Matrix { n, data: inv })
    }

    /// Inverse of a covariance matrix, robust to variables on different scales.
    ///
    /// ```text
    /// D = diag(s_11, ..., s_pp)
    /// R = D^(-1/2) · S · D^(-1/2)
    /// S⁻¹ = D^(-1/2) · R⁻¹ · D^(-1/2)
    /// ```
    ///
    /// The pivot test of [`Matrix::inverse`] is applied to the correlation
    /// matrix `R`, so a variance of `1e-6` next to one of `1e5` is not
    /// mistaken for a singular direction.
    ///
    /// # Errors
    ///
    /// [`LinalgError::Singular`] if a variance is not strictly positive and
    /// finite (a constant variable), or if `R` is singular (collinear
    /// variables).
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mspc::linalg::Matrix;
    ///
    /// let cov = Matrix::diagonal(&[2.5e5, 1e-6]);
    /// let inv = cov.inverse_covariance().unwrap();
    /// assert!((inv.get(1, 1) - 1e6).abs() / 1e6 < 1e-12);
    /// ```
    pub fn inverse_covariance(&self) -> Result<Matrix, LinalgError> {
        let n = self.n;
        let diag = self.diag();
        if n == 0 || diag.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(LinalgError::Singular);
        }
        let inv_sd: Vec<f64> = diag.iter().map(|d| 1.0 / d.sqrt()).collect();

        let correlation = Matrix {
            n,
            data: (0..n * n)
                .map(|idx| self.data[idx] * inv_sd[idx / n] * inv_sd[idx % n])
                .collect(),
        };
        let r_inv = correlation.inverse()?;

        Ok(Matrix {
            n,
            data: (0..n * n)
                .map(|idx| r_inv.data[idx] * inv_sd[idx / n] * inv_sd[idx % n])
                .collect(),
        })
    }

    /// Lower-triangular Cholesky factor `L` with `L · Lᵀ = self`.
    ///
    /// Only the lower triangle of `self` is read.
    ///
    /// # Errors
    ///
    /// [`LinalgError::NotPositiveDefinite`] if a diagonal pivot is not
    /// strictly positive.
    pub fn cholesky(&self) -> Result<Matrix, LinalgError> {
        let n = self.n;
        let mut l = vec![0.0; n * n];
        for i in 0..n {
            for j in 0..=i {
                let partial: f64 = (0..j).map(|k| l[i * n + k] * l[j * n + k]).sum();
                let value = self.data[i * n + j] - partial;
                if i == j {
                    if value <= 0.0 || !value.is_finite() {
                        return Err(LinalgError::NotPositiveDefinite);
                    }
                    l[i * n + i] = value.sqrt();
                } else {
                    l[i * n + j] = value / l[j * n + j];
                }
            }
        }
        Ok(Matrix { n, data: l })
    }

    /// Eigen-decomposition of a symmetric matrix by cyclic Jacobi rotations.
    ///
    /// Eigenvalues are returned in the order they appear on the diagonal
    /// after convergence (unsorted). Column `k` of the returned eigenvector
    /// matrix is the unit eigenvector for eigenvalue `k`.
    ///
    /// # Reference
    ///
    /// Golub & Van Loan (2013), Section 8.5.2, "The Classical Jacobi Algorithm".
    pub fn symmetric_eigen(&self) -> Result<SymmetricEigen, LinalgError> {
        let n = self.n;
        let mut a = self.data.clone();
        let mut v = Matrix::identity(n).data;
        let norm: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();

        for _ in 0..MAX_JACOBI_SWEEPS {
            let off: f64 = (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .map(|(i, j)| a[i * n + j] * a[i * n + j])
                .sum();
            if off.sqrt() <= JACOBI_TOLERANCE * norm {
                let values = (0..n).map(|i| a[i * n + i]).collect();
                return Ok(SymmetricEigen {
                    values,
                    vectors: Matrix { n, data: v },
                });
            }

            for p in 0..n {
                for q in (p + 1)..n {
                    let apq = a[p * n + q];
                    if apq == 0.0 {
                        continue;
                    }
                    let theta = (a[q * n + q] - a[p * n + p]) / (2.0 * apq);
                    let t = if theta.abs() > 1e150 {
                        0.5 / theta
                    } else {
                        let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                        sign / (theta.abs() + (theta * theta + 1.0).sqrt())
                    };
                    let c = 1.0 / (t * t + 1.0).sqrt();
                    let s = t * c;

                    for k in 0..n {
                        let akp = a[k * n + p];
                        let akq = a[k * n + q];
                        a[k * n + p] = c * akp - s * akq;
                        a[k * n + q] = s * akp + c * akq;
                    }
                    for k in 0..n {
                        let apk = a[p * n + k];
                        let aqk = a[q * n + k];
                        a[p * n + k] = c * apk - s * aqk;
                        a[q * n + k] = s * apk + c * aqk;
                    }
                    for k in 0..n {
                        let vkp = v[k * n + p];
                        let vkq = v[k * n + q];
                        v[k * n + p] = c * vkp - s * vkq;
                        v[k * n + q] = s * vkp + c * vkq;
                    }
                }
            }
        }

        Err(LinalgError::NoConvergence {
            sweeps: MAX_JACOBI_SWEEPS,
        })
    }

    fn check_len(&self, len: usize) -> Result<(), LinalgError> {
        if len != self.n {
            return Err(LinalgError::DimensionMismatch {
                expected: self.n,
                actual: len,
            });
        }
        Ok(())
    }
}

/// Result of [`Matrix::symmetric_eigen`].
#[derive(Debug, Clone)]
pub struct SymmetricEigen {
    /// Eigenvalues, unsorted.
    pub values: Vec<f64>,
    /// Eigenvectors stored as columns.
    pub vectors: Matrix,
}

impl SymmetricEigen {
    /// Eigenvector `k` (column `k` of [`Self::vectors`]).
    pub fn vector(&self, k: usize) -> Vec<f64> {
        let n = self.vectors.dim();
        (0..n).map(|i| self.vectors.get(i, k)).collect()
    }
}

// ---------------------------------------------------------------------------
// Vector helpers
// ---------------------------------------------------------------------------

/// Quadratic form `vᵀ · M · v`.
///
/// Intended for `M` a positive-semi-definite (inverse) covariance; negative
/// results caused by floating-point round-off are clamped to zero. NaN is
/// propagated unchanged.
///
/// # Examples
///
/// ```
/// use u_mspc::linalg::{quadratic_form, Matrix};
///
/// let m = Matrix::diagonal(&[0.25, 1.0]);
/// let q = quadratic_form(&[2.0, 3.0], &m).unwrap();
/// assert!((q - 10.0).abs() < 1e-12);
/// ```
pub fn quadratic_form(v: &[f64], m: &Matrix) -> Result<f64, LinalgError> {
    let mv = m.mul_vec(v)?;
    let q = dot_unchecked(v, &mv);
    Ok(if q < 0.0 { 0.0 } else { q })
}

/// Element-wise difference `a - b`.
pub fn difference(a: &[f64], b: &[f64]) -> Result<Vec<f64>, LinalgError> {
    check_same_len(a, b)?;
    Ok(a.iter().zip(b).map(|(x, y)| x - y).collect())
}

/// `alpha * x + beta * y`, element-wise.
pub fn linear_combination(
    alpha: f64,
    x: &[f64],
    beta: f64,
    y: &[f64],
) -> Result<Vec<f64>, LinalgError> {
    check_same_len(x, y)?;
    Ok(x.iter().zip(y).map(|(a, b)| alpha * a + beta * b).collect())
}

fn dot_unchecked(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

fn check_same_len(a: &[f64], b: &[f64]) -> Result<(), LinalgError> {
    if a.len() != b.len() {
        return Err(LinalgError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}
