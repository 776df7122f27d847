//! Error types for multivariate process monitoring.
//!
//! Every fallible operation in the crate returns [`Result<T>`], an alias over
//! [`MspcError`]. Baseline and configuration errors are surfaced synchronously
//! to the caller; per-observation numeric failures are reported as
//! [`MspcError::Computation`] and never corrupt the carried chart state.

use thiserror::Error;

use crate::linalg::LinalgError;

/// Primary error type for the monitoring engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MspcError {
    /// A processing call was made before Phase I completed successfully.
    #[error("engine not initialized: run Phase I first")]
    NotInitialized,

    /// Malformed Phase I sample set or observation.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The baseline covariance matrix (or a scaled variant) is not invertible.
    #[error("singular covariance matrix: {context}")]
    SingularMatrix { context: String },

    /// Out-of-range configuration value.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Numeric failure while computing the statistic for one observation.
    #[error("computation failed: {0}")]
    Computation(String),

    /// No engine is registered under the given stream id.
    #[error("unknown stream: '{0}'")]
    UnknownStream(String),
}

impl MspcError {
    /// Whether the error is scoped to a single observation, so monitoring can
    /// continue with the next one.
    pub fn is_per_observation(&self) -> bool {
        matches!(self, Self::Computation(_) | Self::InvalidInput(_))
    }
}

impl From<LinalgError> for MspcError {
    fn from(err: LinalgError) -> Self {
        match err {
            LinalgError::Singular | LinalgError::NotPositiveDefinite => Self::SingularMatrix {
                context: err.to_string(),
            },
            LinalgError::DimensionMismatch { .. } => Self::InvalidInput(err.to_string()),
            LinalgError::NoConvergence { .. } => Self::Computation(err.to_string()),
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MspcError>;
