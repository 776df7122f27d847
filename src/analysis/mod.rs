//! Phase I diagnostics.
//!
//! Tools for vetting a Phase I sample before it becomes the in-control
//! baseline, and for describing the baseline once installed.
//!
//! - [`mahalanobis_outliers`] — flag observations far from the sample mean
//! - [`principal_components`] — eigen-structure of the baseline covariance
//! - [`variable_capability`] — per-variable Cp/Cpk against specification limits
//!
//! # References
//!
//! - Mason, R.L. & Young, J.C. (2002). *Multivariate Statistical Process
//!   Control with Industrial Applications*, SIAM, Chapter 5 (Phase I cleaning).
//! - Jolliffe, I.T. (2002). *Principal Component Analysis*, 2nd ed., Springer.

mod capability;
mod outliers;
mod pca;

pub use capability::{variable_capability, SpecLimits, VariableCapability};
pub use outliers::{mahalanobis_distances, mahalanobis_outliers, DEFAULT_OUTLIER_THRESHOLD};
pub use pca::{principal_components, PrincipalComponents};
