//! Multivariate statistical process control.
//!
//! Building blocks of the monitoring engine: the Phase I [`Baseline`], the
//! [`LimitSet`] of every chart, the per-chart statistics and the
//! [`contributions`] decomposition used for root-cause triage.
//!
//! # Charts
//!
//! - [`hotelling`] — Hotelling T², memoryless; reacts to large shifts
//! - [`mewma`] — Multivariate EWMA, exponentially decaying memory
//! - [`mcusum`] — Multivariate CUSUM, cumulative memory beyond a slack `k`
//!
//! No single statistic dominates across shift magnitudes, so the chart is
//! selected per engine through [`ChartType`].
//!
//! # References
//!
//! - Montgomery, D.C. (2019). *Introduction to Statistical Quality Control*,
//!   8th ed., Chapter 11.
//! - Lowry, C.A. & Montgomery, D.C. (1995). "A review of multivariate control
//!   charts", *IIE Transactions* 27(6), pp. 800-810.

mod baseline;
mod chart;
mod contribution;
pub mod hotelling;
mod limits;
pub mod mcusum;
pub mod mewma;

pub use baseline::Baseline;
pub use chart::{ChartParams, ChartState, ChartStep, ChartType, Status, WARNING_FRACTION};
pub use contribution::{contributions, default_variable_name, Contribution};
pub use limits::{
    chi_squared_critical, hotelling_t2_ucl, mcusum_ucl, mewma_ucl, ControlLimits, LimitSet,
};
