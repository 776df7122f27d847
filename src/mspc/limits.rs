//! Control limits for the multivariate charts.
//!
//! All three charts share a one-sided layout: an upper control limit (UCL)
//! and a center line (CL). Limits for every chart type are derived together
//! from the Phase I sample size `n`, the dimension `p`, the false-alarm rate
//! `alpha` and the MEWMA smoothing constant `lambda`, so switching charts at
//! runtime never requires re-baselining.
//!
//! # Formulas
//!
//! ```text
//! Hotelling T²:  UCL = chi2(p, alpha) · p(n+1)(n-1) / (n·p·(n-p)),   CL = p
//! MEWMA:         UCL = p · lambda / (2 - lambda),                     CL = 0
//! MCUSUM:        UCL = 5 · sqrt(p),                                    CL = 0
//! ```
//!
//! `chi2(p, alpha)` is the Wilson-Hilferty approximation of the upper-alpha
//! chi-square quantile. The MEWMA and MCUSUM limits are closed-form
//! approximations rather than ARL-calibrated limits.
//!
//! # References
//!
//! - Wilson, E.B. & Hilferty, M.M. (1931). "The distribution of chi-square",
//!   *PNAS* 17(12), pp. 684-688.
//! - Tracy, N.D., Young, J.C. & Mason, R.L. (1992). "Multivariate control
//!   charts for individual observations", *Journal of Quality Technology*
//!   24(2), pp. 88-95.
//! - Lowry, C.A. et al. (1992). "A multivariate exponentially weighted moving
//!   average control chart", *Technometrics* 34(1), pp. 46-53.

use serde::{Deserialize, Serialize};
use u_numflow::special;

use super::chart::ChartType;
use crate::error::{MspcError, Result};

/// Upper control limit and center line for one chart.
///
/// # Invariants
///
/// - `ucl > cl`
/// - Both values are finite
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ControlLimits {
    /// Upper control limit.
    pub ucl: f64,
    /// Center line.
    pub cl: f64,
}

/// Control limits for all chart types, computed from one baseline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LimitSet {
    /// Hotelling T² limits.
    pub hotelling_t2: ControlLimits,
    /// MEWMA limits.
    pub mewma: ControlLimits,
    /// MCUSUM limits.
    pub mcusum: ControlLimits,
}

impl LimitSet {
    /// Computes the limits of every chart type.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] if `p == 0` or `n <= p`.
    /// - [`MspcError::InvalidConfig`] if `alpha` or `lambda` is out of range,
    ///   if `alpha` is so small that the T² UCL is not finite, or so large
    ///   that the T² UCL would not exceed its center line.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mspc::mspc::LimitSet;
    ///
    /// let limits = LimitSet::compute(30, 5, 0.05, 0.2).unwrap();
    /// assert!(limits.hotelling_t2.ucl > limits.hotelling_t2.cl);
    /// assert!((limits.mewma.ucl - 5.0 * 0.2 / 1.8).abs() < 1e-12);
    /// assert!((limits.mcusum.ucl - 5.0 * 5.0_f64.sqrt()).abs() < 1e-12);
    /// ```
    pub fn compute(n: usize, p: usize, alpha: f64, lambda: f64) -> Result<Self> {
        if p == 0 {
            return Err(MspcError::InvalidInput(
                "control limits need at least one variable".into(),
            ));
        }
        if n <= p {
            return Err(MspcError::InvalidInput(format!(
                "control limits need more observations than variables (n={n}, p={p})"
            )));
        }
        if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
            return Err(MspcError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {alpha}"
            )));
        }
        if !lambda.is_finite() || lambda <= 0.0 || lambda > 1.0 {
            return Err(MspcError::InvalidConfig(format!(
                "lambda must be in (0, 1], got {lambda}"
            )));
        }

        let hotelling_t2 = ControlLimits {
            ucl: hotelling_t2_ucl(n, p, alpha),
            cl: p as f64,
        };
        if !hotelling_t2.ucl.is_finite() {
            return Err(MspcError::InvalidConfig(format!(
                "alpha={alpha} is too small: the T² UCL is not finite ({})",
                hotelling_t2.ucl
            )));
        }
        if hotelling_t2.ucl <= hotelling_t2.cl {
            return Err(MspcError::InvalidConfig(format!(
                "alpha={alpha} places the T² UCL ({}) at or below the center line ({})",
                hotelling_t2.ucl, hotelling_t2.cl
            )));
        }

        Ok(Self {
            hotelling_t2,
            mewma: ControlLimits {
                ucl: mewma_ucl(p, lambda),
                cl: 0.0,
            },
            mcusum: ControlLimits {
                ucl: mcusum_ucl(p),
                cl: 0.0,
            },
        })
    }

    /// Limits of the given chart type.
    pub fn for_chart(&self, chart_type: ChartType) -> ControlLimits {
        match chart_type {
            ChartType::HotellingT2 => self.hotelling_t2,
            ChartType::Mewma => self.mewma,
            ChartType::Mcusum => self.mcusum,
        }
    }
}

/// Wilson-Hilferty approximation of the upper-`alpha` chi-square quantile.
///
/// ```text
/// chi2(df, alpha) ≈ df · (1 - 2/(9·df) + z_{1-alpha} · sqrt(2/(9·df)))³
/// ```
///
/// Accurate to about 1% for `df >= 2` at conventional `alpha`.
pub fn chi_squared_critical(df: usize, alpha: f64) -> f64 {
    let df = df as f64;
    let z = special::inverse_normal_cdf(1.0 - alpha);
    let h = 2.0 / (9.0 * df);
    df * (1.0 - h + z * h.sqrt()).powi(3)
}

/// Phase II Hotelling T² upper control limit for individual observations.
///
/// ```text
/// UCL = chi2(p, alpha) · p(n+1)(n-1) / (n·p·(n-p))
/// ```
pub fn hotelling_t2_ucl(n: usize, p: usize, alpha: f64) -> f64 {
    let nf = n as f64;
    let pf = p as f64;
    chi_squared_critical(p, alpha) * pf * (nf + 1.0) * (nf - 1.0) / (nf * pf * (nf - pf))
}

/// Asymptotic MEWMA upper control limit, `p · lambda / (2 - lambda)`.
pub fn mewma_ucl(p: usize, lambda: f64) -> f64 {
    p as f64 * lambda / (2.0 - lambda)
}

/// MCUSUM upper control limit, `5 · sqrt(p)`.
pub fn mcusum_ucl(p: usize) -> f64 {
    5.0 * (p as f64).sqrt()
}
