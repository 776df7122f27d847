//! Per-variable process capability from the baseline.
//!
//! Each monitored variable is assessed on its own, using the baseline mean
//! and the square root of its covariance diagonal:
//!
//! ```text
//! Cp  = (USL - LSL) / (6·sigma)
//! Cpu = (USL - mu) / (3·sigma),   Cpl = (mu - LSL) / (3·sigma)
//! Cpk = min(Cpu, Cpl)
//! ```
//!
//! A variable without specification limits is assessed against its natural
//! tolerance `mu ± 3·sigma`, which yields `Cp = Cpk = 1`.
//!
//! # Reference
//!
//! Montgomery (2019), *Introduction to Statistical Quality Control*, 8th ed.,
//! Chapter 8.

use serde::Serialize;

use crate::error::{MspcError, Result};
use crate::mspc::{default_variable_name, Baseline};

/// Two-sided specification limits for one variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpecLimits {
    lsl: f64,
    usl: f64,
}

impl SpecLimits {
    /// Creates specification limits.
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidInput`] if either limit is non-finite or
    /// `usl <= lsl`.
    pub fn new(lsl: f64, usl: f64) -> Result<Self> {
        if !lsl.is_finite() || !usl.is_finite() {
            return Err(MspcError::InvalidInput(
                "specification limits must be finite".into(),
            ));
        }
        if usl <= lsl {
            return Err(MspcError::InvalidInput(format!(
                "USL ({usl}) must be greater than LSL ({lsl})"
            )));
        }
        Ok(Self { lsl, usl })
    }

    /// Lower specification limit.
    pub fn lsl(&self) -> f64 {
        self.lsl
    }

    /// Upper specification limit.
    pub fn usl(&self) -> f64 {
        self.usl
    }
}

/// Capability indices of one variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableCapability {
    /// Variable name.
    pub name: String,
    /// Baseline mean.
    pub mean: f64,
    /// Baseline standard deviation.
    pub std_dev: f64,
    /// Limits the indices were computed against.
    pub limits: SpecLimits,
    /// Potential capability.
    pub cp: f64,
    /// Upper one-sided capability.
    pub cpu: f64,
    /// Lower one-sided capability.
    pub cpl: f64,
    /// Actual capability, `min(cpu, cpl)`.
    pub cpk: f64,
}

/// Computes Cp/Cpk for every baseline variable.
///
/// `specs[i]` applies to variable `i`; missing or `None` entries use the
/// natural tolerance. `names[i]` labels variable `i`, falling back to
/// `"Variable {i+1}"`.
///
/// # Errors
///
/// [`MspcError::InvalidInput`] if more specifications than variables are
/// given.
///
/// # Examples
///
/// ```
/// use u_mspc::analysis::{variable_capability, SpecLimits};
/// use u_mspc::linalg::Matrix;
/// use u_mspc::mspc::Baseline;
///
/// let baseline =
///     Baseline::from_parameters(vec![100.0, 50.0], Matrix::diagonal(&[25.0, 9.0]), 30).unwrap();
/// let specs = [Some(SpecLimits::new(70.0, 130.0).unwrap()), None];
/// let caps = variable_capability(&baseline, &specs, &[]).unwrap();
/// assert!((caps[0].cp - 2.0).abs() < 1e-12);
/// assert!((caps[1].cpk - 1.0).abs() < 1e-12);
/// ```
pub fn variable_capability(
    baseline: &Baseline,
    specs: &[Option<SpecLimits>],
    names: &[String],
) -> Result<Vec<VariableCapability>> {
    let p = baseline.dimension();
    if specs.len() > p {
        return Err(MspcError::InvalidInput(format!(
            "{} specifications given for {p} variables",
            specs.len()
        )));
    }

    let means = baseline.means();
    let std_devs = baseline.std_devs();

    (0..p)
        .map(|i| {
            let mean = means[i];
            let sigma = std_devs[i];
            let limits = match specs.get(i).copied().flatten() {
                Some(limits) => limits,
                None => SpecLimits::new(mean - 3.0 * sigma, mean + 3.0 * sigma)?,
            };
            let cp = (limits.usl - limits.lsl) / (6.0 * sigma);
            let cpu = (limits.usl - mean) / (3.0 * sigma);
            let cpl = (mean - limits.lsl) / (3.0 * sigma);
            Ok(VariableCapability {
                name: names
                    .get(i)
                    .cloned()
                    .unwrap_or_else(|| default_variable_name(i)),
                mean,
                std_dev: sigma,
                limits,
                cp,
                cpu,
                cpl,
                cpk: cpu.min(cpl),
            })
        })
        .collect()
}
