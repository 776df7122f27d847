//! Engine configuration and partial updates.
//!
//! [`MonitorConfig`] serializes with the collaborator's camelCase field names
//! (`chartType`, `lambda`, `k`, `alpha`, `samplingInterval`, `variableNames`),
//! so a JSON settings payload can be deserialized directly into a
//! [`ConfigUpdate`] and merged into a running engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{MspcError, Result};
use crate::mspc::{default_variable_name, ChartType};

/// Default MEWMA smoothing constant.
pub const DEFAULT_LAMBDA: f64 = 0.2;
/// Default MCUSUM slack.
pub const DEFAULT_K: f64 = 0.5;
/// Default false-alarm rate for the Hotelling T² limit.
pub const DEFAULT_ALPHA: f64 = 0.05;
/// Default advisory sampling interval, in milliseconds.
pub const DEFAULT_SAMPLING_INTERVAL_MS: u64 = 5000;

/// Tunable parameters of one monitoring engine.
///
/// # Invariants (checked by [`MonitorConfig::validate`])
///
/// - `0 < lambda <= 1`
/// - `k >= 0` and finite
/// - `0 < alpha < 1`
/// - `sampling_interval_ms > 0`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitorConfig {
    /// Statistic used to classify observations.
    pub chart_type: ChartType,
    /// MEWMA smoothing constant.
    pub lambda: f64,
    /// MCUSUM slack.
    pub k: f64,
    /// False-alarm rate of the Hotelling T² limit.
    pub alpha: f64,
    /// Advisory sampling cadence for the caller; not enforced by the engine.
    #[serde(rename = "samplingInterval")]
    pub sampling_interval_ms: u64,
    /// Display names of the monitored variables, used in contributions.
    pub variable_names: Vec<String>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::default(),
            lambda: DEFAULT_LAMBDA,
            k: DEFAULT_K,
            alpha: DEFAULT_ALPHA,
            sampling_interval_ms: DEFAULT_SAMPLING_INTERVAL_MS,
            variable_names: Vec::new(),
        }
    }
}

impl MonitorConfig {
    /// Checks every parameter range.
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if !self.lambda.is_finite() || self.lambda <= 0.0 || self.lambda > 1.0 {
            return Err(MspcError::InvalidConfig(format!(
                "lambda must be in (0, 1], got {}",
                self.lambda
            )));
        }
        if !self.k.is_finite() || self.k < 0.0 {
            return Err(MspcError::InvalidConfig(format!(
                "k must be a non-negative finite number, got {}",
                self.k
            )));
        }
        if !self.alpha.is_finite() || self.alpha <= 0.0 || self.alpha >= 1.0 {
            return Err(MspcError::InvalidConfig(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if self.sampling_interval_ms == 0 {
            return Err(MspcError::InvalidConfig(
                "samplingInterval must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Checks that configured variable names, if any, match `p` variables.
    pub fn validate_names(&self, p: usize) -> Result<()> {
        if !self.variable_names.is_empty() && self.variable_names.len() != p {
            return Err(MspcError::InvalidConfig(format!(
                "{} variable names configured for {p} variables",
                self.variable_names.len()
            )));
        }
        Ok(())
    }

    /// Returns a copy of `self` with every field set in `update` replaced.
    pub fn merged(&self, update: &ConfigUpdate) -> Self {
        Self {
            chart_type: update.chart_type.unwrap_or(self.chart_type),
            lambda: update.lambda.unwrap_or(self.lambda),
            k: update.k.unwrap_or(self.k),
            alpha: update.alpha.unwrap_or(self.alpha),
            sampling_interval_ms: update
                .sampling_interval_ms
                .unwrap_or(self.sampling_interval_ms),
            variable_names: update
                .variable_names
                .clone()
                .unwrap_or_else(|| self.variable_names.clone()),
        }
    }

    /// Sampling interval as a [`Duration`].
    pub fn sampling_interval(&self) -> Duration {
        Duration::from_millis(self.sampling_interval_ms)
    }

    /// Display name of variable `index`.
    pub fn variable_name(&self, index: usize) -> String {
        self.variable_names
            .get(index)
            .cloned()
            .unwrap_or_else(|| default_variable_name(index))
    }
}

/// A partial configuration; `None` fields keep their current value.
///
/// # Examples
///
/// ```
/// use u_mspc::engine::{ConfigUpdate, MonitorConfig};
/// use u_mspc::mspc::ChartType;
///
/// let update = ConfigUpdate {
///     chart_type: Some(ChartType::Mewma),
///     lambda: Some(0.1),
///     ..ConfigUpdate::default()
/// };
/// let merged = MonitorConfig::default().merged(&update);
/// assert_eq!(merged.chart_type, ChartType::Mewma);
/// assert_eq!(merged.k, 0.5);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfigUpdate {
    pub chart_type: Option<ChartType>,
    pub lambda: Option<f64>,
    pub k: Option<f64>,
    pub alpha: Option<f64>,
    #[serde(rename = "samplingInterval")]
    pub sampling_interval_ms: Option<u64>,
    pub variable_names: Option<Vec<String>>,
}

impl ConfigUpdate {
    /// Whether the update leaves every field unchanged.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
