//! The monitoring engine for a single process stream.
//!
//! [`SpcEngine`] owns everything one stream needs: the configuration, and,
//! once Phase I has run, the baseline, the control limits of every chart and
//! the carried state of the selected chart. The baseline-dependent parts live
//! together in one optional value, so "uninitialized" and "ready" are the two
//! states of that option and [`SpcEngine::reset`] clears them as a unit.
//!
//! Observations must be processed strictly in order: MEWMA and MCUSUM depend
//! on the carried state of the previous call. Every mutating method takes
//! `&mut self`, so callers sharing an engine across threads must serialize
//! access (for example behind a mutex, one engine per stream).

use serde::Serialize;
use tracing::{debug, info, warn};

use super::config::{ConfigUpdate, MonitorConfig};
use crate::error::{MspcError, Result};
use crate::mspc::{
    contributions, Baseline, ChartParams, ChartState, ChartType, Contribution, LimitSet, Status,
};

/// Outcome of processing one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Zero-based position of the observation since the current baseline.
    pub index: u64,
    /// The observation as received.
    pub observation: Vec<f64>,
    /// Chart that produced the statistic.
    pub chart_type: ChartType,
    /// Chart statistic, finite and non-negative.
    pub statistic: f64,
    /// UCL the statistic was classified against.
    pub ucl: f64,
    /// Classification of the statistic.
    pub status: Status,
    /// Whether the status is strictly worse than the previous observation's.
    pub escalated: bool,
    /// Per-variable contributions, sorted descending.
    pub contributions: Vec<Contribution>,
}

impl ProcessingResult {
    /// Builds an alert for warning and critical results.
    ///
    /// Returns `None` when the status is normal.
    pub fn alert(&self) -> Option<Alert> {
        if !self.status.is_alarm() {
            return None;
        }
        Some(Alert {
            severity: self.status,
            chart_type: self.chart_type,
            statistic: self.statistic,
            message: format!(
                "Process {}: {} statistic = {:.4}",
                self.status, self.chart_type, self.statistic
            ),
        })
    }

    /// Name of the variable with the largest contribution.
    pub fn top_contributor(&self) -> Option<&str> {
        self.contributions.first().map(|c| c.name.as_str())
    }
}

/// Out-of-control notification derived from a [`ProcessingResult`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Warning or critical.
    pub severity: Status,
    /// Chart that raised the alert.
    pub chart_type: ChartType,
    /// Statistic that crossed the threshold.
    pub statistic: f64,
    /// Human-readable summary.
    pub message: String,
}

/// Baseline-dependent state; present only while the engine is ready.
#[derive(Debug, Clone)]
struct Ready {
    baseline: Baseline,
    limits: LimitSet,
    chart: ChartState,
    last_status: Status,
    processed: u64,
}

/// Multivariate SPC engine for one process stream.
///
/// # Examples
///
/// ```
/// use u_mspc::engine::SpcEngine;
/// use u_mspc::mspc::Status;
///
/// let phase_i = vec![
///     vec![10.0, 20.0],
///     vec![12.0, 19.0],
///     vec![11.0, 22.0],
///     vec![9.0, 21.0],
///     vec![10.5, 19.5],
///     vec![11.5, 20.5],
/// ];
///
/// let mut engine = SpcEngine::new();
/// engine.initialize_phase_i(&phase_i).unwrap();
///
/// let result = engine.process_observation(&[10.75, 20.3]).unwrap();
/// assert_eq!(result.status, Status::Normal);
/// assert_eq!(result.contributions.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SpcEngine {
    config: MonitorConfig,
    ready: Option<Ready>,
}

impl SpcEngine {
    /// Creates an uninitialized engine with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an uninitialized engine with a validated configuration.
    pub fn with_config(config: MonitorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ready: None,
        })
    }

    /// Whether Phase I has completed and observations can be processed.
    pub fn is_initialized(&self) -> bool {
        self.ready.is_some()
    }

    /// Estimates the baseline from Phase I observations and derives the
    /// control limits of every chart.
    ///
    /// Replaces any previous baseline and clears carried chart state. On
    /// error the engine is left exactly as it was.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] for an empty, ragged, non-finite or too
    ///   small sample.
    /// - [`MspcError::SingularMatrix`] if the covariance is not invertible.
    /// - [`MspcError::InvalidConfig`] if configured variable names do not
    ///   match the sample's dimension.
    pub fn initialize_phase_i<R: AsRef<[f64]>>(&mut self, samples: &[R]) -> Result<()> {
        let baseline = Baseline::estimate(samples)?;
        self.install(baseline)
    }

    /// Installs a baseline built from known parameters.
    pub fn initialize_with_baseline(&mut self, baseline: Baseline) -> Result<()> {
        self.install(baseline)
    }

    fn install(&mut self, baseline: Baseline) -> Result<()> {
        let p = baseline.dimension();
        let n = baseline.sample_size();
        self.config.validate_names(p)?;
        let limits = LimitSet::compute(n, p, self.config.alpha, self.config.lambda)?;

        info!(
            n,
            p,
            t2_ucl = limits.hotelling_t2.ucl,
            mewma_ucl = limits.mewma.ucl,
            mcusum_ucl = limits.mcusum.ucl,
            "Phase I baseline installed"
        );

        self.ready = Some(Ready {
            chart: ChartState::cold(self.config.chart_type, p),
            baseline,
            limits,
            last_status: Status::Normal,
            processed: 0,
        });
        Ok(())
    }

    /// Computes the selected chart's statistic, status and contributions for
    /// one observation, advancing the carried chart state.
    ///
    /// # Errors
    ///
    /// - [`MspcError::NotInitialized`] before a successful Phase I.
    /// - [`MspcError::InvalidInput`] if the observation has the wrong length
    ///   or non-finite values.
    /// - [`MspcError::Computation`] if the statistic cannot be computed.
    ///
    /// Per-observation errors leave the carried state unchanged; the next
    /// observation is processed normally.
    pub fn process_observation(&mut self, observation: &[f64]) -> Result<ProcessingResult> {
        let config = &self.config;
        let ready = self.ready.as_mut().ok_or(MspcError::NotInitialized)?;

        let deviation = ready.baseline.deviation(observation)?;
        let covariance_inverse = ready.baseline.covariance_inverse();
        let params = ChartParams {
            lambda: config.lambda,
            k: config.k,
        };

        let step = ready
            .chart
            .step(&deviation, covariance_inverse, params)
            .map_err(|err| {
                warn!(index = ready.processed, error = %err, "observation rejected");
                err
            })?;
        let contributions = contributions(&deviation, covariance_inverse, &config.variable_names)
            .map_err(|err| MspcError::Computation(err.to_string()))?;

        let chart_type = ready.chart.chart_type();
        let ucl = ready.limits.for_chart(chart_type).ucl;
        let status = Status::classify(step.statistic, ucl);
        let escalated = status > ready.last_status;
        let index = ready.processed;

        ready.chart = step.next;
        ready.last_status = status;
        ready.processed += 1;

        if escalated {
            warn!(
                index,
                chart = %chart_type,
                statistic = step.statistic,
                ucl,
                status = %status,
                "process status escalated"
            );
        } else {
            debug!(
                index,
                chart = %chart_type,
                statistic = step.statistic,
                status = %status,
                "observation processed"
            );
        }

        Ok(ProcessingResult {
            index,
            observation: observation.to_vec(),
            chart_type,
            statistic: step.statistic,
            ucl,
            status,
            escalated,
            contributions,
        })
    }

    /// Merges a partial configuration.
    ///
    /// Does not re-baseline. When the engine is ready, a changed `alpha` or
    /// `lambda` recomputes the control limits against the current baseline
    /// and a changed chart type starts the new chart from a cold state. The
    /// update is applied atomically: on error nothing changes.
    ///
    /// # Errors
    ///
    /// [`MspcError::InvalidConfig`] for out-of-range values or variable
    /// names that do not match the baseline dimension.
    pub fn update_configuration(&mut self, update: ConfigUpdate) -> Result<()> {
        let merged = self.config.merged(&update);
        merged.validate()?;

        if let Some(ready) = self.ready.as_mut() {
            let p = ready.baseline.dimension();
            merged.validate_names(p)?;

            let limits = if merged.alpha != self.config.alpha || merged.lambda != self.config.lambda
            {
                LimitSet::compute(ready.baseline.sample_size(), p, merged.alpha, merged.lambda)?
            } else {
                ready.limits
            };

            ready.limits = limits;
            if merged.chart_type != ready.chart.chart_type() {
                ready.chart = ChartState::cold(merged.chart_type, p);
                ready.last_status = Status::Normal;
            }
        }

        debug!(
            chart = %merged.chart_type,
            lambda = merged.lambda,
            k = merged.k,
            alpha = merged.alpha,
            sampling_interval_ms = merged.sampling_interval_ms,
            "configuration updated"
        );
        self.config = merged;
        Ok(())
    }

    /// Current configuration.
    pub fn configuration(&self) -> &MonitorConfig {
        &self.config
    }

    /// Clears the baseline, control limits and carried chart state together.
    ///
    /// The configuration is kept. Processing fails with
    /// [`MspcError::NotInitialized`] until Phase I is run again.
    pub fn reset(&mut self) {
        if self.ready.take().is_some() {
            info!("engine reset; Phase I required");
        }
    }

    /// The installed baseline.
    pub fn baseline(&self) -> Result<&Baseline> {
        self.ready
            .as_ref()
            .map(|r| &r.baseline)
            .ok_or(MspcError::NotInitialized)
    }

    /// Control limits of every chart for the installed baseline.
    pub fn control_limits(&self) -> Result<LimitSet> {
        self.ready
            .as_ref()
            .map(|r| r.limits)
            .ok_or(MspcError::NotInitialized)
    }

    /// Carried state of the selected chart, `None` before Phase I.
    pub fn chart_state(&self) -> Option<&ChartState> {
        self.ready.as_ref().map(|r| &r.chart)
    }

    /// Number of observations processed since the current baseline.
    pub fn processed_count(&self) -> u64 {
        self.ready.as_ref().map_or(0, |r| r.processed)
    }
}
