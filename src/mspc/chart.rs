//! Chart selection, status classification and carried chart state.
//!
//! [`ChartState`] is a tagged union over the three multivariate charts, each
//! variant carrying exactly the memory its statistic needs: Hotelling T² is
//! memoryless, MEWMA carries the previous smoothed deviation vector and
//! MCUSUM carries the cumulative sum vector. [`ChartState::step`] is pure:
//! it returns the statistic together with the successor state and leaves
//! `self` untouched, so a failed computation never corrupts carried state.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{hotelling, mcusum, mewma};
use crate::error::{MspcError, Result};
use crate::linalg::Matrix;

/// Fraction of the UCL above which a statistic is classified as a warning.
pub const WARNING_FRACTION: f64 = 0.8;

/// The monitoring statistic used by an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ChartType {
    /// Hotelling T² (memoryless squared Mahalanobis distance).
    #[default]
    #[serde(rename = "hotellingT2")]
    HotellingT2,
    /// Multivariate exponentially weighted moving average.
    #[serde(rename = "mewma")]
    Mewma,
    /// Multivariate cumulative sum.
    #[serde(rename = "mcusum")]
    Mcusum,
}

impl ChartType {
    /// Every chart type, in declaration order.
    pub const ALL: [ChartType; 3] = [ChartType::HotellingT2, ChartType::Mewma, ChartType::Mcusum];

    /// Wire name (`"hotellingT2"`, `"mewma"`, `"mcusum"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartType::HotellingT2 => "hotellingT2",
            ChartType::Mewma => "mewma",
            ChartType::Mcusum => "mcusum",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = MspcError;

    fn from_str(s: &str) -> Result<Self> {
        ChartType::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| MspcError::InvalidConfig(format!("unknown chart type '{s}'")))
    }
}

/// Classification of a statistic against its chart's UCL.
///
/// Ordered by severity: `Normal < Warning < Critical`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Statistic at or below `WARNING_FRACTION · UCL`.
    #[default]
    Normal,
    /// Statistic above `WARNING_FRACTION · UCL` but not above the UCL.
    Warning,
    /// Statistic above the UCL.
    Critical,
}

impl Status {
    /// Classifies `statistic` against `ucl`.
    ///
    /// # Examples
    ///
    /// ```
    /// use u_mspc::mspc::Status;
    ///
    /// assert_eq!(Status::classify(4.0, 10.0), Status::Normal);
    /// assert_eq!(Status::classify(8.5, 10.0), Status::Warning);
    /// assert_eq!(Status::classify(10.5, 10.0), Status::Critical);
    /// ```
    pub fn classify(statistic: f64, ucl: f64) -> Self {
        if statistic > ucl {
            Status::Critical
        } else if statistic > WARNING_FRACTION * ucl {
            Status::Warning
        } else {
            Status::Normal
        }
    }

    /// Whether this status should raise an alert.
    pub fn is_alarm(&self) -> bool {
        *self != Status::Normal
    }

    /// Lowercase name (`"normal"`, `"warning"`, `"critical"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Normal => "normal",
            Status::Warning => "warning",
            Status::Critical => "critical",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tuning parameters consumed by the stateful charts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartParams {
    /// MEWMA smoothing constant, in (0, 1].
    pub lambda: f64,
    /// MCUSUM slack (reference value), non-negative.
    pub k: f64,
}

/// Carried state of the selected chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartState {
    /// Hotelling T² carries nothing.
    HotellingT2,
    /// MEWMA carries the previous smoothed vector, `None` before the first
    /// observation.
    Mewma { previous: Option<Vec<f64>> },
    /// MCUSUM carries the cumulative sum vector, starting at zero.
    Mcusum { cusum: Vec<f64> },
}

/// Outcome of one successful [`ChartState::step`].
#[derive(Debug, Clone, PartialEq)]
pub struct ChartStep {
    /// The chart statistic, finite and non-negative.
    pub statistic: f64,
    /// State to carry into the next observation.
    pub next: ChartState,
}

impl ChartState {
    /// Fresh state for `chart_type` over `p` variables.
    pub fn cold(chart_type: ChartType, p: usize) -> Self {
        match chart_type {
            ChartType::HotellingT2 => ChartState::HotellingT2,
            ChartType::Mewma => ChartState::Mewma { previous: None },
            ChartType::Mcusum => ChartState::Mcusum {
                cusum: vec![0.0; p],
            },
        }
    }

    /// The chart this state belongs to.
    pub fn chart_type(&self) -> ChartType {
        match self {
            ChartState::HotellingT2 => ChartType::HotellingT2,
            ChartState::Mewma { .. } => ChartType::Mewma,
            ChartState::Mcusum { .. } => ChartType::Mcusum,
        }
    }

    /// Computes the statistic for one deviation vector `x - mean`.
    ///
    /// `covariance_inverse` is the inverse of the baseline covariance.
    ///
    /// # Errors
    ///
    /// [`MspcError::Computation`] on a dimension mismatch or a non-finite
    /// statistic. `self` is never modified.
    pub fn step(
        &self,
        deviation: &[f64],
        covariance_inverse: &Matrix,
        params: ChartParams,
    ) -> Result<ChartStep> {
        let (statistic, next) = match self {
            ChartState::HotellingT2 => {
                let t2 = hotelling::t_squared(deviation, covariance_inverse).map_err(computation)?;
                (t2, ChartState::HotellingT2)
            }
            ChartState::Mewma { previous } => {
                let vector = mewma::smooth(previous.as_deref(), deviation, params.lambda)
                    .map_err(computation)?;
                let statistic = mewma::statistic(&vector, covariance_inverse, params.lambda)
                    .map_err(computation)?;
                (
                    statistic,
                    ChartState::Mewma {
                        previous: Some(vector),
                    },
                )
            }
            ChartState::Mcusum { cusum } => {
                let vector = mcusum::accumulate(cusum, deviation, covariance_inverse, params.k)
                    .map_err(computation)?;
                let statistic =
                    mcusum::statistic(&vector, covariance_inverse).map_err(computation)?;
                (statistic, ChartState::Mcusum { cusum: vector })
            }
        };

        if !statistic.is_finite() {
            return Err(MspcError::Computation(format!(
                "{} statistic is not finite ({statistic})",
                self.chart_type()
            )));
        }
        Ok(ChartStep { statistic, next })
    }
}

fn computation(err: crate::linalg::LinalgError) -> MspcError {
    MspcError::Computation(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: ChartParams = ChartParams {
        lambda: 0.2,
        k: 0.5,
    };

    #[test]
    fn test_chart_type_round_trip_names() {
        for chart in ChartType::ALL {
            assert_eq!(chart.as_str().parse::<ChartType>(), Ok(chart));
        }
        assert!(matches!(
            "xbar".parse::<ChartType>(),
            Err(MspcError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_chart_type_serde_names() {
        let json = serde_json::to_string(&ChartType::HotellingT2).expect("serializable");
        assert_eq!(json, "\"hotellingT2\"");
        let parsed: ChartType = serde_json::from_str("\"mcusum\"").expect("known name");
        assert_eq!(parsed, ChartType::Mcusum);
    }

    #[test]
    fn test_status_boundaries() {
        // Exactly at 0.8·UCL is still normal; exactly at UCL is a warning.
        assert_eq!(Status::classify(8.0, 10.0), Status::Normal);
        assert_eq!(Status::classify(10.0, 10.0), Status::Warning);
        assert_eq!(Status::classify(0.0, 10.0), Status::Normal);
    }

    #[test]
    fn test_status_ordering() {
        assert!(Status::Normal < Status::Warning);
        assert!(Status::Warning < Status::Critical);
        assert!(!Status::Normal.is_alarm());
        assert!(Status::Warning.is_alarm());
        assert_eq!(Status::Critical.to_string(), "critical");
    }

    #[test]
    fn test_cold_states() {
        assert_eq!(ChartState::cold(ChartType::HotellingT2, 3), ChartState::HotellingT2);
        assert_eq!(
            ChartState::cold(ChartType::Mewma, 3),
            ChartState::Mewma { previous: None }
        );
        assert_eq!(
            ChartState::cold(ChartType::Mcusum, 3),
            ChartState::Mcusum {
                cusum: vec![0.0; 3]
            }
        );
        for chart in ChartType::ALL {
            assert_eq!(ChartState::cold(chart, 2).chart_type(), chart);
        }
    }

    #[test]
    fn test_step_does_not_mutate_on_success() {
        let inv = Matrix::identity(1);
        let state = ChartState::cold(ChartType::Mewma, 1);
        let step = state.step(&[10.0], &inv, PARAMS).expect("finite");
        assert_eq!(state, ChartState::Mewma { previous: None });
        match step.next {
            ChartState::Mewma {
                previous: Some(ref v),
            } => assert!((v[0] - 2.0).abs() < 1e-12),
            ref other => panic!("unexpected successor {other:?}"),
        }
    }

    #[test]
    fn test_step_rejects_non_finite_statistic() {
        let inv = Matrix::identity(2);
        let state = ChartState::cold(ChartType::HotellingT2, 2);
        let err = state
            .step(&[1e200, 1e200], &inv, PARAMS)
            .expect_err("overflow must be reported");
        assert!(matches!(err, MspcError::Computation(_)));
    }

    #[test]
    fn test_step_dimension_mismatch_is_computation_error() {
        let inv = Matrix::identity(3);
        let state = ChartState::cold(ChartType::Mcusum, 3);
        let err = state.step(&[1.0, 2.0], &inv, PARAMS).expect_err("wrong length");
        assert!(matches!(err, MspcError::Computation(_)));
    }
}
