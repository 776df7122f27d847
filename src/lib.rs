//! # u-mspc
//!
//! Multivariate statistical process control (MSPC): Phase I baselining,
//! Hotelling T², MEWMA and MCUSUM monitoring, and per-variable contribution
//! analysis for root-cause triage.
//!
//! The engine operates on raw `f64` observation vectors and knows nothing
//! about the transport, storage or presentation layers around it.
//!
//! ## Modules
//!
//! - [`engine`] — Stream engine lifecycle, configuration, multi-stream registry
//! - [`mspc`] — Baseline estimation, control limits, chart statistics, contributions
//! - [`analysis`] — Phase I diagnostics (Mahalanobis outliers, PCA, capability)
//! - [`linalg`] — Small dense matrix kernel (inverse, Cholesky, symmetric eigen)
//! - [`simulation`] — Seeded multivariate normal process generator
//! - [`error`] — Error type shared by every module
//!
//! ## Quick start
//!
//! ```
//! use u_mspc::engine::{ConfigUpdate, SpcEngine};
//! use u_mspc::mspc::ChartType;
//! use u_mspc::simulation::ProcessSimulator;
//!
//! let mut sim = ProcessSimulator::demo(1);
//! let mut engine = SpcEngine::new();
//! engine.initialize_phase_i(&sim.phase_i(50)).unwrap();
//!
//! engine
//!     .update_configuration(ConfigUpdate {
//!         chart_type: Some(ChartType::Mewma),
//!         ..ConfigUpdate::default()
//!     })
//!     .unwrap();
//!
//! let result = engine.process_observation(&sim.sample()).unwrap();
//! assert_eq!(result.chart_type, ChartType::Mewma);
//! assert!(result.statistic >= 0.0);
//! ```
//!
//! ## Design Philosophy
//!
//! - **Deterministic**: identical inputs give identical statistics
//! - **Atomic updates**: a failed call never leaves partially updated state
//! - **Research-backed**: every chart references its literature

pub mod analysis;
pub mod engine;
pub mod error;
pub mod linalg;
pub mod mspc;
pub mod simulation;

pub use error::{MspcError, Result};
