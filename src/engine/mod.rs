//! Engine lifecycle, configuration and multi-stream registry.
//!
//! - [`SpcEngine`] — one monitored stream: Phase I, per-observation
//!   processing, configuration and reset
//! - [`MonitorConfig`] / [`ConfigUpdate`] — tunable parameters and partial
//!   updates
//! - [`EngineRegistry`] — independent engines keyed by stream id

mod config;
mod monitor;
mod registry;

pub use config::{
    ConfigUpdate, MonitorConfig, DEFAULT_ALPHA, DEFAULT_K, DEFAULT_LAMBDA,
    DEFAULT_SAMPLING_INTERVAL_MS,
};
pub use monitor::{Alert, ProcessingResult, SpcEngine};
pub use registry::EngineRegistry;
