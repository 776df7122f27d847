//! Independent engines for concurrently monitored streams.
//!
//! Each stream owns its own [`SpcEngine`], so baselines and carried chart
//! state are never shared between streams. The registry is an explicit,
//! owned map; hosts that process streams on several threads can wrap the
//! registry, or individual engines, in their own synchronization.

use std::collections::HashMap;

use tracing::info;

use super::config::{ConfigUpdate, MonitorConfig};
use super::monitor::{ProcessingResult, SpcEngine};
use crate::error::{MspcError, Result};

/// Map from stream id to its engine.
///
/// # Examples
///
/// ```
/// use u_mspc::engine::{EngineRegistry, MonitorConfig};
///
/// let mut registry = EngineRegistry::new();
/// registry.register("line-1", MonitorConfig::default()).unwrap();
/// registry.register("line-2", MonitorConfig::default()).unwrap();
///
/// let phase_i: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64, (i * i) as f64]).collect();
/// registry.initialize_phase_i("line-1", &phase_i).unwrap();
///
/// assert!(registry.get("line-1").unwrap().is_initialized());
/// assert!(!registry.get("line-2").unwrap().is_initialized());
/// ```
#[derive(Debug, Default)]
pub struct EngineRegistry {
    engines: HashMap<String, SpcEngine>,
}

impl EngineRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new, uninitialized engine for `stream_id`.
    ///
    /// # Errors
    ///
    /// - [`MspcError::InvalidInput`] if the stream is already registered.
    /// - [`MspcError::InvalidConfig`] if `config` is invalid.
    pub fn register(
        &mut self,
        stream_id: impl Into<String>,
        config: MonitorConfig,
    ) -> Result<&mut SpcEngine> {
        let stream_id = stream_id.into();
        if self.engines.contains_key(&stream_id) {
            return Err(MspcError::InvalidInput(format!(
                "stream '{stream_id}' is already registered"
            )));
        }
        let engine = SpcEngine::with_config(config)?;
        info!(stream = %stream_id, "stream registered");
        Ok(self.engines.entry(stream_id).or_insert(engine))
    }

    /// Removes a stream, returning its engine.
    pub fn remove(&mut self, stream_id: &str) -> Option<SpcEngine> {
        let removed = self.engines.remove(stream_id);
        if removed.is_some() {
            info!(stream = %stream_id, "stream removed");
        }
        removed
    }

    /// The engine of `stream_id`.
    pub fn get(&self, stream_id: &str) -> Result<&SpcEngine> {
        self.engines
            .get(stream_id)
            .ok_or_else(|| MspcError::UnknownStream(stream_id.to_string()))
    }

    /// Mutable access to the engine of `stream_id`.
    pub fn get_mut(&mut self, stream_id: &str) -> Result<&mut SpcEngine> {
        self.engines
            .get_mut(stream_id)
            .ok_or_else(|| MspcError::UnknownStream(stream_id.to_string()))
    }

    /// Runs Phase I for one stream.
    pub fn initialize_phase_i<R: AsRef<[f64]>>(
        &mut self,
        stream_id: &str,
        samples: &[R],
    ) -> Result<()> {
        self.get_mut(stream_id)?.initialize_phase_i(samples)
    }

    /// Processes one observation on one stream.
    pub fn process(&mut self, stream_id: &str, observation: &[f64]) -> Result<ProcessingResult> {
        self.get_mut(stream_id)?.process_observation(observation)
    }

    /// Updates the configuration of one stream.
    pub fn update_configuration(&mut self, stream_id: &str, update: ConfigUpdate) -> Result<()> {
        self.get_mut(stream_id)?.update_configuration(update)
    }

    /// Resets one stream.
    pub fn reset(&mut self, stream_id: &str) -> Result<()> {
        self.get_mut(stream_id)?.reset();
        Ok(())
    }

    /// Registered stream ids, sorted.
    pub fn stream_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.engines.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    /// Number of registered streams.
    pub fn len(&self) -> usize {
        self.engines.len()
    }

    /// Whether no stream is registered.
    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }
}
