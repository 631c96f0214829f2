//! Builder for configuring and constructing a `BeatSyncEngine`.

use crate::analysis::{BeatTracker, TrackerParams};
use crate::core::{
    Arc, BridgeConfig, LocalSession, SyncBridge, TempoSyncParams, DEFAULT_FRAME_SIZE,
};
use crate::{BeatSyncEngine, Result};

/// Every setting has a default, so `BeatSyncEngine::builder().build()` gives a
/// 44.1 kHz engine with 512-sample blocks, 1024-sample analysis frames and
/// tempo sync on.
///
/// # Example
///
/// ```ignore
/// use beatsync::prelude::*;
///
/// let engine = BeatSyncEngine::builder()
///     .sample_rate(48000.0)
///     .max_block_size(256)
///     .tempo_sync(false)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct BeatSyncEngineBuilder {
    sample_rate: f64,
    max_block_size: usize,
    frame_size: usize,
    tempo_sync: bool,
    initial_tempo: f64,
    tracker: TrackerParams,
}

impl Default for BeatSyncEngineBuilder {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            max_block_size: 512,
            frame_size: DEFAULT_FRAME_SIZE,
            tempo_sync: true,
            initial_tempo: 120.0,
            tracker: TrackerParams::default(),
        }
    }
}

impl BeatSyncEngineBuilder {
    /// Default: 44100
    pub fn sample_rate(mut self, sample_rate: f64) -> Self {
        self.sample_rate = sample_rate;
        self
    }

    /// Largest host block the processor will see without splitting. Default: 512
    pub fn max_block_size(mut self, frames: usize) -> Self {
        self.max_block_size = frames;
        self
    }

    /// Analysis frame length. Default: 1024
    pub fn frame_size(mut self, frames: usize) -> Self {
        self.frame_size = frames;
        self
    }

    /// Default: true
    pub fn tempo_sync(mut self, enabled: bool) -> Self {
        self.tempo_sync = enabled;
        self
    }

    /// Session tempo before the first beat is published. Default: 120
    pub fn initial_tempo(mut self, bpm: f64) -> Self {
        self.initial_tempo = bpm;
        self
    }

    pub fn tracker_params(mut self, params: TrackerParams) -> Self {
        self.tracker = params;
        self
    }

    pub fn build(self) -> Result<BeatSyncEngine> {
        if !self.initial_tempo.is_finite() || self.initial_tempo <= 0.0 {
            return Err(beatsync_core::Error::InvalidTempo(self.initial_tempo).into());
        }

        let config = BridgeConfig::new(self.sample_rate, self.max_block_size, self.frame_size);
        config.validate()?;

        let session = Arc::new(LocalSession::new(self.initial_tempo));
        let tracker = BeatTracker::with_params(self.tracker);

        let mut bridge = SyncBridge::new(
            tracker,
            Arc::clone(&session),
            TempoSyncParams {
                enabled: self.tempo_sync,
            },
        );
        bridge.configure(config)?;

        Ok(BeatSyncEngine::from_parts(config, bridge))
    }
}
