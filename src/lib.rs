//! # BeatSync - Live Tempo Sync
//!
//! Listens to an audio stream, tracks its beat, and publishes the tempo to a
//! shared tempo session.
//!
//! ## Architecture
//!
//! BeatSync is an umbrella crate that coordinates:
//! - **beatsync-core** - Real-time bridge (downmix, frame aggregation, lock-free tempo handoff, sessions)
//! - **beatsync-analysis** - Beat tracking (spectral flux, autocorrelation tempo, beat prediction)
//!
//! ## Quick Start
//!
//! ```ignore
//! use beatsync::prelude::*;
//!
//! let engine = BeatSyncEngine::builder()
//!     .sample_rate(48000.0)
//!     .max_block_size(512)
//!     .build()?;
//!
//! // Hand the processor to the audio callback
//! let mut processor = engine.take_processor()?;
//! processor.process_block(&AudioBlock::new(&[&left, &right]));
//!
//! // Read and control from anywhere
//! let bpm = engine.tempo_estimate();
//! engine.set_tempo_sync(false);
//! let blob = engine.save_state()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Bridge, beat tracker and in-process session
//! - `input` - Live capture from an audio input device (CPAL)
//! - `serialization` - serde support for tracker parameters

/// Re-export of beatsync-core for direct access
pub use beatsync_core as core;

/// Re-export of beatsync-analysis for direct access
pub use beatsync_analysis as analysis;

// Core types
pub use beatsync_core::{
    publish_tempo,
    // Lock-free primitives
    AtomicDouble,
    // Audio input
    AudioBlock,
    // Bridge
    BridgeConfig,
    BridgeState,
    BridgeStats,
    ChannelDownmixer,
    EnableGate,
    EstimatorError,
    FrameAggregator,
    // Sessions
    LocalSession,
    SessionError,
    SessionState,
    StatsSnapshot,
    SyncBridge,
    SyncControl,
    SyncSession,
    TempoCallback,
    TempoEstimateCell,
    TempoEstimator,
    TempoSyncParams,
    DEFAULT_FRAME_SIZE,
    MAX_FRAME_SIZE,
};

#[cfg(feature = "input")]
pub use beatsync_core::{InputConfig, InputDevice, InputStream};

// Analysis
pub use beatsync_analysis::{BeatTracker, TrackerParams};

mod error;
pub use error::{Error, Result};

mod builder;
mod engine;

pub use builder::BeatSyncEngineBuilder;
pub use engine::{BeatSyncEngine, EngineProcessor};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{BeatSyncEngine, BeatSyncEngineBuilder, EngineProcessor};

    // Essential types
    pub use crate::core::{AudioBlock, BridgeConfig, SyncControl, TempoSyncParams};

    // Collaborators
    pub use crate::analysis::BeatTracker;
    pub use crate::core::{LocalSession, SyncSession, TempoEstimator};
}
