//! Real-time frame aggregation and tempo-sync bridge.
//!
//! # Primary API
//!
//! - [`SyncBridge`]: audio-thread entry point (`configure` / `process_block` / `teardown`)
//! - [`SyncControl`]: control-thread handle (tempo readout, enable toggle, stats)
//! - [`TempoEstimator`]: beat tracker seam, fed one analysis frame at a time
//! - [`SyncSession`]: shared tempo session seam, written with timestamped snapshots
//!
//! # Building blocks
//!
//! - [`ChannelDownmixer`]: equal-weight channel average into a pre-sized mono buffer
//! - [`FrameAggregator`]: fixed-size analysis frames with a cursor that survives callbacks
//! - [`TempoEstimateCell`] / [`EnableGate`]: single-slot atomics shared across threads
//!
//! # Feature-gated APIs
//!
//! - `"std"`: [`LocalSession`], an in-process session with a monotonic clock (default)
//! - `"input"`: [`InputDevice`] / [`InputStream`], live capture from a CPAL input device
//!
//! # Example
//!
//! ```ignore
//! use beatsync_core::*;
//!
//! let session = Arc::new(LocalSession::default());
//! let mut bridge = SyncBridge::new(my_estimator, session, TempoSyncParams::default());
//! bridge.configure(BridgeConfig::new(48000.0, 512, 1024))?;
//!
//! let control = bridge.control();
//!
//! // audio thread
//! bridge.process_block(&AudioBlock::new(&[&left, &right]));
//!
//! // any thread
//! let bpm = control.tempo_estimate();
//! ```

#![no_std]

#[cfg(feature = "std")]
extern crate std;

#[macro_use]
extern crate alloc;

pub mod error;
pub use error::{Error, EstimatorError, Result, SessionError};

pub mod config;
pub use config::{BridgeConfig, TempoSyncParams, DEFAULT_FRAME_SIZE, MAX_FRAME_SIZE};

pub(crate) mod lockfree;
pub use lockfree::{AtomicDouble, EnableGate, TempoEstimateCell, NO_TEMPO_ESTIMATE};

mod downmix;
pub use downmix::{AudioBlock, ChannelDownmixer};

mod frame;
pub use frame::FrameAggregator;

mod estimator;
pub use estimator::TempoEstimator;

pub mod session;
pub use session::{publish_tempo, SessionState, SyncSession, TempoCallback};

#[cfg(feature = "std")]
pub use session::{LocalSession, MAX_SESSION_TEMPO, MIN_SESSION_TEMPO};

mod stats;
pub use stats::{BridgeStats, StatsSnapshot};

mod bridge;
pub use bridge::{BridgeState, SyncBridge};

mod handle;
pub use handle::SyncControl;

#[cfg(feature = "input")]
mod input;

#[cfg(feature = "input")]
pub use input::{InputConfig, InputDevice, InputStream};

/// Compatibility layer for no_std + alloc.
///
/// Re-exports common types that work in both std and no_std environments.
pub mod compat;
pub use compat::Arc;

pub use dasp_sample::{Sample, ToSample};
