//! Error types for beatsync-core.

use crate::compat::String;
use thiserror::Error;

/// Error type for beatsync-core operations.
///
/// Only configuration and control-path operations return this type. The
/// real-time path never surfaces errors; see [`EstimatorError`] and
/// [`SessionError`] for the collaborator failures it contains locally.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid frame size: {0}. Must be between 1 and {max}", max = crate::config::MAX_FRAME_SIZE)]
    InvalidFrameSize(usize),

    #[error("Invalid tempo: {0}. Must be a finite, positive BPM value")]
    InvalidTempo(f64),

    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Estimator: {0}")]
    Estimator(#[from] EstimatorError),

    #[error("Sync session: {0}")]
    Session(#[from] SessionError),

    #[cfg(feature = "input")]
    #[error("Audio device not available")]
    DeviceNotAvailable(#[from] cpal::DefaultStreamConfigError),

    #[cfg(feature = "input")]
    #[error("Failed to build audio stream")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[cfg(feature = "input")]
    #[error("Failed to play audio stream")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[cfg(feature = "input")]
    #[error("Failed to enumerate devices")]
    DevicesError(#[from] cpal::DevicesError),

    #[cfg(feature = "input")]
    #[error("Failed to get device name")]
    DeviceNameError(#[from] cpal::DeviceNameError),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;

/// Failures reported by a [`TempoEstimator`](crate::TempoEstimator).
///
/// Carries no heap data so it can be produced on the audio thread.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimatorError {
    #[error("estimator is not configured")]
    NotConfigured,

    #[error("frame length {got} does not match configured frame size {expected}")]
    FrameSizeMismatch { expected: usize, got: usize },

    #[error("estimator unavailable")]
    Unavailable,
}

/// Failures reported by a [`SyncSession`](crate::SyncSession).
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    #[error("session rejected the committed state")]
    Rejected,

    #[error("session unavailable")]
    Unavailable,
}
