//! Beat/tempo estimator seam.

use crate::compat::Box;
use crate::error::EstimatorError;

/// A beat tracker fed one analysis frame at a time.
///
/// `process_frame` runs on the audio thread and must not allocate or block.
/// `configure` is called from [`SyncBridge::configure`](crate::SyncBridge::configure)
/// before any frame and is free to allocate.
pub trait TempoEstimator: Send {
    /// Size internal state for the given stream. Default: no-op.
    fn configure(&mut self, sample_rate: f64, frame_size: usize) {
        let _ = (sample_rate, frame_size);
    }

    /// Analyse one full analysis frame.
    fn process_frame(&mut self, frame: &[f64]) -> Result<(), EstimatorError>;

    /// Whether a beat fell inside the frame most recently processed.
    fn beat_due_in_current_frame(&self) -> bool;

    /// Current tempo estimate in BPM.
    fn current_tempo_estimate(&self) -> f64;
}

impl<E: TempoEstimator + ?Sized> TempoEstimator for Box<E> {
    fn configure(&mut self, sample_rate: f64, frame_size: usize) {
        (**self).configure(sample_rate, frame_size)
    }

    fn process_frame(&mut self, frame: &[f64]) -> Result<(), EstimatorError> {
        (**self).process_frame(frame)
    }

    fn beat_due_in_current_frame(&self) -> bool {
        (**self).beat_due_in_current_frame()
    }

    fn current_tempo_estimate(&self) -> f64 {
        (**self).current_tempo_estimate()
    }
}
