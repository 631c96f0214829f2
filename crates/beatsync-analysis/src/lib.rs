//! # Beatsync Analysis
//!
//! Beat tracking for the beatsync bridge.
//!
//! - **Onset detection**: half-wave rectified spectral flux over two analysis frames
//! - **Tempo induction**: autocorrelation of the onset history with parabolic peak refinement
//! - **Beat prediction**: cumulative score with log-Gaussian transition weighting
//!
//! [`BeatTracker`] implements [`beatsync_core::TempoEstimator`] and is sized
//! once in `configure`, so it can run on the audio thread.
//!
//! ## Example
//!
//! ```rust
//! use beatsync_analysis::BeatTracker;
//! use beatsync_core::TempoEstimator;
//!
//! let mut tracker = BeatTracker::new();
//! tracker.configure(44100.0, 1024);
//!
//! let frame = vec![0.0f64; 1024];
//! tracker.process_frame(&frame).unwrap();
//! assert_eq!(tracker.current_tempo_estimate(), 120.0);
//! ```

pub mod onset;
pub mod tempo;
pub mod tracker;

pub use onset::OnsetDetector;
pub use tempo::{LagRange, TempoInduction};
pub use tracker::{BeatTracker, TrackerParams, ONSET_HISTORY_LEN};
