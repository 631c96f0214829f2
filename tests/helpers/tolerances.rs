//! Tolerance constants for tempo-sync testing.

/// Floating point rounding errors (downmix of identical channels, gain).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Tempo accuracy expected from the beat tracker on a clean click train.
pub const TEMPO_TOLERANCE_BPM: f64 = 6.0;

/// Allowed difference between expected and detected beat counts over a
/// multi-second window.
pub const BEAT_COUNT_TOLERANCE: usize = 2;
