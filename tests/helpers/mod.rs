//! Test helpers and fixtures for beatsync integration tests.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `FLOAT_EPSILON` (1e-6): Exact operations (downmix, passthrough)
//! - `TEMPO_TOLERANCE_BPM` (6.0): Beat tracker accuracy on click trains
//! - `BEAT_COUNT_TOLERANCE` (2): Beat counts over a multi-second window

#![allow(dead_code)]

pub mod tolerances;

use approx::assert_abs_diff_eq;
use beatsync::prelude::*;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: f64 = 44100.0;

/// Standard host block size for deterministic testing
pub const TEST_BLOCK_SIZE: usize = 512;

/// Route `tracing` output to the test harness. Safe to call repeatedly.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// Create a test engine with the default frame size.
pub fn test_engine(tempo_sync: bool) -> BeatSyncEngine {
    BeatSyncEngine::builder()
        .sample_rate(TEST_SAMPLE_RATE)
        .max_block_size(TEST_BLOCK_SIZE)
        .tempo_sync(tempo_sync)
        .build()
        .expect("Failed to create test engine")
}

/// Click train: a short burst at every beat of `bpm`.
pub fn generate_click_train(bpm: f64, sample_rate: f64, seconds: f64) -> Vec<f32> {
    let total = (seconds * sample_rate) as usize;
    let period = 60.0 / bpm * sample_rate;
    let click_len = (sample_rate * 0.001) as usize;

    let mut signal = vec![0.0f32; total];
    let mut t = 0.0;
    while (t as usize) < total {
        let start = t as usize;
        let end = (start + click_len).min(total);
        for (i, s) in signal[start..end].iter_mut().enumerate() {
            // decaying burst with alternating sign
            let env = 1.0 - i as f32 / click_len as f32;
            *s = if i % 2 == 0 { 0.8 * env } else { -0.8 * env };
        }
        t += period;
    }
    signal
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Generate white noise (random samples in -1..1).
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    // Simple LCG for reproducible "random" noise
    let mut rng = seed;
    (0..num_samples)
        .map(|_| {
            rng = rng.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((rng >> 33) as f32 / u32::MAX as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Feed a mono signal as identical stereo channels in `block_size` blocks.
pub fn feed_stereo(processor: &mut EngineProcessor, signal: &[f32], block_size: usize) {
    for chunk in signal.chunks(block_size) {
        let channels: [&[f32]; 2] = [chunk, chunk];
        processor.process_block(&AudioBlock::new(&channels));
    }
}

/// Feed a mono signal as interleaved stereo in `block_size`-frame blocks.
pub fn feed_interleaved(processor: &mut EngineProcessor, signal: &[f32], block_size: usize) {
    let interleaved: Vec<f32> = signal.iter().flat_map(|&s| [s, s]).collect();
    for chunk in interleaved.chunks(block_size * 2) {
        processor.process_interleaved(chunk, 2);
    }
}

/// Assert a tempo lies within [`tolerances::TEMPO_TOLERANCE_BPM`] of `expected`.
pub fn assert_tempo_near(actual: f64, expected: f64) {
    assert_abs_diff_eq!(actual, expected, epsilon = tolerances::TEMPO_TOLERANCE_BPM);
}
