//! Spectral flux onset detection over consecutive analysis frames.
//!
//! Each call analyses the newest frame together with the one before it, so
//! the FFT window is twice the frame size and overlaps by half. All buffers
//! are sized in [`OnsetDetector::prepare`]; [`OnsetDetector::process`] never
//! allocates.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

pub struct OnsetDetector {
    frame_size: usize,
    fft: Option<Arc<dyn Fft<f64>>>,
    window: Vec<f64>,
    /// Previous frame followed by the current one.
    samples: Vec<f64>,
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
    prev_magnitudes: Vec<f64>,
}

impl Default for OnsetDetector {
    fn default() -> Self {
        Self {
            frame_size: 0,
            fft: None,
            window: Vec::new(),
            samples: Vec::new(),
            spectrum: Vec::new(),
            scratch: Vec::new(),
            prev_magnitudes: Vec::new(),
        }
    }
}

impl OnsetDetector {
    pub fn new(frame_size: usize) -> Self {
        let mut detector = Self::default();
        detector.prepare(frame_size);
        detector
    }

    /// Plan the FFT and size every buffer for `frame_size`-sample frames.
    pub fn prepare(&mut self, frame_size: usize) {
        let fft_size = frame_size * 2;
        let fft = FftPlanner::<f64>::new().plan_fft_forward(fft_size);

        self.frame_size = frame_size;
        self.window = create_hann_window(fft_size);
        self.samples = vec![0.0; fft_size];
        self.spectrum = vec![Complex::new(0.0, 0.0); fft_size];
        self.scratch = vec![Complex::new(0.0, 0.0); fft.get_inplace_scratch_len()];
        self.prev_magnitudes = vec![0.0; frame_size + 1];
        self.fft = Some(fft);
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    pub fn is_prepared(&self) -> bool {
        self.fft.is_some()
    }

    /// Forget previous frames.
    pub fn reset(&mut self) {
        self.samples.fill(0.0);
        self.prev_magnitudes.fill(0.0);
    }

    /// Push one frame and return its onset strength.
    ///
    /// The frame must be exactly `frame_size` samples long.
    pub fn process(&mut self, frame: &[f64]) -> f64 {
        let Some(fft) = self.fft.as_ref() else {
            return 0.0;
        };
        let n = self.frame_size;
        debug_assert_eq!(frame.len(), n);

        self.samples.copy_within(n.., 0);
        self.samples[n..].copy_from_slice(frame);

        for ((bin, &s), &w) in self
            .spectrum
            .iter_mut()
            .zip(&self.samples)
            .zip(&self.window)
        {
            *bin = Complex::new(s * w, 0.0);
        }

        fft.process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Half-wave rectified magnitude increase over the non-negative bins.
        let mut flux = 0.0;
        for (prev, bin) in self.prev_magnitudes.iter_mut().zip(&self.spectrum) {
            let magnitude = bin.norm();
            let diff = magnitude - *prev;
            if diff > 0.0 {
                flux += diff;
            }
            *prev = magnitude;
        }

        flux
    }
}

fn create_hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            let angle = 2.0 * core::f64::consts::PI * i as f64 / (size - 1) as f64;
            0.5 * (1.0 - angle.cos())
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_has_no_onsets() {
        let mut detector = OnsetDetector::new(256);
        let silence = vec![0.0; 256];
        for _ in 0..4 {
            assert_eq!(detector.process(&silence), 0.0);
        }
    }

    #[test]
    fn test_click_produces_onset() {
        let mut detector = OnsetDetector::new(256);
        let silence = vec![0.0; 256];
        let mut click = vec![0.0; 256];
        click[..8].fill(1.0);

        detector.process(&silence);
        let quiet = detector.process(&silence);
        let onset = detector.process(&click);

        assert!(onset > quiet);
        assert!(onset > 1.0);
    }

    #[test]
    fn test_steady_signal_settles() {
        let mut detector = OnsetDetector::new(256);
        let tone: Vec<f64> = (0..256)
            .map(|i| (2.0 * core::f64::consts::PI * 8.0 * i as f64 / 256.0).sin())
            .collect();

        let first = detector.process(&tone);
        detector.process(&tone);
        let settled = detector.process(&tone);

        assert!(first > 0.0);
        assert!(settled < first * 1e-6);
    }

    #[test]
    fn test_unprepared_returns_zero() {
        let mut detector = OnsetDetector::default();
        assert!(!detector.is_prepared());
        assert_eq!(detector.process(&[]), 0.0);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut detector = OnsetDetector::new(64);
        let loud = vec![0.5; 64];
        let first = detector.process(&loud);
        detector.process(&loud);

        detector.reset();
        let after_reset = detector.process(&loud);
        assert!((after_reset - first).abs() < 1e-9);
    }
}
