//! Frame-by-frame beat tracker.
//!
//! Onset strength feeds two histories: an autocorrelation tempo estimate and
//! a cumulative score that reinforces onsets one beat period apart. Beats are
//! predicted with a countdown that is re-aligned to the cumulative score peak
//! halfway through every beat period.

use crate::onset::OnsetDetector;
use crate::tempo::{LagRange, TempoInduction};
use beatsync_core::{EstimatorError, TempoEstimator};

/// Onset-detection samples kept for tempo induction and scoring.
pub const ONSET_HISTORY_LEN: usize = 512;

/// Tracker tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct TrackerParams {
    /// Slowest tempo considered, in BPM.
    pub min_tempo: f64,
    /// Fastest tempo considered, in BPM.
    pub max_tempo: f64,
    /// Tempo reported before enough history exists.
    pub initial_tempo: f64,
    /// Weight of the past score against the new onset (0.0 - 1.0).
    pub alpha: f64,
    /// Width of the log-Gaussian transition window; higher is narrower.
    pub tightness: f64,
}

impl Default for TrackerParams {
    fn default() -> Self {
        Self {
            min_tempo: 80.0,
            max_tempo: 160.0,
            initial_tempo: 120.0,
            alpha: 0.9,
            tightness: 5.0,
        }
    }
}

/// Spectral-flux beat tracker implementing [`TempoEstimator`].
///
/// Everything is sized in `configure`; `process_frame` does not allocate.
///
/// # Example
/// ```ignore
/// let mut tracker = BeatTracker::new();
/// tracker.configure(44100.0, 1024);
/// tracker.process_frame(&frame)?;
/// if tracker.beat_due_in_current_frame() {
///     println!("beat at {:.1} BPM", tracker.current_tempo_estimate());
/// }
/// ```
pub struct BeatTracker {
    params: TrackerParams,
    frame_size: usize,
    onsets: OnsetDetector,
    induction: TempoInduction,
    onset_history: Vec<f64>,
    score_history: Vec<f64>,
    /// Valid values at the end of the histories.
    filled: usize,
    tempo: f64,
    /// Beat period in onset-detection samples.
    beat_period: f64,
    countdown: usize,
    realigned: bool,
    beat_due: bool,
    latest_onset: f64,
    frames_processed: u64,
}

impl Default for BeatTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl BeatTracker {
    pub fn new() -> Self {
        Self::with_params(TrackerParams::default())
    }

    pub fn with_params(params: TrackerParams) -> Self {
        Self {
            params,
            frame_size: 0,
            onsets: OnsetDetector::default(),
            induction: TempoInduction::default(),
            onset_history: Vec::new(),
            score_history: Vec::new(),
            filled: 0,
            tempo: params.initial_tempo,
            beat_period: 0.0,
            countdown: 0,
            realigned: false,
            beat_due: false,
            latest_onset: 0.0,
            frames_processed: 0,
        }
    }

    pub fn params(&self) -> &TrackerParams {
        &self.params
    }

    pub fn is_configured(&self) -> bool {
        self.frame_size > 0
    }

    /// Current tempo in BPM.
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Beat period measured in analysis frames.
    pub fn beat_period_frames(&self) -> f64 {
        self.beat_period
    }

    /// Onset strength of the most recent frame.
    pub fn latest_onset(&self) -> f64 {
        self.latest_onset
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Drop all history and return to the initial tempo.
    pub fn reset(&mut self) {
        self.onsets.reset();
        self.onset_history.fill(0.0);
        self.score_history.fill(0.0);
        self.filled = 0;
        self.beat_due = false;
        self.latest_onset = 0.0;
        self.frames_processed = 0;
        self.set_tempo(self.params.initial_tempo);
        self.countdown = self.period_frames();
        self.realigned = false;
    }

    fn set_tempo(&mut self, bpm: f64) {
        self.tempo = bpm;
        self.beat_period = match self.induction.range() {
            Some(range) => range.bpm_to_lag(bpm),
            None => 0.0,
        };
    }

    #[inline]
    fn period_frames(&self) -> usize {
        (self.beat_period.round() as usize).max(1)
    }

    fn push_history(history: &mut [f64], value: f64) {
        history.copy_within(1.., 0);
        if let Some(last) = history.last_mut() {
            *last = value;
        }
    }

    /// Best weighted past score between half and twice a beat period back.
    fn past_score(&self) -> f64 {
        let period = self.beat_period;
        if period < 1.0 {
            return 0.0;
        }
        let len = self.score_history.len();
        let start = ((period / 2.0).round() as usize).max(1);
        let end = ((2.0 * period).round() as usize).min(self.filled).min(len);

        let mut best = 0.0f64;
        for k in start..=end {
            let log_ratio = (k as f64 / period).ln();
            let weight = (-0.5 * (self.params.tightness * log_ratio).powi(2)).exp();
            // score_history is not yet updated for this frame: k back is len - k
            let score = self.score_history[len - k];
            best = best.max(weight * score);
        }
        best
    }

    /// Frames since the highest cumulative score within the last beat period,
    /// or `None` when the window holds no score at all.
    fn frames_since_score_peak(&self) -> Option<usize> {
        let len = self.score_history.len();
        let window = self.period_frames().min(self.filled).min(len);
        let mut best_age = 0;
        let mut best = 0.0;
        for age in 0..window {
            let score = self.score_history[len - 1 - age];
            if score > best {
                best = score;
                best_age = age;
            }
        }
        (best > 0.0).then_some(best_age)
    }

    fn advance_countdown(&mut self) {
        self.beat_due = false;
        self.countdown = self.countdown.saturating_sub(1);

        if self.countdown == 0 {
            self.beat_due = true;
            self.countdown = self.period_frames();
            self.realigned = false;
            return;
        }

        let period = self.period_frames();
        if !self.realigned && self.countdown <= period / 2 {
            self.realigned = true;
            if let Some(age) = self.frames_since_score_peak() {
                self.countdown = period.saturating_sub(age).max(1);
            }
        }
    }
}

impl TempoEstimator for BeatTracker {
    fn configure(&mut self, sample_rate: f64, frame_size: usize) {
        self.frame_size = frame_size;
        self.onsets.prepare(frame_size);

        let odf_rate = sample_rate / frame_size as f64;
        let range = LagRange::new(
            odf_rate,
            self.params.min_tempo,
            self.params.max_tempo,
            ONSET_HISTORY_LEN,
        );
        self.induction.prepare(range);
        self.onset_history = vec![0.0; ONSET_HISTORY_LEN];
        self.score_history = vec![0.0; ONSET_HISTORY_LEN];

        self.reset();

        match range {
            Some(r) => tracing::debug!(
                sample_rate,
                frame_size,
                min_lag = r.min_lag,
                max_lag = r.max_lag,
                "Beat tracker configured"
            ),
            None => tracing::warn!(
                sample_rate,
                frame_size,
                "Frame rate too low to resolve the tempo range; tempo will stay fixed"
            ),
        }
    }

    fn process_frame(&mut self, frame: &[f64]) -> Result<(), EstimatorError> {
        if !self.is_configured() {
            return Err(EstimatorError::NotConfigured);
        }
        if frame.len() != self.frame_size {
            return Err(EstimatorError::FrameSizeMismatch {
                expected: self.frame_size,
                got: frame.len(),
            });
        }

        let onset = self.onsets.process(frame);
        self.latest_onset = onset;
        self.frames_processed += 1;

        let alpha = self.params.alpha;
        let score = (1.0 - alpha) * onset + alpha * self.past_score();

        Self::push_history(&mut self.onset_history, onset);
        Self::push_history(&mut self.score_history, score);
        self.filled = (self.filled + 1).min(ONSET_HISTORY_LEN);

        let start = ONSET_HISTORY_LEN - self.filled;
        if let Some(bpm) = self.induction.estimate(&self.onset_history[start..]) {
            self.set_tempo(bpm);
        }

        self.advance_countdown();
        Ok(())
    }

    fn beat_due_in_current_frame(&self) -> bool {
        self.beat_due
    }

    fn current_tempo_estimate(&self) -> f64 {
        self.tempo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RATE: f64 = 44100.0;
    const FRAME: usize = 1024;

    fn click_frames(bpm: f64, seconds: f64) -> Vec<Vec<f64>> {
        let total = (seconds * SAMPLE_RATE) as usize;
        let period = 60.0 / bpm * SAMPLE_RATE;
        let mut signal = vec![0.0; total];
        let mut t = 0.0;
        while (t as usize) < total {
            let start = t as usize;
            for s in signal.iter_mut().skip(start).take(32) {
                *s = 0.8;
            }
            t += period;
        }
        signal.chunks_exact(FRAME).map(|c| c.to_vec()).collect()
    }

    #[test]
    fn test_requires_configure() {
        let mut tracker = BeatTracker::new();
        assert_eq!(
            tracker.process_frame(&[0.0; 16]),
            Err(EstimatorError::NotConfigured)
        );
        assert_eq!(tracker.current_tempo_estimate(), 120.0);
    }

    #[test]
    fn test_rejects_wrong_frame_length() {
        let mut tracker = BeatTracker::new();
        tracker.configure(SAMPLE_RATE, FRAME);
        assert_eq!(
            tracker.process_frame(&[0.0; 512]),
            Err(EstimatorError::FrameSizeMismatch {
                expected: FRAME,
                got: 512
            })
        );
    }

    #[test]
    fn test_silence_keeps_initial_tempo_and_predicts_beats() {
        let mut tracker = BeatTracker::new();
        tracker.configure(SAMPLE_RATE, FRAME);
        let silence = vec![0.0; FRAME];

        let mut beats = 0;
        for _ in 0..431 {
            tracker.process_frame(&silence).unwrap();
            if tracker.beat_due_in_current_frame() {
                beats += 1;
            }
        }

        // ~10 s at 120 BPM
        assert_eq!(tracker.current_tempo_estimate(), 120.0);
        assert!((18..=22).contains(&beats), "beats = {beats}");
    }

    #[test]
    fn test_tracks_click_train_tempo() {
        for &bpm in &[100.0, 120.0, 140.0] {
            let mut tracker = BeatTracker::new();
            tracker.configure(SAMPLE_RATE, FRAME);

            for frame in click_frames(bpm, 15.0) {
                tracker.process_frame(&frame).unwrap();
            }

            let estimate = tracker.current_tempo_estimate();
            assert!(
                (estimate - bpm).abs() < 6.0,
                "expected ~{bpm}, got {estimate}"
            );
        }
    }

    #[test]
    fn test_beats_follow_clicks() {
        let mut tracker = BeatTracker::new();
        tracker.configure(SAMPLE_RATE, FRAME);
        let frames = click_frames(120.0, 20.0);
        let settle = frames.len() / 2;

        let mut beats = 0;
        for (i, frame) in frames.iter().enumerate() {
            tracker.process_frame(frame).unwrap();
            if i >= settle && tracker.beat_due_in_current_frame() {
                beats += 1;
            }
        }

        // second half: ~10 s at 120 BPM
        assert!((18..=22).contains(&beats), "beats = {beats}");
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut tracker = BeatTracker::with_params(TrackerParams {
            initial_tempo: 100.0,
            ..TrackerParams::default()
        });
        tracker.configure(SAMPLE_RATE, FRAME);

        for frame in click_frames(140.0, 8.0) {
            tracker.process_frame(&frame).unwrap();
        }
        assert!(tracker.frames_processed() > 0);

        tracker.reset();
        assert_eq!(tracker.frames_processed(), 0);
        assert_eq!(tracker.tempo(), 100.0);
        assert!(!tracker.beat_due_in_current_frame());
    }

    #[test]
    fn test_huge_frames_keep_fixed_tempo() {
        let mut tracker = BeatTracker::new();
        tracker.configure(SAMPLE_RATE, 65536);
        let frame = vec![0.1; 65536];
        tracker.process_frame(&frame).unwrap();
        assert_eq!(tracker.current_tempo_estimate(), 120.0);
        // no period to count down: every frame is a beat
        assert!(tracker.beat_due_in_current_frame());
    }
}
