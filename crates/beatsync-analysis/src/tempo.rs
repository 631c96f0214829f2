//! Tempo induction from the onset history by autocorrelation.

/// Converts between BPM and lags measured in onset-detection samples.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LagRange {
    /// Onset-detection samples per second (sample rate / frame size).
    pub odf_rate: f64,
    pub min_lag: usize,
    pub max_lag: usize,
}

impl LagRange {
    /// Lags covering `[min_bpm, max_bpm]`, clamped to what `history_len`
    /// values can resolve. `None` when the range is empty at this rate.
    pub fn new(odf_rate: f64, min_bpm: f64, max_bpm: f64, history_len: usize) -> Option<Self> {
        let min_lag = ((60.0 * odf_rate / max_bpm).floor() as usize).max(2);
        let max_lag = ((60.0 * odf_rate / min_bpm).ceil() as usize).min(history_len / 2 - 1);
        (max_lag > min_lag).then_some(Self {
            odf_rate,
            min_lag,
            max_lag,
        })
    }

    pub fn lag_to_bpm(&self, lag: f64) -> f64 {
        60.0 * self.odf_rate / lag
    }

    pub fn bpm_to_lag(&self, bpm: f64) -> f64 {
        60.0 * self.odf_rate / bpm
    }
}

/// Autocorrelation tempo estimator with pre-sized scratch.
#[derive(Debug, Default)]
pub struct TempoInduction {
    range: Option<LagRange>,
    acf: Vec<f64>,
}

impl TempoInduction {
    pub fn prepare(&mut self, range: Option<LagRange>) {
        self.acf = match range {
            Some(r) => vec![0.0; r.max_lag + 2],
            None => Vec::new(),
        };
        self.range = range;
    }

    pub fn range(&self) -> Option<&LagRange> {
        self.range.as_ref()
    }

    /// History needed before [`estimate`](Self::estimate) returns anything.
    pub fn min_history(&self) -> usize {
        self.range.map_or(usize::MAX, |r| 2 * (r.max_lag + 1) + 1)
    }

    /// Estimate a tempo from `history` (oldest first).
    ///
    /// Returns `None` while the history is too short or carries no periodic
    /// energy.
    pub fn estimate(&mut self, history: &[f64]) -> Option<f64> {
        let range = self.range?;
        if history.len() < self.min_history() {
            return None;
        }

        let mean = history.iter().sum::<f64>() / history.len() as f64;
        let len = history.len();

        for lag in range.min_lag - 1..=range.max_lag + 1 {
            let mut sum = 0.0;
            for i in lag..len {
                sum += (history[i] - mean) * (history[i - lag] - mean);
            }
            self.acf[lag] = sum / (len - lag) as f64;
        }

        let mut best = range.min_lag;
        for lag in range.min_lag..=range.max_lag {
            if self.acf[lag] > self.acf[best] {
                best = lag;
            }
        }
        if self.acf[best] <= 0.0 {
            return None;
        }

        let lag = best as f64 + parabolic_offset(self.acf[best - 1], self.acf[best], self.acf[best + 1]);
        Some(range.lag_to_bpm(lag))
    }
}

/// Vertex offset of the parabola through three equally spaced points.
fn parabolic_offset(left: f64, center: f64, right: f64) -> f64 {
    let denom = left - 2.0 * center + right;
    if denom.abs() < f64::EPSILON {
        return 0.0;
    }
    (0.5 * (left - right) / denom).clamp(-0.5, 0.5)
}
