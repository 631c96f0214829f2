//! Bridge activity counters.

use crate::compat::{AtomicU64, Ordering};

/// Counters written by the audio thread, read from anywhere.
///
/// All updates are relaxed; a snapshot is a diagnostic view, not a
/// consistent cut across counters.
#[derive(Debug, Default)]
pub struct BridgeStats {
    frames: AtomicU64,
    beats: AtomicU64,
    publishes: AtomicU64,
    forwarded: AtomicU64,
    failures: AtomicU64,
}

/// Point-in-time copy of [`BridgeStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    /// Analysis frames handed to the estimator.
    pub frames: u64,
    /// Frames in which the estimator reported a beat.
    pub beats: u64,
    /// Tempo commits made after a local beat.
    pub publishes: u64,
    /// Tempo commits made in response to a session tempo change.
    pub forwarded: u64,
    /// Blocks cut short by a collaborator error.
    pub failures: u64,
}

impl BridgeStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_frame(&self) {
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_beat(&self) {
        self.beats.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_publish(&self) {
        self.publishes.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_forward(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            frames: self.frames.load(Ordering::Relaxed),
            beats: self.beats.load(Ordering::Relaxed),
            publishes: self.publishes.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }

    pub fn reset(&self) {
        self.frames.store(0, Ordering::Relaxed);
        self.beats.store(0, Ordering::Relaxed);
        self.publishes.store(0, Ordering::Relaxed);
        self.forwarded.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_reflects_counters() {
        let stats = BridgeStats::new();
        stats.record_frame();
        stats.record_frame();
        stats.record_beat();
        stats.record_publish();
        stats.record_failure();

        let snap = stats.snapshot();
        assert_eq!(snap.frames, 2);
        assert_eq!(snap.beats, 1);
        assert_eq!(snap.publishes, 1);
        assert_eq!(snap.forwarded, 0);
        assert_eq!(snap.failures, 1);

        stats.reset();
        assert_eq!(stats.snapshot(), StatsSnapshot::default());
    }
}
