//! Lock-free primitives shared between the audio thread and control threads.

use crate::compat::{AtomicBool, Ordering};
use atomic_float::AtomicF64;

/// Cache-line aligned atomic f64 with acquire/release semantics.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicDouble {
    value: AtomicF64,
}

impl AtomicDouble {
    pub fn new(value: f64) -> Self {
        Self {
            value: AtomicF64::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f64) {
        self.value.store(value, Ordering::Release);
    }

    #[inline]
    pub fn swap(&self, value: f64) -> f64 {
        self.value.swap(value, Ordering::AcqRel)
    }
}

impl Default for AtomicDouble {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Tempo value that reads as "no estimate yet".
pub const NO_TEMPO_ESTIMATE: f64 = 0.0;

/// Most recent tempo estimate in BPM.
///
/// Single writer (the audio thread), any number of readers. The store is
/// release-ordered and loads are acquire-ordered, so a reader that sees a new
/// tempo also sees everything the audio thread did before publishing it.
#[derive(Debug, Default)]
pub struct TempoEstimateCell {
    bpm: AtomicDouble,
}

impl TempoEstimateCell {
    pub fn new() -> Self {
        Self {
            bpm: AtomicDouble::new(NO_TEMPO_ESTIMATE),
        }
    }

    /// Release-store a new estimate. Audio thread only.
    #[inline]
    pub fn store(&self, bpm: f64) {
        self.bpm.set(bpm);
    }

    /// Acquire-load the latest estimate.
    #[inline]
    pub fn load(&self) -> f64 {
        self.bpm.get()
    }

    /// Whether any estimate has been stored since the last reset.
    #[inline]
    pub fn has_estimate(&self) -> bool {
        self.load() != NO_TEMPO_ESTIMATE
    }

    pub fn reset(&self) {
        self.bpm.set(NO_TEMPO_ESTIMATE);
    }
}

/// Whether estimates are forwarded to the sync session.
///
/// Both sides use relaxed ordering: the flag only gates best-effort
/// publication, and the audio thread may act on a value one frame old.
#[derive(Debug)]
#[repr(align(64))]
pub struct EnableGate {
    enabled: AtomicBool,
}

impl EnableGate {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled: AtomicBool::new(enabled),
        }
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn set(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }
}

impl Default for EnableGate {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_double() {
        let val = AtomicDouble::new(1.0);
        assert_eq!(val.get(), 1.0);
        val.set(2.5);
        assert_eq!(val.get(), 2.5);
        assert_eq!(val.swap(3.0), 2.5);
    }

    #[test]
    fn test_tempo_cell_starts_empty() {
        let cell = TempoEstimateCell::new();
        assert!(!cell.has_estimate());
        cell.store(128.0);
        assert!(cell.has_estimate());
        assert_eq!(cell.load(), 128.0);
        cell.reset();
        assert_eq!(cell.load(), NO_TEMPO_ESTIMATE);
    }

    #[test]
    fn test_enable_gate() {
        let gate = EnableGate::default();
        assert!(gate.is_open());
        gate.set(false);
        assert!(!gate.is_open());
    }

    #[cfg(feature = "std")]
    #[test]
    fn test_tempo_cell_cross_thread() {
        use std::sync::Arc;

        let cell = Arc::new(TempoEstimateCell::new());
        let writer = cell.clone();
        std::thread::spawn(move || {
            for i in 1..=100 {
                writer.store(100.0 + i as f64);
            }
        })
        .join()
        .unwrap();
        assert_eq!(cell.load(), 200.0);
    }
}
