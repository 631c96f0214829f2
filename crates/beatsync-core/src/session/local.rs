//! In-process tempo-sync session.

use super::{SessionState, SyncSession, TempoCallback};
use crate::compat::{Arc, AtomicBool, AtomicI64, AtomicU64, Ordering};
use crate::error::SessionError;
use crate::lockfree::AtomicDouble;
use arc_swap::ArcSwapOption;
use std::time::Instant;

/// Slowest tempo a session accepts.
pub const MIN_SESSION_TEMPO: f64 = 20.0;

/// Fastest tempo a session accepts.
pub const MAX_SESSION_TEMPO: f64 = 999.0;

const DEFAULT_SESSION_TEMPO: f64 = 120.0;

/// A session shared only within this process.
///
/// Timeline fields are individual atomics, so `commit_session_state` and
/// `capture_session_state` never block. A capture racing a commit may observe
/// a mix of the two snapshots.
pub struct LocalSession {
    epoch: Instant,
    tempo: AtomicDouble,
    tempo_time: AtomicI64,
    playing: AtomicBool,
    playing_time: AtomicI64,
    enabled: AtomicBool,
    commits: AtomicU64,
    tempo_callback: ArcSwapOption<TempoCallback>,
}

impl Default for LocalSession {
    fn default() -> Self {
        Self::new(DEFAULT_SESSION_TEMPO)
    }
}

impl LocalSession {
    /// Create a disabled session at `tempo` BPM (clamped to the session range).
    pub fn new(tempo: f64) -> Self {
        Self {
            epoch: Instant::now(),
            tempo: AtomicDouble::new(clamp_tempo(tempo)),
            tempo_time: AtomicI64::new(0),
            playing: AtomicBool::new(false),
            playing_time: AtomicI64::new(0),
            enabled: AtomicBool::new(false),
            commits: AtomicU64::new(0),
            tempo_callback: ArcSwapOption::empty(),
        }
    }

    /// Current session tempo in BPM.
    pub fn tempo(&self) -> f64 {
        self.tempo.get()
    }

    pub fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Acquire)
    }

    /// Number of successful commits since creation.
    pub fn commit_count(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    pub fn has_tempo_callback(&self) -> bool {
        self.tempo_callback.load().is_some()
    }

    /// Apply a tempo change as another participant would, then notify the
    /// registered listener on the calling thread.
    pub fn request_tempo(&self, bpm: f64) {
        let bpm = clamp_tempo(bpm);
        let now = self.clock_micros();
        self.tempo.set(bpm);
        self.tempo_time.store(now, Ordering::Release);

        if let Some(callback) = self.tempo_callback.load().as_ref() {
            callback(bpm);
        }
    }
}

impl SyncSession for LocalSession {
    fn clock_micros(&self) -> i64 {
        i64::try_from(self.epoch.elapsed().as_micros()).unwrap_or(i64::MAX)
    }

    fn capture_session_state(&self) -> SessionState {
        let mut state = SessionState::new(self.tempo.get());
        state.set_tempo(self.tempo.get(), self.tempo_time.load(Ordering::Acquire));
        state.set_is_playing(
            self.playing.load(Ordering::Acquire),
            self.playing_time.load(Ordering::Acquire),
        );
        state
    }

    fn commit_session_state(&self, state: SessionState) -> Result<(), SessionError> {
        if !state.tempo().is_finite() {
            return Err(SessionError::Rejected);
        }
        self.tempo_time
            .store(state.tempo_time_micros(), Ordering::Release);
        self.tempo.set(clamp_tempo(state.tempo()));
        self.playing_time
            .store(state.playing_time_micros(), Ordering::Release);
        self.playing.store(state.is_playing(), Ordering::Release);
        self.commits.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    fn enable(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    fn set_tempo_callback(&self, callback: Option<TempoCallback>) {
        self.tempo_callback.store(callback.map(Arc::new));
    }
}

#[inline]
fn clamp_tempo(bpm: f64) -> f64 {
    bpm.clamp(MIN_SESSION_TEMPO, MAX_SESSION_TEMPO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::Box;
    use crate::session::publish_tempo;

    #[test]
    fn test_defaults() {
        let session = LocalSession::default();
        assert_eq!(session.tempo(), 120.0);
        assert!(!session.is_enabled());
        assert!(!session.is_playing());
        assert_eq!(session.commit_count(), 0);
    }

    #[test]
    fn test_publish_sets_tempo_and_playing() {
        let session = LocalSession::default();
        publish_tempo(&session, 128.0).unwrap();

        let state = session.capture_session_state();
        assert_eq!(state.tempo(), 128.0);
        assert!(state.is_playing());
        assert_eq!(state.tempo_time_micros(), state.playing_time_micros());
        assert_eq!(session.commit_count(), 1);
    }

    #[test]
    fn test_tempo_clamped() {
        let session = LocalSession::new(5.0);
        assert_eq!(session.tempo(), MIN_SESSION_TEMPO);

        publish_tempo(&session, 5000.0).unwrap();
        assert_eq!(session.tempo(), MAX_SESSION_TEMPO);
    }

    #[test]
    fn test_non_finite_tempo_rejected() {
        let session = LocalSession::default();
        assert_eq!(
            publish_tempo(&session, f64::NAN),
            Err(SessionError::Rejected)
        );
        assert_eq!(session.commit_count(), 0);
    }

    #[test]
    fn test_clock_is_monotonic() {
        let session = LocalSession::default();
        let a = session.clock_micros();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let b = session.clock_micros();
        assert!(b > a);
    }

    #[test]
    fn test_request_tempo_notifies_listener() {
        let session = LocalSession::default();
        let seen = Arc::new(AtomicDouble::new(0.0));
        let seen_cb = seen.clone();
        session.set_tempo_callback(Some(Box::new(move |bpm| seen_cb.set(bpm))));
        assert!(session.has_tempo_callback());

        session.request_tempo(90.0);
        assert_eq!(seen.get(), 90.0);
        assert_eq!(session.tempo(), 90.0);

        session.set_tempo_callback(None);
        session.request_tempo(100.0);
        assert_eq!(seen.get(), 90.0);
    }
}
