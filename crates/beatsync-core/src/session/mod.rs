//! Shared tempo-sync session seam.
//!
//! A session is a clock and tempo timeline shared with other participants.
//! The bridge only ever writes tempo snapshots to it, toggles it, and listens
//! for tempo changes made elsewhere; it never reads position or phase.

#[cfg(feature = "std")]
mod local;

#[cfg(feature = "std")]
pub use local::{LocalSession, MAX_SESSION_TEMPO, MIN_SESSION_TEMPO};

use crate::compat::Box;
use crate::error::SessionError;

/// Listener for tempo changes made by another session participant.
pub type TempoCallback = Box<dyn Fn(f64) + Send + Sync>;

/// Mutable snapshot of a session timeline.
///
/// Captured from the session, edited against session-clock timestamps, then
/// committed back.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionState {
    tempo: f64,
    tempo_time_micros: i64,
    is_playing: bool,
    playing_time_micros: i64,
}

impl SessionState {
    pub fn new(tempo: f64) -> Self {
        Self {
            tempo,
            tempo_time_micros: 0,
            is_playing: false,
            playing_time_micros: 0,
        }
    }

    #[inline]
    pub fn tempo(&self) -> f64 {
        self.tempo
    }

    /// Session-clock time at which the current tempo took effect.
    #[inline]
    pub fn tempo_time_micros(&self) -> i64 {
        self.tempo_time_micros
    }

    pub fn set_tempo(&mut self, bpm: f64, at_micros: i64) {
        self.tempo = bpm;
        self.tempo_time_micros = at_micros;
    }

    #[inline]
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    #[inline]
    pub fn playing_time_micros(&self) -> i64 {
        self.playing_time_micros
    }

    pub fn set_is_playing(&mut self, playing: bool, at_micros: i64) {
        self.is_playing = playing;
        self.playing_time_micros = at_micros;
    }
}

/// An external shared tempo-sync session.
///
/// `clock_micros`, `capture_session_state` and `commit_session_state` are
/// called from the audio thread and must be lock-free. `enable` and
/// `set_tempo_callback` are only called from control threads.
pub trait SyncSession: Send + Sync {
    /// Monotonic session clock in microseconds.
    fn clock_micros(&self) -> i64;

    fn capture_session_state(&self) -> SessionState;

    fn commit_session_state(&self, state: SessionState) -> Result<(), SessionError>;

    fn enable(&self, enabled: bool);

    fn is_enabled(&self) -> bool;

    /// Register (or with `None`, detach) the tempo-change listener.
    fn set_tempo_callback(&self, callback: Option<TempoCallback>);
}

/// Commit `bpm` as the session tempo with the transport marked playing,
/// both stamped with the session's own clock.
#[inline]
pub fn publish_tempo<S: SyncSession + ?Sized>(session: &S, bpm: f64) -> Result<(), SessionError> {
    let now = session.clock_micros();
    let mut state = session.capture_session_state();
    state.set_tempo(bpm, now);
    state.set_is_playing(true, now);
    session.commit_session_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_state_edits() {
        let mut state = SessionState::new(120.0);
        assert!(!state.is_playing());

        state.set_tempo(128.0, 1_000);
        state.set_is_playing(true, 2_000);

        assert_eq!(state.tempo(), 128.0);
        assert_eq!(state.tempo_time_micros(), 1_000);
        assert!(state.is_playing());
        assert_eq!(state.playing_time_micros(), 2_000);
    }
}
