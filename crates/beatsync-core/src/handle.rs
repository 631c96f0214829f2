//! Control-thread handle for a running bridge.

use crate::bridge::BridgeShared;
use crate::compat::Arc;
use crate::config::TempoSyncParams;
use crate::session::SyncSession;
use crate::stats::StatsSnapshot;

/// Cloneable handle for UI and control threads.
///
/// Created via [`SyncBridge::control`](crate::SyncBridge::control). Reads are
/// lock-free; toggling tempo sync also calls the session's enable switch on
/// the calling thread.
///
/// # Example
/// ```ignore
/// let control = bridge.control();
/// std::thread::spawn(move || {
///     control.set_enabled(false);
///     println!("{:.1} BPM", control.tempo_estimate());
/// });
/// ```
pub struct SyncControl<S: SyncSession> {
    shared: Arc<BridgeShared>,
    session: Arc<S>,
}

impl<S: SyncSession> Clone for SyncControl<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            session: Arc::clone(&self.session),
        }
    }
}

impl<S: SyncSession> SyncControl<S> {
    pub(crate) fn new(shared: Arc<BridgeShared>, session: Arc<S>) -> Self {
        Self { shared, session }
    }

    /// Latest tempo estimate in BPM, 0.0 before the first beat.
    pub fn tempo_estimate(&self) -> f64 {
        self.shared.tempo.load()
    }

    pub fn has_tempo_estimate(&self) -> bool {
        self.shared.tempo.has_estimate()
    }

    /// Turn publication to the session on or off.
    ///
    /// While the bridge is torn down only the request is recorded; the
    /// session is left disabled until the next `configure` applies it.
    pub fn set_enabled(&self, enabled: bool) {
        self.shared.gate.set(enabled);
        let attached = self.shared.is_attached();
        if attached {
            self.session.enable(enabled);
        }
        tracing::debug!(enabled, attached, "Tempo sync toggled");
    }

    /// Whether tempo sync is live: requested and attached to the session.
    pub fn is_enabled(&self) -> bool {
        self.shared.gate.is_open() && self.shared.is_attached()
    }

    pub fn params(&self) -> TempoSyncParams {
        TempoSyncParams {
            enabled: self.is_enabled(),
        }
    }

    pub fn apply_params(&self, params: TempoSyncParams) {
        self.set_enabled(params.enabled);
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.shared.stats.snapshot()
    }

    pub fn reset_stats(&self) {
        self.shared.stats.reset();
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }
}
