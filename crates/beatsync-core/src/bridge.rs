//! Tempo-sync bridge: audio blocks in, tempo estimates out.
//!
//! The bridge owns the real-time half of the system. Each host callback is
//! downmixed, accumulated into analysis frames, and every completed frame is
//! handed to the estimator in-line. Beats update the shared tempo cell and,
//! when the gate is open, are published to the sync session.
//!
//! ```text
//! host block ─▶ ChannelDownmixer ─▶ FrameAggregator ─┬─▶ TempoEstimator
//!                                                    └─▶ TempoEstimateCell ─▶ SyncSession
//! ```

use crate::compat::{Arc, AtomicBool, Box, Ordering};
use crate::config::{BridgeConfig, TempoSyncParams};
use crate::downmix::{AudioBlock, ChannelDownmixer};
use crate::estimator::TempoEstimator;
use crate::frame::FrameAggregator;
use crate::handle::SyncControl;
use crate::lockfree::{EnableGate, TempoEstimateCell};
use crate::session::{publish_tempo, SyncSession, TempoCallback};
use crate::stats::BridgeStats;
use crate::Result;
use dasp_sample::{Sample, ToSample};

/// Lifecycle state of a [`SyncBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BridgeState {
    /// No buffers; processing is a precondition violation.
    #[default]
    Unconfigured,
    /// Buffers sized, waiting for the first block.
    Ready,
    /// At least one block processed since `configure`.
    Running,
}

/// State shared between the audio thread, control handles and the session
/// tempo listener.
#[derive(Debug)]
pub(crate) struct BridgeShared {
    pub(crate) tempo: TempoEstimateCell,
    /// Requested sync state. Re-applied to the session on every `configure`.
    pub(crate) gate: EnableGate,
    pub(crate) stats: BridgeStats,
    /// Set between `configure` and `teardown`, while the bridge owns the
    /// session's enable switch and tempo listener.
    attached: AtomicBool,
}

impl BridgeShared {
    fn new(enabled: bool) -> Self {
        Self {
            tempo: TempoEstimateCell::new(),
            gate: EnableGate::new(enabled),
            stats: BridgeStats::new(),
            attached: AtomicBool::new(false),
        }
    }

    #[inline]
    pub(crate) fn is_attached(&self) -> bool {
        self.attached.load(Ordering::Acquire)
    }

    fn set_attached(&self, attached: bool) {
        self.attached.store(attached, Ordering::Release);
    }
}

/// Real-time side of the tempo-sync system.
///
/// `process_block` must only be called from one thread at a time and never
/// concurrently with `configure` or `teardown`; `&mut self` enforces this.
pub struct SyncBridge<E, S>
where
    E: TempoEstimator,
    S: SyncSession + 'static,
{
    estimator: E,
    session: Arc<S>,
    shared: Arc<BridgeShared>,
    downmixer: ChannelDownmixer,
    aggregator: FrameAggregator,
    config: Option<BridgeConfig>,
    state: BridgeState,
}

impl<E, S> SyncBridge<E, S>
where
    E: TempoEstimator,
    S: SyncSession + 'static,
{
    /// Create an unconfigured bridge. The session's enabled state is set from
    /// `params` immediately.
    pub fn new(estimator: E, session: Arc<S>, params: TempoSyncParams) -> Self {
        session.enable(params.enabled);
        Self {
            estimator,
            session,
            shared: Arc::new(BridgeShared::new(params.enabled)),
            downmixer: ChannelDownmixer::new(),
            aggregator: FrameAggregator::default(),
            config: None,
            state: BridgeState::Unconfigured,
        }
    }

    /// Control-thread handle sharing this bridge's tempo cell and gate.
    pub fn control(&self) -> SyncControl<S> {
        SyncControl::new(Arc::clone(&self.shared), Arc::clone(&self.session))
    }

    #[inline]
    pub fn state(&self) -> BridgeState {
        self.state
    }

    pub fn config(&self) -> Option<&BridgeConfig> {
        self.config.as_ref()
    }

    pub fn estimator(&self) -> &E {
        &self.estimator
    }

    pub fn estimator_mut(&mut self) -> &mut E {
        &mut self.estimator
    }

    pub fn session(&self) -> &Arc<S> {
        &self.session
    }

    /// Write position inside the current analysis frame.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.aggregator.cursor()
    }

    /// Analysis frames completed since `configure`.
    #[inline]
    pub fn frames_completed(&self) -> u64 {
        self.aggregator.frames_completed()
    }

    /// Acquire-load of the latest tempo estimate.
    #[inline]
    pub fn tempo_estimate(&self) -> f64 {
        self.shared.tempo.load()
    }

    /// Size every buffer and attach to the session. The only allocating step.
    ///
    /// Calling it again re-sizes the buffers and starts a fresh frame.
    pub fn configure(&mut self, config: BridgeConfig) -> Result<()> {
        config.validate()?;

        self.downmixer.prepare(config.max_block_size);
        self.aggregator.prepare(config.frame_size);
        self.estimator
            .configure(config.sample_rate, config.frame_size);
        self.shared.tempo.reset();

        self.shared.set_attached(true);
        self.session.enable(self.shared.gate.is_open());
        self.session
            .set_tempo_callback(Some(tempo_forwarder(&self.shared, &self.session)));

        self.config = Some(config);
        self.state = BridgeState::Ready;

        tracing::info!(
            sample_rate = config.sample_rate,
            max_block_size = config.max_block_size,
            frame_size = config.frame_size,
            tempo_sync = self.shared.gate.is_open(),
            "Tempo sync bridge configured"
        );
        Ok(())
    }

    /// Detach from the session and free buffers.
    pub fn teardown(&mut self) {
        if self.state == BridgeState::Unconfigured {
            return;
        }

        self.shared.set_attached(false);
        self.session.set_tempo_callback(None);
        self.session.enable(false);

        self.downmixer.release();
        self.aggregator.release();
        self.config = None;
        self.state = BridgeState::Unconfigured;

        let stats = self.shared.stats.snapshot();
        tracing::info!(
            frames = stats.frames,
            beats = stats.beats,
            publishes = stats.publishes,
            failures = stats.failures,
            "Tempo sync bridge torn down"
        );
    }

    /// Real-time entry point for planar audio.
    pub fn process_block<T>(&mut self, block: &AudioBlock<'_, T>)
    where
        T: Sample + ToSample<f32>,
    {
        if !self.begin_block() {
            return;
        }

        let total = block.num_frames();
        let chunk = self.downmixer.capacity();
        let mut healthy = true;
        let mut start = 0;

        while start < total && chunk > 0 {
            let frames = chunk.min(total - start);
            let mono = self.downmixer.downmix(block, start, frames);
            aggregate(
                mono,
                &mut self.aggregator,
                &mut self.estimator,
                &*self.session,
                &self.shared,
                &mut healthy,
            );
            start += frames;
        }
    }

    /// Real-time entry point for interleaved audio.
    pub fn process_interleaved<T>(&mut self, data: &[T], channels: usize)
    where
        T: Sample + ToSample<f32>,
    {
        if !self.begin_block() || channels == 0 {
            return;
        }

        let total = data.len() / channels;
        let chunk = self.downmixer.capacity();
        let mut healthy = true;
        let mut start = 0;

        while start < total && chunk > 0 {
            let frames = chunk.min(total - start);
            let mono = self
                .downmixer
                .downmix_interleaved(data, channels, start, frames);
            aggregate(
                mono,
                &mut self.aggregator,
                &mut self.estimator,
                &*self.session,
                &self.shared,
                &mut healthy,
            );
            start += frames;
        }
    }

    /// Returns whether the block may be processed.
    #[inline]
    fn begin_block(&mut self) -> bool {
        debug_assert!(
            self.state != BridgeState::Unconfigured,
            "process called on an unconfigured SyncBridge"
        );
        match self.state {
            BridgeState::Unconfigured => false,
            BridgeState::Ready => {
                self.state = BridgeState::Running;
                true
            }
            BridgeState::Running => true,
        }
    }
}

impl<E, S> Drop for SyncBridge<E, S>
where
    E: TempoEstimator,
    S: SyncSession + 'static,
{
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Push one mono chunk, running the per-frame logic for each completed frame.
///
/// After the first collaborator failure `healthy` is cleared and later frames
/// of the same block are only aggregated.
#[inline]
fn aggregate<E, S>(
    mono: &[f32],
    aggregator: &mut FrameAggregator,
    estimator: &mut E,
    session: &S,
    shared: &BridgeShared,
    healthy: &mut bool,
) where
    E: TempoEstimator,
    S: SyncSession + ?Sized,
{
    aggregator.push(mono, |frame| {
        if !*healthy {
            return;
        }
        if on_frame(estimator, session, shared, frame).is_err() {
            *healthy = false;
            shared.stats.record_failure();
        }
    });
}

#[inline]
fn on_frame<E, S>(estimator: &mut E, session: &S, shared: &BridgeShared, frame: &[f64]) -> Result<()>
where
    E: TempoEstimator,
    S: SyncSession + ?Sized,
{
    estimator.process_frame(frame)?;
    shared.stats.record_frame();

    if !estimator.beat_due_in_current_frame() {
        return Ok(());
    }
    shared.stats.record_beat();

    let tempo = estimator.current_tempo_estimate();
    shared.tempo.store(tempo);

    if shared.gate.is_open() {
        publish_tempo(session, tempo)?;
        shared.stats.record_publish();
    }
    Ok(())
}

/// Listener that answers a session tempo change by re-asserting the local
/// estimate.
fn tempo_forwarder<S>(shared: &Arc<BridgeShared>, session: &Arc<S>) -> TempoCallback
where
    S: SyncSession + 'static,
{
    let shared = Arc::clone(shared);
    let session = Arc::downgrade(session);
    Box::new(move |_incoming_bpm| {
        if let Some(session) = session.upgrade() {
            forward_estimate(&*session, &shared);
        }
    })
}

fn forward_estimate<S>(session: &S, shared: &BridgeShared)
where
    S: SyncSession + ?Sized,
{
    if !shared.gate.is_open() || !shared.tempo.has_estimate() {
        return;
    }
    match publish_tempo(session, shared.tempo.load()) {
        Ok(()) => shared.stats.record_forward(),
        Err(_) => shared.stats.record_failure(),
    }
}
