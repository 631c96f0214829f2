//! BeatSyncEngine: owns the session and hands the bridge to the audio side.

use crate::analysis::BeatTracker;
use crate::core::{
    Arc, BridgeConfig, LocalSession, StatsSnapshot, SyncBridge, SyncControl, TempoSyncParams,
};
use crate::Result;
use parking_lot::Mutex;

#[cfg(feature = "input")]
use crate::core::{InputDevice, InputStream};

/// The bridge type the engine builds: a [`BeatTracker`] publishing to a
/// [`LocalSession`].
pub type EngineProcessor = SyncBridge<BeatTracker, LocalSession>;

/// Control-side owner of a configured tempo-sync bridge.
///
/// The processor (the real-time half) starts inside the engine. Hosts with
/// their own audio callback move it out with [`take_processor`](Self::take_processor);
/// offline use can drive it in place with [`with_processor`](Self::with_processor).
/// Everything else on the engine is lock-free and safe to call from any thread.
///
/// # Example
///
/// ```ignore
/// use beatsync::prelude::*;
///
/// let engine = BeatSyncEngine::builder().build()?;
/// let mut processor = engine.take_processor()?;
///
/// // audio thread
/// processor.process_block(&AudioBlock::new(&[&left, &right]));
///
/// // UI thread
/// println!("{:.1} BPM", engine.tempo_estimate());
/// engine.set_tempo_sync(false);
/// ```
pub struct BeatSyncEngine {
    config: BridgeConfig,
    control: SyncControl<LocalSession>,
    processor: Mutex<Option<EngineProcessor>>,

    #[cfg(feature = "input")]
    input: Mutex<Option<InputStream>>,
}

impl BeatSyncEngine {
    /// Create a new engine builder
    pub fn builder() -> crate::BeatSyncEngineBuilder {
        crate::BeatSyncEngineBuilder::default()
    }

    pub(crate) fn from_parts(config: BridgeConfig, processor: EngineProcessor) -> Self {
        tracing::info!(
            sample_rate = config.sample_rate,
            frame_size = config.frame_size,
            tempo_sync = processor.control().is_enabled(),
            "BeatSync engine ready"
        );
        Self {
            config,
            control: processor.control(),
            processor: Mutex::new(Some(processor)),
            #[cfg(feature = "input")]
            input: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn sample_rate(&self) -> f64 {
        self.config.sample_rate
    }

    /// Cloneable control handle for other threads.
    pub fn control(&self) -> SyncControl<LocalSession> {
        self.control.clone()
    }

    /// Move the processor out for a host audio callback.
    pub fn take_processor(&self) -> Result<EngineProcessor> {
        self.processor
            .lock()
            .take()
            .ok_or(crate::Error::ProcessorTaken)
    }

    /// Run `f` against the processor while it is still owned by the engine.
    ///
    /// Takes a lock, so this is for offline processing and tests, not for a
    /// real-time callback.
    pub fn with_processor<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut EngineProcessor) -> R,
    {
        let mut guard = self.processor.lock();
        let processor = guard.as_mut().ok_or(crate::Error::ProcessorTaken)?;
        Ok(f(processor))
    }

    pub fn has_processor(&self) -> bool {
        self.processor.lock().is_some()
    }

    /// Latest tempo estimate in BPM, 0.0 before the first beat.
    pub fn tempo_estimate(&self) -> f64 {
        self.control.tempo_estimate()
    }

    pub fn set_tempo_sync(&self, enabled: bool) {
        self.control.set_enabled(enabled);
    }

    pub fn is_tempo_sync(&self) -> bool {
        self.control.is_enabled()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.control.stats()
    }

    /// Emit the current counters at info level.
    pub fn log_stats(&self) {
        let stats = self.stats();
        tracing::info!(
            frames = stats.frames,
            beats = stats.beats,
            publishes = stats.publishes,
            forwarded = stats.forwarded,
            failures = stats.failures,
            tempo = self.tempo_estimate(),
            "BeatSync stats"
        );
    }

    /// The shared session the processor publishes to.
    pub fn session(&self) -> &Arc<LocalSession> {
        self.control.session()
    }

    /// Serialize the persisted options (currently the tempo-sync switch).
    pub fn save_state(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.control.params())?)
    }

    /// Replace the persisted options from a [`save_state`](Self::save_state)
    /// blob. Unparseable data leaves the engine unchanged.
    pub fn restore_state(&self, data: &[u8]) -> Result<()> {
        let params: TempoSyncParams = serde_json::from_slice(data)?;
        self.control.apply_params(params);
        tracing::info!(tempo_sync = params.enabled, "BeatSync state restored");
        Ok(())
    }

    /// Capture from an input device, moving the processor onto its callback.
    ///
    /// The device is opened and checked against the bridge configuration
    /// before the processor is taken, so a missing device or unusable rate
    /// leaves the engine able to retry. Only a failure to build or play the
    /// stream itself loses the processor.
    #[cfg(feature = "input")]
    pub fn start_input(&self, device_index: Option<usize>) -> Result<()> {
        if !self.has_processor() {
            return Err(crate::Error::ProcessorTaken);
        }

        let device = InputDevice::open(device_index)?;
        device
            .bridge_config(self.config.frame_size, self.config.max_block_size)
            .validate()?;

        let processor = self.take_processor()?;
        let stream = device.start(
            processor,
            self.config.frame_size,
            self.config.max_block_size,
        )?;
        *self.input.lock() = Some(stream);
        Ok(())
    }

    /// Stop capture. The processor is torn down with the stream.
    #[cfg(feature = "input")]
    pub fn stop_input(&self) {
        if self.input.lock().take().is_some() {
            tracing::info!("Input stream stopped");
        }
    }

    #[cfg(feature = "input")]
    pub fn is_capturing(&self) -> bool {
        self.input.lock().is_some()
    }

    #[cfg(feature = "input")]
    pub fn list_input_devices() -> Result<Vec<String>> {
        Ok(InputStream::list_input_devices()?)
    }
}
