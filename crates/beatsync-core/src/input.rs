//! CPAL input capture feeding a [`SyncBridge`].

use crate::bridge::SyncBridge;
use crate::compat::{String, ToString, Vec};
use crate::config::{BridgeConfig, DEFAULT_FRAME_SIZE};
use crate::estimator::TempoEstimator;
use crate::session::SyncSession;
use crate::{Error, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use dasp_sample::{Sample, ToSample};

/// Device selection and analysis sizing for an [`InputStream`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputConfig {
    /// Index into the host's input devices; `None` picks the default device.
    pub device_index: Option<usize>,
    pub frame_size: usize,
    /// Mono buffer size. Larger callbacks are processed in several passes.
    pub max_block_size: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            device_index: None,
            frame_size: DEFAULT_FRAME_SIZE,
            max_block_size: 1024,
        }
    }
}

/// Holds a `cpal::Stream` so `InputStream` can move between threads.
struct StreamHandle(#[allow(dead_code)] cpal::Stream);

// SAFETY: the stream is never touched after construction; it is only kept
// alive and dropped by the owning InputStream.
unsafe impl Send for StreamHandle {}

/// A resolved input device with its native stream configuration.
///
/// Opening the device does not touch any bridge, so a caller can find out
/// whether capture is possible before giving up its processor.
pub struct InputDevice {
    device: cpal::Device,
    name: String,
    supported: cpal::SupportedStreamConfig,
}

impl InputDevice {
    /// Look up the default (or indexed) device and its default input format.
    pub fn open(device_index: Option<usize>) -> Result<Self> {
        let device = get_device(device_index)?;
        let name = device.name()?;
        let supported = device.default_input_config()?;

        match supported.sample_format() {
            cpal::SampleFormat::F32 | cpal::SampleFormat::I16 | cpal::SampleFormat::U16 => {}
            format => {
                return Err(Error::InvalidConfig(format!(
                    "Unsupported sample format: {:?}",
                    format
                )));
            }
        }

        Ok(Self {
            device,
            name,
            supported,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sample_rate(&self) -> f64 {
        self.supported.sample_rate().0 as f64
    }

    pub fn channels(&self) -> usize {
        self.supported.channels() as usize
    }

    /// Bridge sizing at this device's sample rate.
    pub fn bridge_config(&self, frame_size: usize, max_block_size: usize) -> BridgeConfig {
        BridgeConfig::new(self.sample_rate(), max_block_size, frame_size)
    }

    /// Configure `bridge` for this device and start capture.
    ///
    /// The bridge is consumed: any failure here drops it, which tears it
    /// down. Validate [`bridge_config`](Self::bridge_config) first to rule
    /// out a device rate the bridge rejects.
    pub fn start<E, S>(
        self,
        mut bridge: SyncBridge<E, S>,
        frame_size: usize,
        max_block_size: usize,
    ) -> Result<InputStream>
    where
        E: TempoEstimator + 'static,
        S: SyncSession + 'static,
    {
        let sample_rate = self.sample_rate();
        let channels = self.channels();
        bridge.configure(self.bridge_config(frame_size, max_block_size))?;

        let stream_config: cpal::StreamConfig = self.supported.config();
        let device = &self.device;
        let stream = match self.supported.sample_format() {
            cpal::SampleFormat::I16 => build_stream::<i16, E, S>(device, &stream_config, bridge)?,
            cpal::SampleFormat::U16 => build_stream::<u16, E, S>(device, &stream_config, bridge)?,
            _ => build_stream::<f32, E, S>(device, &stream_config, bridge)?,
        };

        stream.play()?;

        tracing::info!(
            device = %self.name,
            sample_rate,
            channels,
            "Input stream started"
        );

        Ok(InputStream {
            sample_rate,
            channels,
            device_name: self.name,
            _stream: StreamHandle(stream),
        })
    }
}

/// A running capture stream. The bridge lives inside the device callback
/// until this value is dropped.
pub struct InputStream {
    sample_rate: f64,
    channels: usize,
    device_name: String,
    _stream: StreamHandle,
}

impl InputStream {
    /// Open the configured device, then configure `bridge` for its native
    /// rate and start capture.
    ///
    /// Take a [`SyncControl`](crate::SyncControl) from the bridge first; the
    /// bridge itself moves onto the audio thread.
    pub fn start<E, S>(bridge: SyncBridge<E, S>, config: InputConfig) -> Result<Self>
    where
        E: TempoEstimator + 'static,
        S: SyncSession + 'static,
    {
        InputDevice::open(config.device_index)?.start(
            bridge,
            config.frame_size,
            config.max_block_size,
        )
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// List available input devices as `"index: name"`.
    pub fn list_input_devices() -> Result<Vec<String>> {
        let host = cpal::default_host();
        host.input_devices()?
            .enumerate()
            .map(|(idx, device)| Ok(format!("{}: {}", idx, device.name()?)))
            .collect()
    }
}

fn get_device(index: Option<usize>) -> Result<cpal::Device> {
    let host = cpal::default_host();

    if let Some(idx) = index {
        let devices: Vec<_> = host.input_devices()?.collect();

        let device_count = devices.len();
        devices.into_iter().nth(idx).ok_or_else(|| {
            Error::InvalidDevice(format!(
                "Input device index {} out of range (available: {})",
                idx, device_count
            ))
        })
    } else {
        host.default_input_device()
            .ok_or_else(|| Error::InvalidDevice("No input device available".to_string()))
    }
}

fn build_stream<T, E, S>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mut bridge: SyncBridge<E, S>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + Sample + ToSample<f32>,
    E: TempoEstimator + 'static,
    S: SyncSession + 'static,
{
    let channels = config.channels as usize;

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            // A panicking estimator loses this block only.
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                bridge.process_interleaved(data, channels);
            }));
        },
        |err| {
            tracing::warn!(error = %err, "Input stream error");
        },
        None,
    )?;

    Ok(stream)
}
