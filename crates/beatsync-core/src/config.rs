//! Bridge configuration and the persisted tempo-sync option.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Largest analysis frame the bridge will allocate.
pub const MAX_FRAME_SIZE: usize = 65536;

/// Default analysis frame length in samples.
pub const DEFAULT_FRAME_SIZE: usize = 1024;

/// Lifecycle configuration: fixed for the span between `configure` and `teardown`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BridgeConfig {
    pub sample_rate: f64,
    /// Upper bound on frames per host callback; sizes the mono buffer.
    pub max_block_size: usize,
    /// Analysis frame length handed to the estimator.
    pub frame_size: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100.0,
            max_block_size: 512,
            frame_size: DEFAULT_FRAME_SIZE,
        }
    }
}

impl BridgeConfig {
    pub fn new(sample_rate: f64, max_block_size: usize, frame_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            frame_size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(8000.0..=384000.0).contains(&self.sample_rate) {
            return Err(Error::InvalidConfig(format!(
                "sample_rate {} out of range (8000-384000 Hz)",
                self.sample_rate
            )));
        }
        if self.max_block_size == 0 {
            return Err(Error::InvalidConfig("max_block_size must be non-zero".into()));
        }
        if self.frame_size == 0 || self.frame_size > MAX_FRAME_SIZE {
            return Err(Error::InvalidFrameSize(self.frame_size));
        }
        Ok(())
    }

    /// Duration of one analysis frame in seconds.
    pub fn frame_duration(&self) -> f64 {
        self.frame_size as f64 / self.sample_rate
    }
}

/// User-facing options, persisted and restored by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TempoSyncParams {
    /// Whether tempo estimates are published to the sync session.
    pub enabled: bool,
}

impl Default for TempoSyncParams {
    fn default() -> Self {
        Self { enabled: true }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = BridgeConfig::default();
        assert_eq!(config.sample_rate, 44100.0);
        assert_eq!(config.frame_size, 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_sample_rate() {
        let config = BridgeConfig::new(1000.0, 512, 1024);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(BridgeConfig::new(48000.0, 0, 1024).validate().is_err());
        assert!(matches!(
            BridgeConfig::new(48000.0, 512, 0).validate(),
            Err(Error::InvalidFrameSize(0))
        ));
        assert!(BridgeConfig::new(48000.0, 512, MAX_FRAME_SIZE + 1)
            .validate()
            .is_err());
    }

    #[test]
    fn test_params_default_enabled() {
        assert!(TempoSyncParams::default().enabled);
    }
}
