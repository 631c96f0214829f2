//! Centralized error type for the beatsync umbrella crate.
//!
//! Wraps subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] beatsync_core::Error),

    #[error("State: {0}")]
    State(#[from] serde_json::Error),

    #[error("Processor already taken by the audio side")]
    ProcessorTaken,
}

pub type Result<T> = std::result::Result<T, Error>;
