//! Compatibility layer for no_std + alloc.

pub use alloc::{
    boxed::Box,
    string::{String, ToString},
    sync::Arc,
    vec::Vec,
};

pub use core::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
