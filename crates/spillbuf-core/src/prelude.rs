//! Convenient re-exports for downstream crates.

pub use crate::config::{BufferConfig, DEFAULT_BUFFER_BYTES, DEFAULT_MAX_BYTES, DEFAULT_MEM_BYTES};
pub use crate::error::{Error, Result};
