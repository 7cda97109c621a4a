#![forbid(unsafe_code)]
//! spillbuf-core: configuration for the spillable buffer engine.
//!
//! Holds the memory threshold / size ceiling options and their validation.
//! The engine itself lives in `spillbuf-mem`; nothing here touches the filesystem.

pub mod config;
pub mod error;
pub mod prelude;

pub use config::{BufferConfig, DEFAULT_BUFFER_BYTES, DEFAULT_MAX_BYTES, DEFAULT_MEM_BYTES};
pub use error::{Error, Result};
