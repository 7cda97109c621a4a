#![forbid(unsafe_code)]
//! spillbuf: a re-readable byte buffer that keeps small payloads in memory and
//! spills large ones to anonymous temporary files.
//!
//! ```no_run
//! use std::io::Read;
//!
//! let cfg = spillbuf::BufferConfig::default()
//!     .with_mem_bytes(64 * 1024)?
//!     .with_max_bytes(20 * 1024 * 1024)?;
//! let mut buf = spillbuf::ingest(std::io::stdin(), &cfg)?;
//! let mut first = Vec::new();
//! buf.read_to_end(&mut first)?;
//! buf.rewind_to_start()?;
//! assert_eq!(buf.size(), first.len() as u64);
//! buf.close()?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use spillbuf_core::{BufferConfig, DEFAULT_BUFFER_BYTES, DEFAULT_MAX_BYTES, DEFAULT_MEM_BYTES};
pub use spillbuf_mem::{
    ingest, ingest_with, storage_for, BoundedReader, Error, MemoryStorage, Result, SpillFile,
    SpillStorage, SpillableBuffer, TempFileStorage, TransferError, WriteOnce, WriterState,
};

/// Buffer `input` with the default configuration (1 MiB in memory, no ceiling).
pub fn new<R: std::io::Read>(input: R) -> Result<SpillableBuffer> {
    ingest(input, &BufferConfig::default())
}
