#![forbid(unsafe_code)]
//! spillbuf-mem: bounded in-memory buffering with transparent spill to disk.
//!
//! Two entry points converge on [`SpillableBuffer`]:
//! - [`ingest`] drains a reader, keeping up to `mem_bytes` in RAM and spilling
//!   the rest to an anonymous temp file.
//! - [`WriteOnce`] accepts writes over time with the same spill strategy and
//!   hands out the accumulated bytes exactly once.
//!
//! Nothing here is thread-safe by contract; callers serialize access.

pub mod bounded;
pub mod buffer;
pub mod error;
pub mod ingest;
mod segment;
pub mod spill;
pub mod writer;

pub use bounded::BoundedReader;
pub use buffer::SpillableBuffer;
pub use error::{Error, Result, TransferError};
pub use ingest::{ingest, ingest_with};
pub use spill::{storage_for, MemoryStorage, SpillFile, SpillStorage, TempFileStorage};
pub use writer::{WriteOnce, WriterState};
