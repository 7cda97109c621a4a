//! Temporary backing storage for bytes that do not fit the memory threshold.
//!
//! The engine only needs "an anonymous region with sequential read/write and
//! seek-to-start, reclaimed when the handle is dropped". `TempFileStorage` gets
//! that from the OS; `MemoryStorage` keeps it in-process and counts live handles.

mod fs;
mod memory;

pub use fs::TempFileStorage;
pub use memory::{MemoryRegion, MemoryStorage};

use std::io::{self, Read, Seek, Write};

use spillbuf_core::BufferConfig;

/// Handle to one spill region. Dropping it releases the storage.
pub trait SpillFile: Read + Write + Seek + Send {}

impl<T: Read + Write + Seek + Send> SpillFile for T {}

/// Factory for spill regions.
///
/// Implementations must hand out regions whose names (if any) are already gone
/// from the filesystem, so closing the handle is the only cleanup left.
pub trait SpillStorage: Send + Sync {
    fn create(&self) -> io::Result<Box<dyn SpillFile>>;
}

/// Storage backend selected by the configuration.
pub fn storage_for(cfg: &BufferConfig) -> TempFileStorage {
    match &cfg.spill_dir {
        Some(dir) => TempFileStorage::in_dir(dir),
        None => TempFileStorage::new(),
    }
}
