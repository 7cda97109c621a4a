//! In-process spill storage.
//!
//! Regions live in a `Vec<u8>`. The storage counts regions created and regions
//! still alive, which lets tests observe that every handle was released.

use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::{SpillFile, SpillStorage};

#[derive(Default)]
struct Counters {
    created: AtomicUsize,
    live: AtomicUsize,
}

/// Cloning shares the counters, so a test can keep a handle while the engine
/// owns another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    counters: Arc<Counters>,
    capacity: Option<usize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Regions refuse writes past `capacity` bytes, like a full disk.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counters: Arc::default(),
            capacity: Some(capacity),
        }
    }

    /// Regions handed out so far.
    pub fn created(&self) -> usize {
        self.counters.created.load(Ordering::Relaxed)
    }

    /// Regions not yet dropped.
    pub fn live(&self) -> usize {
        self.counters.live.load(Ordering::Relaxed)
    }
}

impl SpillStorage for MemoryStorage {
    fn create(&self) -> io::Result<Box<dyn SpillFile>> {
        self.counters.created.fetch_add(1, Ordering::Relaxed);
        self.counters.live.fetch_add(1, Ordering::Relaxed);
        Ok(Box::new(MemoryRegion {
            data: Cursor::new(Vec::new()),
            capacity: self.capacity,
            counters: Arc::clone(&self.counters),
        }))
    }
}

/// One region from [`MemoryStorage`]; releases its slot on drop.
pub struct MemoryRegion {
    data: Cursor<Vec<u8>>,
    capacity: Option<usize>,
    counters: Arc<Counters>,
}

impl Drop for MemoryRegion {
    fn drop(&mut self) {
        self.counters.live.fetch_sub(1, Ordering::Relaxed);
    }
}

impl Read for MemoryRegion {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.data.read(buf)
    }
}

impl Write for MemoryRegion {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Some(cap) = self.capacity {
            let pos = usize::try_from(self.data.position()).map_err(|_| {
                io::Error::new(io::ErrorKind::OutOfMemory, "memory region offset overflow")
            })?;
            if pos.saturating_add(buf.len()) > cap {
                return Err(io::Error::new(
                    io::ErrorKind::OutOfMemory,
                    format!("memory region full ({cap} bytes)"),
                ));
            }
        }
        self.data.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MemoryRegion {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.data.seek(pos)
    }
}
