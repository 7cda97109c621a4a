//! Build a [`SpillableBuffer`] by draining a reader.
//!
//! Steps:
//! 1. Read up to `mem_bytes` into memory.
//! 2. If the source ended inside that window, the buffer is memory-only.
//! 3. Otherwise open an anonymous spill file and copy the rest into it.
//!
//! The size ceiling is enforced over the whole stream (memory + spill), so a
//! ceiling tighter than the memory threshold still fails. Any failure drops the
//! spill file before the error is returned.

use std::io::{self, Read, Write};

use spillbuf_core::{BufferConfig, DEFAULT_BUFFER_BYTES};

use crate::bounded::BoundedReader;
use crate::buffer::SpillableBuffer;
use crate::error::Result;
use crate::spill::{storage_for, SpillStorage};

/// Drain `input` using the storage selected by `cfg`.
pub fn ingest<R: Read>(input: R, cfg: &BufferConfig) -> Result<SpillableBuffer> {
    ingest_with(input, cfg, &storage_for(cfg))
}

/// Drain `input`, spilling into regions from `storage`.
pub fn ingest_with<R: Read, S: SpillStorage + ?Sized>(
    input: R,
    cfg: &BufferConfig,
    storage: &S,
) -> Result<SpillableBuffer> {
    cfg.validate()?;

    let mut source = BoundedReader::new(input, cfg.max_bytes.unwrap_or(u64::MAX));

    let mut mem = Vec::new();
    (&mut source).take(cfg.mem_bytes).read_to_end(&mut mem)?;
    if (mem.len() as u64) < cfg.mem_bytes {
        return Ok(SpillableBuffer::from_bytes(mem));
    }

    // The memory window is full; only spill if the source has more to give.
    let mut lookahead = [0u8; DEFAULT_BUFFER_BYTES];
    let first = read_some(&mut source, &mut lookahead)?;
    if first == 0 {
        return Ok(SpillableBuffer::from_bytes(mem));
    }

    #[cfg(feature = "tracing")]
    tracing::debug!(
        mem_bytes = mem.len(),
        max_bytes = ?cfg.max_bytes,
        "memory threshold reached, spilling to temporary storage"
    );

    let mut file = storage.create()?;
    file.write_all(&lookahead[..first])?;
    io::copy(&mut source, &mut file)?;
    file.flush()?;

    let buf = SpillableBuffer::from_parts(mem, Some(file))?;

    #[cfg(feature = "tracing")]
    tracing::debug!(size = buf.size(), "spill complete");

    Ok(buf)
}

fn read_some<R: Read>(source: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    loop {
        match source.read(buf) {
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            other => return other,
        }
    }
}
