//! Write-side accumulator that spills like `ingest` and yields its content once.
//!
//! Lifecycle: `Writing -> Finalized -> Consumed`. `finalize` hands out the
//! accumulated bytes as a [`SpillableBuffer`] and moves ownership of the spill
//! file with it. Every later write or finalize fails with `AlreadyConsumed`.

use std::fmt;
use std::io::{self, Write};

use spillbuf_core::{BufferConfig, DEFAULT_MEM_BYTES};

use crate::buffer::SpillableBuffer;
use crate::error::{Error, Result};
use crate::spill::{storage_for, SpillFile, SpillStorage};

/// Observable lifecycle of a [`WriteOnce`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    Writing,
    Finalized,
    Consumed,
    /// Closed while writing; the spill file was released.
    Closed,
}

/// Bytes accepted while in `Writing`.
#[derive(Default)]
struct Pending {
    mem: Vec<u8>,
    spill: Option<Box<dyn SpillFile>>,
}

enum State {
    Writing(Pending),
    Finalized,
    Consumed,
    Closed,
}

pub struct WriteOnce {
    mem_bytes: u64,
    max_bytes: Option<u64>,
    storage: Box<dyn SpillStorage>,
    state: State,
    written: u64,
}

impl WriteOnce {
    /// Accumulator spilling to the storage selected by `cfg`.
    pub fn new(cfg: &BufferConfig) -> Result<Self> {
        Self::with_storage(cfg, Box::new(storage_for(cfg)))
    }

    /// A zero `mem_bytes` falls back to `DEFAULT_MEM_BYTES`.
    pub fn with_storage(cfg: &BufferConfig, storage: Box<dyn SpillStorage>) -> Result<Self> {
        cfg.validate()?;
        let mem_bytes = match cfg.mem_bytes {
            0 => DEFAULT_MEM_BYTES,
            n => n,
        };
        Ok(Self {
            mem_bytes,
            max_bytes: cfg.max_bytes,
            storage,
            state: State::Writing(Pending::default()),
            written: 0,
        })
    }

    pub fn state(&self) -> WriterState {
        match self.state {
            State::Writing(_) => WriterState::Writing,
            State::Finalized => WriterState::Finalized,
            State::Consumed => WriterState::Consumed,
            State::Closed => WriterState::Closed,
        }
    }

    /// Effective in-memory threshold.
    pub fn mem_bytes(&self) -> u64 {
        self.mem_bytes
    }

    pub fn bytes_written(&self) -> u64 {
        self.written
    }

    /// True once the accumulator holds a spill file.
    pub fn is_spilled(&self) -> bool {
        matches!(&self.state, State::Writing(p) if p.spill.is_some())
    }

    /// Append `data`, filling memory first and spilling the overflow.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        let pending = pending_mut(&mut self.state)?;

        if let Some(max) = self.max_bytes {
            if self.written.saturating_add(data.len() as u64) > max {
                return Err(Error::MaxSizeReached { max });
            }
        }

        let room = match pending.spill {
            Some(_) => 0,
            None => self.mem_bytes.saturating_sub(pending.mem.len() as u64),
        };
        let split = data.len().min(usize::try_from(room).unwrap_or(usize::MAX));
        let (head, tail) = data.split_at(split);
        pending.mem.extend_from_slice(head);

        if !tail.is_empty() {
            if let Err(e) = spill_tail(pending, self.storage.as_ref(), tail) {
                // A half-written spill file can't be trusted; drop everything.
                self.state = State::Closed;
                return Err(e);
            }
        }

        self.written += data.len() as u64;
        Ok(())
    }

    /// Hand out everything written so far. Only the first successful call
    /// returns a buffer.
    pub fn finalize(&mut self) -> Result<SpillableBuffer> {
        let pending = pending_mut(&mut self.state)?;
        if self.written == 0 {
            return Err(Error::NoDataReady);
        }
        if let Some(file) = pending.spill.as_mut() {
            file.flush()?;
        }

        let State::Writing(pending) = std::mem::replace(&mut self.state, State::Finalized) else {
            return Err(Error::AlreadyConsumed);
        };

        let buf = match SpillableBuffer::from_parts(pending.mem, pending.spill) {
            Ok(buf) => buf,
            Err(e) => {
                self.state = State::Closed;
                return Err(e);
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            size = buf.size(),
            spilled = buf.is_spilled(),
            "finalized write-once buffer"
        );

        Ok(buf)
    }

    /// Release an in-progress spill file. After finalize this is a no-op, as
    /// the returned buffer owns the file.
    pub fn close(&mut self) -> Result<()> {
        if let State::Writing(pending) = &self.state {
            if pending.spill.is_some() {
                self.state = State::Closed;
            }
        }
        Ok(())
    }
}

fn spill_tail(pending: &mut Pending, storage: &dyn SpillStorage, tail: &[u8]) -> Result<()> {
    if pending.spill.is_none() {
        #[cfg(feature = "tracing")]
        tracing::debug!(
            mem_bytes = pending.mem.len(),
            "memory threshold reached, spilling writes to temporary storage"
        );
        pending.spill = Some(storage.create()?);
    }
    if let Some(file) = pending.spill.as_mut() {
        file.write_all(tail)?;
    }

    #[cfg(feature = "tracing")]
    tracing::trace!(bytes = tail.len(), "spilled write");
    Ok(())
}

fn pending_mut(state: &mut State) -> Result<&mut Pending> {
    if matches!(state, State::Finalized) {
        *state = State::Consumed;
    }
    match state {
        State::Writing(pending) => Ok(pending),
        State::Finalized | State::Consumed => Err(Error::AlreadyConsumed),
        State::Closed => Err(Error::Closed),
    }
}

impl Write for WriteOnce {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match &mut self.state {
            State::Writing(Pending {
                spill: Some(file), ..
            }) => file.flush(),
            _ => Ok(()),
        }
    }
}

impl fmt::Debug for WriteOnce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WriteOnce")
            .field("mem_bytes", &self.mem_bytes)
            .field("max_bytes", &self.max_bytes)
            .field("state", &self.state())
            .field("written", &self.written)
            .finish()
    }
}
