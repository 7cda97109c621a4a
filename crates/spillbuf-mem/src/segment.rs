//! One contiguous, independently rewindable piece of a [`SpillableBuffer`].
//!
//! [`SpillableBuffer`]: crate::buffer::SpillableBuffer

use std::fmt;
use std::io::{self, Cursor, Read, Seek, SeekFrom};

use crate::spill::SpillFile;

pub(crate) enum Segment {
    /// Bytes held in RAM.
    Memory(Cursor<Vec<u8>>),
    /// Bytes spilled to temporary storage; `len` is the file's length when wrapped.
    Spill { file: Box<dyn SpillFile>, len: u64 },
}

impl Segment {
    pub(crate) fn memory(bytes: Vec<u8>) -> Self {
        Segment::Memory(Cursor::new(bytes))
    }

    /// Wrap a finished spill file. Its length is taken from the file itself and
    /// the file is left positioned at its start.
    pub(crate) fn spill(mut file: Box<dyn SpillFile>) -> io::Result<Self> {
        let len = file.seek(SeekFrom::End(0))?;
        file.seek(SeekFrom::Start(0))?;
        Ok(Segment::Spill { file, len })
    }

    pub(crate) fn len(&self) -> u64 {
        match self {
            Segment::Memory(cur) => cur.get_ref().len() as u64,
            Segment::Spill { len, .. } => *len,
        }
    }

    pub(crate) fn is_spill(&self) -> bool {
        matches!(self, Segment::Spill { .. })
    }

    /// Reposition this segment at its first byte.
    pub(crate) fn rewind(&mut self) -> io::Result<()> {
        match self {
            Segment::Memory(cur) => {
                cur.set_position(0);
                Ok(())
            }
            Segment::Spill { file, .. } => file.seek(SeekFrom::Start(0)).map(|_| ()),
        }
    }
}

impl Read for Segment {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Segment::Memory(cur) => cur.read(buf),
            Segment::Spill { file, .. } => file.read(buf),
        }
    }
}

impl fmt::Debug for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Memory(cur) => f
                .debug_struct("Memory")
                .field("len", &cur.get_ref().len())
                .field("pos", &cur.position())
                .finish(),
            Segment::Spill { len, .. } => f.debug_struct("Spill").field("len", len).finish(),
        }
    }
}
