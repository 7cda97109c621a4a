//! Read-many view over a memory segment and an optional spilled segment.
//!
//! Constraints:
//! - Content is fixed at construction; `size()` never changes.
//! - The only supported seek is back to the start.
//! - Closing releases the spill file; reads after close fail.

use std::io::{self, Read, Seek, SeekFrom, Write};

use spillbuf_core::DEFAULT_BUFFER_BYTES;

use crate::error::{Error, Result, TransferError};
use crate::segment::Segment;
use crate::spill::SpillFile;

#[derive(Debug)]
pub struct SpillableBuffer {
    len: u64,
    segments: Vec<Segment>,
    current: usize,
    closed: bool,
}

impl SpillableBuffer {
    /// Segments are read in order; the size is their summed length.
    fn from_segments(segments: Vec<Segment>) -> Self {
        let len = segments.iter().map(Segment::len).sum();
        Self {
            len,
            segments,
            current: 0,
            closed: false,
        }
    }

    /// A buffer that never spilled.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self::from_segments(vec![Segment::memory(bytes)])
    }

    /// Memory bytes followed by the full contents of `spill`. The spill file is
    /// measured and rewound here.
    pub(crate) fn from_parts(mem: Vec<u8>, spill: Option<Box<dyn SpillFile>>) -> Result<Self> {
        let mut segments = Vec::with_capacity(2);
        segments.push(Segment::memory(mem));
        if let Some(file) = spill {
            segments.push(Segment::spill(file)?);
        }
        Ok(Self::from_segments(segments))
    }

    /// Total logical size, independent of the read position.
    pub fn size(&self) -> u64 {
        self.len
    }

    pub fn is_spilled(&self) -> bool {
        self.segments.iter().any(Segment::is_spill)
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Reposition every segment at its start so the next read begins at byte 0.
    pub fn rewind_to_start(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::Closed);
        }
        for segment in &mut self.segments {
            segment.rewind()?;
        }
        self.current = 0;
        Ok(())
    }

    /// Copy the unread remainder into `sink` in `DEFAULT_BUFFER_BYTES` chunks.
    ///
    /// A sink that accepts fewer bytes than offered without an error stops the
    /// transfer with `Error::ShortWrite`. The error carries the bytes moved so far.
    pub fn write_to<W: Write + ?Sized>(
        &mut self,
        sink: &mut W,
    ) -> std::result::Result<u64, TransferError> {
        let mut chunk = [0u8; DEFAULT_BUFFER_BYTES];
        let mut transferred = 0u64;
        let fail = |transferred: u64, source: Error| TransferError {
            transferred,
            source,
        };

        loop {
            let n = match self.read(&mut chunk) {
                Ok(0) => return Ok(transferred),
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(fail(transferred, e.into())),
            };

            let accepted = sink
                .write(&chunk[..n])
                .map_err(|e| fail(transferred, e.into()))?;
            transferred += accepted as u64;
            if accepted != n {
                return Err(fail(
                    transferred,
                    Error::ShortWrite {
                        offered: n,
                        accepted,
                    },
                ));
            }
        }
    }

    /// Release the backing storage. Calling it again is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        #[cfg(feature = "tracing")]
        if self.is_spilled() {
            tracing::debug!(size = self.len, "releasing spill file");
        }
        self.segments.clear();
        Ok(())
    }
}

impl Read for SpillableBuffer {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.closed {
            return Err(Error::Closed.into());
        }
        if buf.is_empty() {
            return Ok(0);
        }
        while let Some(segment) = self.segments.get_mut(self.current) {
            let n = segment.read(buf)?;
            if n > 0 {
                return Ok(n);
            }
            self.current += 1;
        }
        Ok(0)
    }
}

impl Seek for SpillableBuffer {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        match pos {
            SeekFrom::Start(0) => {
                self.rewind_to_start()?;
                Ok(0)
            }
            SeekFrom::Start(_) => Err(Error::UnsupportedSeek("only offset 0 is supported").into()),
            SeekFrom::End(_) | SeekFrom::Current(_) => {
                Err(Error::UnsupportedSeek("only SeekFrom::Start is supported").into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spill::{MemoryStorage, SpillStorage};

    fn spilled(head: &[u8], tail: &[u8], storage: &MemoryStorage) -> SpillableBuffer {
        let mut file = storage.create().unwrap();
        file.write_all(tail).unwrap();
        SpillableBuffer::from_parts(head.to_vec(), Some(file)).unwrap()
    }

    fn drain(buf: &mut SpillableBuffer) -> Vec<u8> {
        let mut out = Vec::new();
        buf.read_to_end(&mut out).unwrap();
        out
    }

    #[test]
    fn reads_segments_in_order() {
        let storage = MemoryStorage::new();
        let mut buf = spilled(b"hello ", b"world", &storage);
        assert_eq!(buf.size(), 11);
        assert!(buf.is_spilled());
        assert_eq!(drain(&mut buf), b"hello world");
        // End-of-stream is sticky until rewound.
        assert_eq!(buf.read(&mut [0u8; 4]).unwrap(), 0);
    }

    #[test]
    fn rewind_replays_everything() {
        let storage = MemoryStorage::new();
        let mut buf = spilled(b"abc", b"defgh", &storage);
        let mut partial = [0u8; 5];
        buf.read_exact(&mut partial).unwrap();
        assert_eq!(&partial, b"abcde");

        assert_eq!(buf.seek(SeekFrom::Start(0)).unwrap(), 0);
        assert_eq!(drain(&mut buf), b"abcdefgh");
        assert_eq!(buf.size(), 8);
    }

    #[test]
    fn other_seeks_are_unsupported() {
        let mut buf = SpillableBuffer::from_bytes(b"xyz".to_vec());
        for pos in [SeekFrom::Start(1), SeekFrom::Current(0), SeekFrom::End(0)] {
            let err = buf.seek(pos).unwrap_err();
            assert_eq!(err.kind(), io::ErrorKind::Unsupported);
            assert!(matches!(Error::from(err), Error::UnsupportedSeek(_)));
        }
    }

    #[test]
    fn write_to_copies_remainder() {
        let storage = MemoryStorage::new();
        let mut buf = spilled(&[1u8; 700], &[2u8; 900], &storage);
        let mut first = [0u8; 100];
        buf.read_exact(&mut first).unwrap();

        let mut sink = Vec::new();
        let n = buf.write_to(&mut sink).unwrap();
        assert_eq!(n, 1500);
        assert_eq!(&sink[..600], &[1u8; 600][..]);
        assert_eq!(&sink[600..], &[2u8; 900][..]);
    }

    #[test]
    fn short_write_is_a_fault() {
        struct Stingy;
        impl Write for Stingy {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                Ok(buf.len().min(10))
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buf = SpillableBuffer::from_bytes(vec![9u8; 100]);
        let err = buf.write_to(&mut Stingy).unwrap_err();
        assert_eq!(err.transferred, 10);
        assert!(matches!(
            err.source,
            Error::ShortWrite {
                offered: 100,
                accepted: 10
            }
        ));
    }

    #[test]
    fn sink_error_reports_progress() {
        struct FailSecond(usize);
        impl Write for FailSecond {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0 += 1;
                if self.0 > 1 {
                    return Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"));
                }
                Ok(buf.len())
            }
            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        let mut buf = SpillableBuffer::from_bytes(vec![0u8; 2000]);
        let err = buf.write_to(&mut FailSecond(0)).unwrap_err();
        assert_eq!(err.transferred, DEFAULT_BUFFER_BYTES as u64);
        assert!(matches!(err.source, Error::Io(ref e) if e.kind() == io::ErrorKind::BrokenPipe));
    }

    #[test]
    fn close_releases_spill_once() {
        let storage = MemoryStorage::new();
        let mut buf = spilled(b"a", b"b", &storage);
        assert_eq!(storage.live(), 1);

        buf.close().unwrap();
        assert_eq!(storage.live(), 0);
        buf.close().unwrap();
        assert_eq!(storage.live(), 0);

        assert_eq!(buf.size(), 2);
        let err = buf.read(&mut [0u8; 1]).unwrap_err();
        assert!(matches!(Error::from(err), Error::Closed));
        assert!(matches!(buf.rewind_to_start(), Err(Error::Closed)));
    }

    #[test]
    fn spill_size_comes_from_the_file() {
        let storage = MemoryStorage::new();
        let mut file = storage.create().unwrap();
        file.write_all(b"0123456789").unwrap();
        // Left mid-file on purpose; the buffer still serves all of it.
        file.seek(SeekFrom::Start(7)).unwrap();

        let mut buf = SpillableBuffer::from_parts(b"ab".to_vec(), Some(file)).unwrap();
        assert_eq!(buf.size(), 12);
        let out = drain(&mut buf);
        assert_eq!(out.len() as u64, buf.size());
        assert_eq!(out, b"ab0123456789");
    }

    #[test]
    fn write_to_after_close_moves_nothing() {
        let storage = MemoryStorage::new();
        let mut buf = spilled(b"head", b"tail", &storage);
        buf.close().unwrap();

        let mut sink = Vec::new();
        let err = buf.write_to(&mut sink).unwrap_err();
        assert_eq!(err.transferred, 0);
        assert!(matches!(err.source, Error::Closed));
        assert!(sink.is_empty());
    }

    #[test]
    fn seek_to_start_after_close_fails() {
        let mut buf = SpillableBuffer::from_bytes(b"gone".to_vec());
        buf.close().unwrap();
        let err = buf.seek(SeekFrom::Start(0)).unwrap_err();
        assert!(matches!(Error::from(err), Error::Closed));
    }

    #[test]
    fn close_without_spill_is_noop() {
        let mut buf = SpillableBuffer::from_bytes(b"tiny".to_vec());
        assert!(!buf.is_spilled());
        buf.close().unwrap();
        buf.close().unwrap();
    }
}
