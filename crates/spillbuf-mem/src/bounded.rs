//! Reader that fails once more than a fixed number of bytes went through it.

use std::io::{self, Read};

use crate::error::Error;

/// Wraps a source and enforces a byte ceiling on everything read from it.
///
/// A read that pushes the running total over the ceiling still hands back its
/// bytes as `Ok(n)`; the ceiling error is reported by the following call.
/// End-of-stream is passed through untouched while under the ceiling.
#[derive(Debug)]
pub struct BoundedReader<R> {
    inner: R,
    read: u64,
    max: u64,
}

impl<R: Read> BoundedReader<R> {
    pub fn new(inner: R, max: u64) -> Self {
        Self {
            inner,
            read: 0,
            max,
        }
    }

    /// True once an overshooting read went through.
    pub fn is_exceeded(&self) -> bool {
        self.read > self.max
    }
}

impl<R: Read> Read for BoundedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.is_exceeded() {
            return Err(Error::MaxSizeReached { max: self.max }.into());
        }
        let n = self.inner.read(buf)?;
        self.read = self.read.saturating_add(n as u64);
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn passes_through_under_ceiling() {
        let mut r = BoundedReader::new(Cursor::new(vec![7u8; 10]), 10);
        let mut out = Vec::new();
        r.read_to_end(&mut out).unwrap();
        assert_eq!(out, vec![7u8; 10]);
        assert!(!r.is_exceeded());
    }

    #[test]
    fn overshooting_read_keeps_its_bytes() {
        let mut r = BoundedReader::new(Cursor::new(vec![1u8; 8]), 5);
        let mut buf = [0u8; 8];

        let n = r.read(&mut buf).unwrap();
        assert_eq!(n, 8);
        assert_eq!(buf, [1u8; 8]);
        assert!(r.is_exceeded());

        let err = r.read(&mut buf).unwrap_err();
        match Error::from(err) {
            Error::MaxSizeReached { max } => assert_eq!(max, 5),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn read_to_end_surfaces_ceiling() {
        let mut r = BoundedReader::new(Cursor::new(vec![0u8; 100]), 99);
        let mut out = Vec::new();
        let err = r.read_to_end(&mut out).unwrap_err();
        assert!(matches!(Error::from(err), Error::MaxSizeReached { max: 99 }));
        // Everything produced before the failure was delivered.
        assert_eq!(out.len(), 100);
    }

    #[test]
    fn source_errors_are_forwarded() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            }
        }
        let mut r = BoundedReader::new(Broken, 10);
        let err = r.read(&mut [0u8; 4]).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    }
}
