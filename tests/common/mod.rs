//! Shared helpers for the integration suites.

#![allow(dead_code)]

use std::io::{self, Read};

/// Deterministic pseudo-random payload (xorshift64*), so failures reproduce.
pub fn payload(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed | 1;
    let mut out = Vec::with_capacity(len);
    while out.len() < len {
        state ^= state >> 12;
        state ^= state << 25;
        state ^= state >> 27;
        let word = state.wrapping_mul(0x2545_F491_4F6C_DD1D).to_le_bytes();
        let take = (len - out.len()).min(word.len());
        out.extend_from_slice(&word[..take]);
    }
    out
}

/// Read a stream to the end, panicking on error.
pub fn drain<R: Read>(r: &mut R) -> Vec<u8> {
    let mut out = Vec::new();
    r.read_to_end(&mut out).expect("drain failed");
    out
}

/// Reader that hands out at most `chunk` bytes per call, like a socket.
pub struct Trickle<R> {
    inner: R,
    chunk: usize,
}

impl<R> Trickle<R> {
    pub fn new(inner: R, chunk: usize) -> Self {
        Self { inner, chunk }
    }
}

impl<R: Read> Read for Trickle<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..n])
    }
}
