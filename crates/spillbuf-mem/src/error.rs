use std::io;

use thiserror::Error;

/// Result type local to spillbuf-mem.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("maximum size {max} was reached")]
    MaxSizeReached { max: u64 },

    #[error("no data ready")]
    NoDataReady,

    #[error("reader has already been called")]
    AlreadyConsumed,

    #[error("buffer is closed")]
    Closed,

    #[error("unsupported seek: {0}")]
    UnsupportedSeek(&'static str),

    #[error("short write: sink accepted {accepted} of {offered} bytes")]
    ShortWrite { offered: usize, accepted: usize },

    #[error(transparent)]
    Config(#[from] spillbuf_core::Error),

    #[error("I/O error: {0}")]
    Io(io::Error),
}

/// Bulk copy failure, carrying how many bytes reached the sink first.
#[derive(Debug, Error)]
#[error("transfer stopped after {transferred} bytes: {source}")]
pub struct TransferError {
    pub transferred: u64,
    pub source: Error,
}

// Our errors travel through `std::io` traits wrapped in `io::Error`; unwrap
// them again on the way back so callers can match on the variant.
impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        if !e.get_ref().is_some_and(|inner| inner.is::<Error>()) {
            return Error::Io(e);
        }
        match e.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(err)) => *err,
            _ => Error::Io(io::Error::other("wrapped spillbuf error was lost")),
        }
    }
}

impl From<Error> for io::Error {
    fn from(e: Error) -> Self {
        match e {
            Error::Io(inner) => inner,
            Error::UnsupportedSeek(_) => io::Error::new(io::ErrorKind::Unsupported, e),
            Error::ShortWrite { .. } => io::Error::new(io::ErrorKind::WriteZero, e),
            other => io::Error::other(other),
        }
    }
}
