/*!
Sliding-window, pointer-like read access to a forward-only byte stream.

A [`WindowedReader`] hands out borrowed views of "at least N bytes starting at
absolute offset O" from any [`Source`]: a file, a pipe or a socket. Short
reads, partial availability and end of stream are absorbed by the reader;
the caller only sees a contiguous slice plus an end-of-stream flag.

## Features
- no_std (needs `alloc`)
- works on non-seekable sources as long as offsets only move forward
- non-blocking sources surface "would block" as an empty, non-EOF view
- `std`: adapters for `std::io::Read` / `std::io::Seek`
- `log`: trace events through the `log` facade

## Usage
```
# use embedded_window as window;
# fn main() -> Result<(), window::Error> {
let data = [7u8; 10_000];
let mut reader = window::WindowedReader::new(window::Sequential(&data[..]));

let head = reader.request(0, 100)?;
assert!(head.len() >= 100);
assert!(!head.is_eof());

let tail = reader.request(9_990, 50)?;
assert_eq!(tail.len(), 10);
assert!(tail.is_eof());
# Ok(())
# }
```

## Limitations & non-goals
- read only
- offsets must not decrease across calls (no backward seeking)
- one caller per reader
- no memory mapping: every byte goes through `read`
*/

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

macro_rules! trace {
    ($($arg:tt)*) => {
        #[cfg(feature = "log")]
        log::trace!($($arg)*);
        #[cfg(test)]
        std::eprintln!($($arg)*);
    };
}

mod buffer;
mod config;
mod fill;
mod reader;
mod source;
mod window;


pub use config::Config;
pub use reader::{View, WindowedReader};
pub use source::{ReadOutcome, Seekable, Sequential, Source};
#[cfg(any(feature = "std", test))]
pub use source::{StdSeekable, StdStream};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A read on the source failed. Bytes read before the failure are kept.
    Io(embedded_io::ErrorKind),
    /// Repositioning the source failed.
    Seek(embedded_io::ErrorKind),
    /// The source cannot seek and the window would have to move backwards.
    Unseekable { from: u64, to: u64 },
    /// The window buffer could not be grown.
    OutOfMemory,
    /// A zero-length request.
    InvalidRequest,
    /// Chunk size not a power of two, or an empty window.
    InvalidConfig,
    /// Internal bookkeeping no longer adds up.
    Inconsistent,
}

pub type Result<T> = core::result::Result<T, Error>;

impl Error {
    pub(crate) fn from_io_error(error: impl embedded_io::Error) -> Self {
        Error::Io(error.kind())
    }

    pub(crate) fn from_seek_error(error: impl embedded_io::Error) -> Self {
        Error::Seek(error.kind())
    }
}

impl embedded_io::Error for Error {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Error::Io(kind) | Error::Seek(kind) => *kind,
            Error::Unseekable { .. } => embedded_io::ErrorKind::Unsupported,
            Error::OutOfMemory => embedded_io::ErrorKind::OutOfMemory,
            Error::InvalidRequest | Error::InvalidConfig => embedded_io::ErrorKind::InvalidInput,
            Error::Inconsistent => embedded_io::ErrorKind::Other,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Io(kind) => write!(f, "read failed: {kind:?}"),
            Error::Seek(kind) => write!(f, "seek failed: {kind:?}"),
            Error::Unseekable { from, to } => {
                write!(f, "cannot move unseekable source from {from} back to {to}")
            }
            Error::OutOfMemory => f.write_str("out of memory growing window buffer"),
            Error::InvalidRequest => f.write_str("requested length must be non-zero"),
            Error::InvalidConfig => {
                f.write_str("chunk size must be a power of two and window size non-zero")
            }
            Error::Inconsistent => f.write_str("window bookkeeping is inconsistent"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}
