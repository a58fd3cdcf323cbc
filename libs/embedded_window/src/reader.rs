use core::ops::{Deref, Range};

use crate::buffer::WindowBuffer;
use crate::fill::{self, Stop};
use crate::source::{ReadOutcome, Source};
use crate::{Config, Error, Result, window};

/// Borrowed bytes handed out by [`WindowedReader::request`].
/// Valid until the next request on the same reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct View<'a> {
    bytes: &'a [u8],
    offset: u64,
    eof: bool,
}

impl<'a> View<'a> {
    /// Everything buffered from the requested offset on. This can be more
    /// than was asked for, and less only at end of stream, after a
    /// would-block, or on a non-blocking source.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Absolute stream position of the first byte.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The source reported end of stream while serving this request.
    ///
    /// A request that ends exactly at the end of the stream is filled
    /// without touching the source again, so it is not flagged. Only a
    /// request reaching past the last byte sees the end of stream.
    pub fn is_eof(&self) -> bool {
        self.eof
    }
}

impl Deref for View<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.bytes
    }
}

impl AsRef<[u8]> for View<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

/// Sliding-window reader over a forward-only [`Source`].
///
/// Requests are served from an internal, grow-only buffer. Offsets may jump
/// ahead but must never go back further than the window's look-behind.
///
/// ```
/// # use embedded_window::{Sequential, WindowedReader};
/// # fn main() -> Result<(), embedded_window::Error> {
/// let data: Vec<u8> = (0..=255).cycle().take(100_000).collect();
/// let mut reader = WindowedReader::new(Sequential(&data[..]));
/// let mut offset = 0;
/// loop {
///     let view = reader.request(offset, 4096)?;
///     assert_eq!(&view[..], &data[offset as usize..offset as usize + view.len()]);
///     offset += view.len().min(4096) as u64;
///     if view.is_eof() && view.len() <= 4096 {
///         break;
///     }
/// }
/// assert_eq!(offset, 100_000);
/// # Ok(())
/// # }
/// ```
pub struct WindowedReader<S> {
    source: S,
    config: Config,
    buffer: WindowBuffer,
    /// Where the source's cursor is, as far as we know.
    cursor: u64,
}

impl<S: Source> WindowedReader<S> {
    /// Wraps a source positioned at stream offset 0, using [`Config::DEFAULT`].
    pub fn new(source: S) -> Self {
        Self::with_config(source, Config::DEFAULT)
    }

    pub fn with_config(source: S, config: Config) -> Self {
        WindowedReader {
            source,
            config,
            buffer: WindowBuffer::new(),
            cursor: 0,
        }
    }

    /// Returns at least `len` bytes starting at absolute `offset`, unless
    /// the stream ends or a non-blocking source runs dry first.
    ///
    /// A short view with [`View::is_eof`] unset means "try again later".
    /// A failed read is reported as [`Error::Io`]; bytes read before it stay
    /// buffered so a retry picks up where the source left off.
    pub fn request(&mut self, offset: u64, len: usize) -> Result<View<'_>> {
        if len == 0 {
            return Err(Error::InvalidRequest);
        }
        trace!("Request for {len} bytes at {offset}");

        // in most cases the region will already be available
        let valid = self.buffer.valid();
        if valid.start <= offset && offset.saturating_add(len as u64) <= valid.end {
            trace!("Region is already in the buffer");
            return Ok(self.view(offset, false));
        }

        let plan = window::plan(&self.config, offset, len, valid)?;
        self.buffer.reserve_window(plan.size)?;
        let kept = self.buffer.rebase(&plan);
        let read_start = plan.start + kept as u64;

        if self.cursor != read_start {
            if let Some(stopped) = self.reposition(read_start)? {
                return Ok(self.view(offset, stopped == Stop::EndOfStream));
            }
        }

        // Includes whatever lies between the window start and `offset`:
        // reading it is cheaper than seeking, and impossible to avoid on a pipe.
        let max = plan.size - kept;
        let min = (offset + len as u64)
            .checked_sub(read_start)
            .filter(|&min| 0 < min && min <= max as u64)
            .ok_or(Error::Inconsistent)? as usize;

        let filled = fill::fill(&mut self.source, self.buffer.spare_mut(plan.size), min);
        self.buffer.commit(filled.read);
        self.cursor += filled.read as u64;

        let eof = match filled.stop {
            Stop::Satisfied | Stop::WouldBlock => false,
            Stop::EndOfStream => true,
            Stop::Failed(e) => {
                trace!("Read error after {} bytes", filled.read);
                return Err(Error::from_io_error(e));
            }
        };
        Ok(self.view(offset, eof))
    }

    /// Brings the source's cursor to `target`.
    ///
    /// Sources that cannot seek are moved forward by reading and discarding.
    /// If that skip is cut short the buffer is left empty at the cursor and
    /// the reason returned.
    fn reposition(&mut self, target: u64) -> Result<Option<Stop<()>>> {
        trace!("Repositioning from {} to {target}", self.cursor);
        match self.source.seek_to(target).map_err(Error::from_seek_error)? {
            Some(reached) if reached == target => {
                self.cursor = target;
                Ok(None)
            }
            Some(reached) => {
                self.cursor = reached;
                Err(Error::Seek(embedded_io::ErrorKind::Other))
            }
            None if target > self.cursor => self.skip_to(target),
            None => Err(Error::Unseekable {
                from: self.cursor,
                to: target,
            }),
        }
    }

    fn skip_to(&mut self, target: u64) -> Result<Option<Stop<()>>> {
        let scratch = self.buffer.scratch_mut();
        let stopped = loop {
            if self.cursor >= target {
                break None;
            }
            let want = usize::try_from(target - self.cursor)
                .map_or(scratch.len(), |gap| gap.min(scratch.len()));
            match self.source.read_into(&mut scratch[..want]) {
                Ok(ReadOutcome::Data(n)) => self.cursor += n as u64,
                Ok(ReadOutcome::EndOfStream) => break Some(Ok(Stop::EndOfStream)),
                Ok(ReadOutcome::WouldBlock) => break Some(Ok(Stop::WouldBlock)),
                Err(e) => break Some(Err(Error::from_io_error(e))),
            }
        };

        match stopped {
            None => Ok(None),
            Some(result) => {
                trace!("Skip stopped short at {} of {target}", self.cursor);
                self.buffer.reset(self.cursor);
                result.map(Some)
            }
        }
    }

    fn view(&self, offset: u64, eof: bool) -> View<'_> {
        View {
            bytes: self.buffer.bytes_from(offset),
            offset,
            eof,
        }
    }
}

impl<S> WindowedReader<S> {
    /// Frees the buffer and hands the source back, unclosed, wherever its
    /// cursor happens to be.
    pub fn release(self) -> S {
        self.source
    }

    /// Bytes currently allocated for the window. Never decreases.
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Absolute range of the stream currently held in the buffer.
    pub fn buffered(&self) -> Range<u64> {
        self.buffer.valid()
    }

    /// Where the source's cursor is believed to be.
    pub fn position(&self) -> u64 {
        self.cursor
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn get_ref(&self) -> &S {
        &self.source
    }

    /// Moving the source's cursor through this reference desynchronizes the
    /// reader.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.source
    }
}
