use embedded_io::{Error as _, ErrorKind, ErrorType, Read, Seek, SeekFrom};

/// What a single read on a [`Source`] produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    /// This many bytes, always more than zero, were written to the buffer.
    Data(usize),
    /// Nothing is left at the current position. Asking again later may
    /// still yield data if the resource grows.
    EndOfStream,
    /// A non-blocking resource has nothing right now.
    WouldBlock,
}

/// A readable, possibly seekable byte stream the reader pulls from.
///
/// The reader assumes it is the only one moving the stream's cursor.
pub trait Source: ErrorType {
    /// Reads into `buf`, which is never empty.
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error>;

    /// Moves the cursor to absolute position `pos` and returns the position
    /// reached, or `None` if this source cannot seek at all.
    fn seek_to(&mut self, pos: u64) -> Result<Option<u64>, Self::Error> {
        let _ = pos;
        Ok(None)
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error> {
        (**self).read_into(buf)
    }

    fn seek_to(&mut self, pos: u64) -> Result<Option<u64>, Self::Error> {
        (**self).seek_to(pos)
    }
}

fn outcome(read: usize) -> ReadOutcome {
    match read {
        0 => ReadOutcome::EndOfStream,
        n => ReadOutcome::Data(n),
    }
}

fn read_embedded<R: Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> Result<ReadOutcome, R::Error> {
    loop {
        match reader.read(buf) {
            Ok(read) => return Ok(outcome(read)),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

/// A non-seekable `embedded_io` reader, such as a pipe or a socket.
pub struct Sequential<R>(pub R);

impl<R: ErrorType> ErrorType for Sequential<R> {
    type Error = R::Error;
}

impl<R: Read> Source for Sequential<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error> {
        read_embedded(&mut self.0, buf)
    }
}

/// A seekable `embedded_io` reader, such as a file.
/// It has to be at position 0 when the reader is created.
pub struct Seekable<R>(pub R);

impl<R: ErrorType> ErrorType for Seekable<R> {
    type Error = R::Error;
}

impl<R: Read + Seek> Source for Seekable<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error> {
        read_embedded(&mut self.0, buf)
    }

    fn seek_to(&mut self, pos: u64) -> Result<Option<u64>, Self::Error> {
        self.0.seek(SeekFrom::Start(pos)).map(Some)
    }
}

#[cfg(any(feature = "std", test))]
fn read_std<R: std::io::Read + ?Sized>(
    reader: &mut R,
    buf: &mut [u8],
) -> std::io::Result<ReadOutcome> {
    use std::io::ErrorKind;
    loop {
        match reader.read(buf) {
            Ok(read) => return Ok(outcome(read)),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == ErrorKind::WouldBlock => return Ok(ReadOutcome::WouldBlock),
            Err(e) => return Err(e),
        }
    }
}

/// A non-seekable `std::io::Read`, e.g. stdin or a `TcpStream`.
/// Non-blocking handles report `WouldBlock` instead of stalling.
#[cfg(any(feature = "std", test))]
pub struct StdStream<R>(pub R);

#[cfg(any(feature = "std", test))]
impl<R> ErrorType for StdStream<R> {
    type Error = std::io::Error;
}

#[cfg(any(feature = "std", test))]
impl<R: std::io::Read> Source for StdStream<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error> {
        read_std(&mut self.0, buf)
    }
}

/// A seekable `std::io::Read + Seek`, e.g. a `File`.
#[cfg(any(feature = "std", test))]
pub struct StdSeekable<R>(pub R);

#[cfg(any(feature = "std", test))]
impl<R> ErrorType for StdSeekable<R> {
    type Error = std::io::Error;
}

#[cfg(any(feature = "std", test))]
impl<R: std::io::Read + std::io::Seek> Source for StdSeekable<R> {
    fn read_into(&mut self, buf: &mut [u8]) -> Result<ReadOutcome, Self::Error> {
        read_std(&mut self.0, buf)
    }

    fn seek_to(&mut self, pos: u64) -> Result<Option<u64>, Self::Error> {
        self.0.seek(std::io::SeekFrom::Start(pos)).map(Some)
    }
}
