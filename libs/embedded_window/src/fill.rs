use crate::source::{ReadOutcome, Source};

/// Why a fill stopped.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Stop<E> {
    /// At least the minimum arrived.
    Satisfied,
    EndOfStream,
    WouldBlock,
    Failed(E),
}

#[derive(Debug)]
pub(crate) struct Filled<E> {
    pub read: usize,
    pub stop: Stop<E>,
}

/// Reads into `buf` until at least `min` bytes arrived.
///
/// Each read asks for all of the remaining space so a generous source can
/// fill the whole window in one call, but once `min` is met no further read
/// is started. End of stream, would-block and errors end the loop early;
/// bytes gathered up to that point are still reported in `read`.
pub(crate) fn fill<S: Source>(source: &mut S, buf: &mut [u8], min: usize) -> Filled<S::Error> {
    debug_assert!(0 < min && min <= buf.len());
    let mut read = 0;
    let stop = loop {
        match source.read_into(&mut buf[read..]) {
            Ok(ReadOutcome::Data(n)) => {
                debug_assert!(n <= buf.len() - read);
                read += n;
                if read >= min {
                    break Stop::Satisfied;
                }
            }
            Ok(ReadOutcome::EndOfStream) => break Stop::EndOfStream,
            Ok(ReadOutcome::WouldBlock) => break Stop::WouldBlock,
            Err(e) => break Stop::Failed(e),
        }
    };

    trace!(
        "Wanted {min} to {} bytes, read {read} bytes ({})",
        buf.len(),
        match stop {
            Stop::Satisfied => "satisfied",
            Stop::EndOfStream => "now at eof",
            Stop::WouldBlock => "would block",
            Stop::Failed(_) => "read error",
        }
    );
    Filled { read, stop }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{Script, Step};
    use embedded_io::ErrorKind;

    #[test]
    fn stops_once_minimum_is_met() {
        let mut source = Script::new(1000).steps(&[Step::Give(10), Step::Give(10), Step::Give(10)]);
        let mut buf = [0u8; 100];
        let filled = fill(&mut source, &mut buf, 15);
        assert_eq!(filled.read, 20);
        assert_eq!(filled.stop, Stop::Satisfied);
        assert_eq!(source.reads, 2);
        assert_eq!(&buf[..20], &source.data[..20]);
    }

    #[test]
    fn greedy_single_read() {
        let mut source = Script::new(1000);
        let mut buf = [0u8; 100];
        let filled = fill(&mut source, &mut buf, 1);
        assert_eq!(filled.read, 100);
        assert_eq!(source.reads, 1);
    }

    #[test]
    fn end_of_stream() {
        let mut source = Script::new(30);
        let mut buf = [0u8; 100];
        let filled = fill(&mut source, &mut buf, 50);
        assert_eq!(filled.read, 30);
        assert_eq!(filled.stop, Stop::EndOfStream);
    }

    #[test]
    fn would_block_returns_what_arrived() {
        let mut source = Script::new(1000).steps(&[Step::Give(5), Step::Block]);
        let mut buf = [0u8; 100];
        let filled = fill(&mut source, &mut buf, 50);
        assert_eq!(filled.read, 5);
        assert_eq!(filled.stop, Stop::WouldBlock);

        let mut source = Script::new(1000).steps(&[Step::Block]);
        let filled = fill(&mut source, &mut buf, 50);
        assert_eq!(filled.read, 0);
        assert_eq!(filled.stop, Stop::WouldBlock);
    }

    #[test]
    fn error_keeps_partial_count() {
        let mut source =
            Script::new(1000).steps(&[Step::Give(7), Step::Fail(ErrorKind::ConnectionReset)]);
        let mut buf = [0u8; 100];
        let filled = fill(&mut source, &mut buf, 50);
        assert_eq!(filled.read, 7);
        assert_eq!(filled.stop, Stop::Failed(ErrorKind::ConnectionReset));
    }
}
