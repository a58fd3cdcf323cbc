use core::ops::Range;

use crate::{Config, Error, Result};

/// The stretch of the stream the buffer should cover after a miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Plan {
    pub start: u64,
    pub size: usize,
}

impl Plan {
    pub fn end(&self) -> u64 {
        self.start + self.size as u64
    }
}

/// Places the window for a request of `len` bytes at `offset`.
///
/// Past the first two chunks the window starts two chunks before `offset`,
/// rounded down to a chunk boundary, which leaves some look-behind and keeps
/// window starts stable while access jitters around a boundary. The window
/// is widened to cover `offset + len`, and to keep whatever part of `valid`
/// it already overlaps so those bytes never have to be read again.
pub(crate) fn plan(config: &Config, offset: u64, len: usize, valid: Range<u64>) -> Result<Plan> {
    let chunk = config.chunk_size() as u64;
    let look_behind = chunk.saturating_mul(2);
    let start = if offset > look_behind {
        // chunk is a power of two
        (offset - look_behind) & !(chunk - 1)
    } else {
        0
    };

    let wanted = offset
        .checked_add(len as u64)
        .ok_or(Error::InvalidRequest)?;
    let mut end = start
        .saturating_add(config.window_size() as u64)
        .max(wanted);
    if valid.start <= start && start <= valid.end {
        end = end.max(valid.end);
    }

    let size = usize::try_from(end - start).map_err(|_| Error::OutOfMemory)?;
    trace!("Planned window {start}..{end} for {offset}+{len}");
    Ok(Plan { start, size })
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: Config = Config::DEFAULT;

    #[test]
    fn near_start_of_stream() {
        assert_eq!(
            plan(&CONFIG, 0, 100, 0..0),
            Ok(Plan { start: 0, size: 16384 })
        );
        // exactly two chunks in is still "near the start"
        assert_eq!(plan(&CONFIG, 2048, 1, 0..0).unwrap().start, 0);
        assert_eq!(plan(&CONFIG, 2049, 1, 0..0).unwrap().start, 0);
    }

    #[test]
    fn aligned_look_behind() {
        let p = plan(&CONFIG, 5000, 10, 0..0).unwrap();
        assert_eq!(p.start, 2048);
        assert_eq!(p.size, 16384);
        assert!(p.start <= 5000 - 2048);
        assert_eq!(p.start % 1024, 0);

        let p = plan(&CONFIG, 3072 + 2048, 10, 0..0).unwrap();
        assert_eq!(p.start, 3072);
    }

    #[test]
    fn grows_to_cover_request() {
        let p = plan(&CONFIG, 100, 40_000, 0..0).unwrap();
        assert_eq!(p.start, 0);
        assert_eq!(p.end(), 40_100);

        let p = plan(&CONFIG, 10_000, 20_000, 0..0).unwrap();
        assert_eq!(p.start, 7168);
        assert_eq!(p.end(), 30_000);
    }

    #[test]
    fn keeps_overlapping_valid_bytes() {
        // an earlier oversized window left valid data beyond the default end
        let p = plan(&CONFIG, 5000, 10, 0..60_000).unwrap();
        assert_eq!(p.start, 2048);
        assert_eq!(p.end(), 60_000);

        // disjoint data is not kept
        let p = plan(&CONFIG, 100_000, 10, 0..60_000).unwrap();
        assert_eq!(p.size, 16384);
    }

    #[test]
    fn overflowing_request() {
        assert_eq!(
            plan(&CONFIG, u64::MAX - 5, 10, 0..0),
            Err(Error::InvalidRequest)
        );
    }
}
