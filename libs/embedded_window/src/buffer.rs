use alloc::vec::Vec;
use core::ops::Range;

use crate::window::Plan;
use crate::{Error, Result};

/// Grow-only window storage.
///
/// `data[..len]` holds the stream bytes starting at absolute position
/// `offset`. Everything past `len` is scratch space with undefined content.
pub(crate) struct WindowBuffer {
    data: Vec<u8>,
    offset: u64,
    len: usize,
}

impl WindowBuffer {
    pub fn new() -> Self {
        WindowBuffer {
            data: Vec::new(),
            offset: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn end(&self) -> u64 {
        self.offset + self.len as u64
    }

    pub fn valid(&self) -> Range<u64> {
        self.offset..self.end()
    }

    /// Bytes from absolute position `pos` to the end of the valid region.
    /// Empty when `pos` is outside of it.
    pub fn bytes_from(&self, pos: u64) -> &[u8] {
        if pos < self.offset || pos > self.end() {
            return &[];
        }
        let start = (pos - self.offset) as usize;
        &self.data[start..self.len]
    }

    /// Makes room for a window of `size` bytes. Capacity never shrinks and
    /// valid bytes survive the growth.
    pub fn reserve_window(&mut self, size: usize) -> Result<()> {
        let current = self.data.len();
        if size <= current {
            return Ok(());
        }
        self.data
            .try_reserve_exact(size - current)
            .map_err(|_| Error::OutOfMemory)?;
        self.data.resize(size, 0);
        trace!("Window buffer grown from {current} to {size} bytes");
        Ok(())
    }

    /// Rebases the buffer onto `plan.start`.
    ///
    /// If the planned window starts inside the valid region and reaches at
    /// least its end, the overlapping tail is moved to the front of the buffer
    /// and its length returned: those bytes need no new read. Otherwise the
    /// buffer is emptied and 0 returned.
    pub fn rebase(&mut self, plan: &Plan) -> usize {
        let end = self.end();
        let keep = if self.offset <= plan.start && plan.start <= end && plan.end() >= end {
            let from = (plan.start - self.offset) as usize;
            self.data.copy_within(from..self.len, 0);
            self.len - from
        } else {
            0
        };
        if keep > 0 {
            trace!("Reusing {keep} buffered bytes from {}", plan.start);
        }
        self.offset = plan.start;
        self.len = keep;
        keep
    }

    /// Scratch space of the current window past the valid bytes, up to `end`.
    pub fn spare_mut(&mut self, end: usize) -> &mut [u8] {
        &mut self.data[self.len..end]
    }

    /// Marks `n` more bytes after the valid region as stream data.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(self.len + n <= self.data.len());
        self.len += n;
    }

    /// Drops all valid data and restarts the region at `offset`.
    pub fn reset(&mut self, offset: u64) {
        self.offset = offset;
        self.len = 0;
    }

    pub fn scratch_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(offset: u64, bytes: &[u8], capacity: usize) -> WindowBuffer {
        let mut buffer = WindowBuffer::new();
        buffer.reserve_window(capacity).unwrap();
        buffer.reset(offset);
        buffer.spare_mut(bytes.len()).copy_from_slice(bytes);
        buffer.commit(bytes.len());
        buffer
    }

    #[test]
    fn grow_only() {
        let mut buffer = WindowBuffer::new();
        assert_eq!(buffer.capacity(), 0);
        buffer.reserve_window(64).unwrap();
        assert_eq!(buffer.capacity(), 64);
        buffer.reserve_window(16).unwrap();
        assert_eq!(buffer.capacity(), 64);
    }

    #[test]
    fn growth_keeps_valid_bytes() {
        let mut buffer = filled(10, b"abcdef", 8);
        buffer.reserve_window(32).unwrap();
        assert_eq!(buffer.bytes_from(10), b"abcdef");
        assert_eq!(buffer.bytes_from(13), b"def");
        assert_eq!(buffer.bytes_from(16), b"");
        assert_eq!(buffer.bytes_from(17), b"");
        assert_eq!(buffer.bytes_from(9), b"");
    }

    #[test]
    fn rebase_moves_overlapping_tail() {
        let mut buffer = filled(100, b"0123456789", 16);
        let kept = buffer.rebase(&Plan { start: 104, size: 16 });
        assert_eq!(kept, 6);
        assert_eq!(buffer.valid(), 104..110);
        assert_eq!(buffer.bytes_from(104), b"456789");
    }

    #[test]
    fn rebase_at_valid_end_keeps_nothing_but_stays_contiguous() {
        let mut buffer = filled(100, b"0123456789", 16);
        assert_eq!(buffer.rebase(&Plan { start: 110, size: 16 }), 0);
        assert_eq!(buffer.valid(), 110..110);
    }

    #[test]
    fn rebase_disjoint_discards() {
        let mut buffer = filled(100, b"0123456789", 16);
        assert_eq!(buffer.rebase(&Plan { start: 200, size: 16 }), 0);
        assert_eq!(buffer.valid(), 200..200);

        let mut buffer = filled(100, b"0123456789", 16);
        assert_eq!(buffer.rebase(&Plan { start: 50, size: 16 }), 0);
        assert_eq!(buffer.valid(), 50..50);
    }
}
