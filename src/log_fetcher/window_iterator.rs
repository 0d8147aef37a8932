use std::ops::RangeInclusive;

use alloy::primitives::BlockNumber;

/// An iterator over contiguous, non-overlapping block windows, oldest first.
///
/// The first window spans `start..=start + width`; every following window begins one block
/// after the previous end and ends `width` blocks after it. All windows are capped at `end`.
#[derive(Debug, Clone)]
pub struct WindowIterator {
    current: BlockNumber,
    end: BlockNumber,
    width: u64,
    window_count: u64,
    total_windows: u64,
}

impl WindowIterator {
    /// Creates an iterator over `start..=end`. Yields nothing when `start > end`.
    ///
    /// # Panics
    ///
    /// Panics if `width` is 0.
    #[must_use]
    pub const fn new(start: BlockNumber, end: BlockNumber, width: u64) -> Self {
        assert!(width >= 1, "chunk width must be at least 1");
        let total_windows = if start > end {
            0
        } else if end - start <= width {
            1
        } else {
            1 + (end - start - 1) / width
        };
        Self { current: start, end, width, window_count: 0, total_windows }
    }

    /// Returns the number of windows yielded so far.
    #[must_use]
    pub fn window_count(&self) -> u64 {
        self.window_count
    }

    /// Returns the total number of windows covering the range.
    #[must_use]
    pub fn total_windows(&self) -> u64 {
        self.total_windows
    }
}

impl Iterator for WindowIterator {
    type Item = RangeInclusive<BlockNumber>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.window_count >= self.total_windows {
            return None;
        }

        let span = if self.window_count == 0 { self.width } else { self.width - 1 };
        self.window_count += 1;

        let window_start = self.current;
        let window_end = window_start.saturating_add(span).min(self.end);
        self.current = window_end.saturating_add(1);

        Some(window_start..=window_end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match usize::try_from(self.total_windows - self.window_count) {
            Ok(remaining) => (remaining, Some(remaining)),
            Err(_) => (usize::MAX, None),
        }
    }
}

impl ExactSizeIterator for WindowIterator {}
