//! Pagination window type for historical log queries

use serde::{Deserialize, Serialize};

/// Number of blocks queried per pagination window
///
/// Used when a provider rejects a single `[0, head]` log query. The range is
/// split into consecutive inclusive windows of at most this many blocks.
///
/// # Examples
///
/// ```
/// use revokescan::ScanWindow;
///
/// let window = ScanWindow::DEFAULT;
/// assert_eq!(window.as_u64(), 100_000);
///
/// let chunks: Vec<_> = ScanWindow::new(1000).chunk_range(0, 2500).collect();
/// assert_eq!(chunks, vec![(0, 999), (1000, 1999), (2000, 2500)]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "u64", into = "u64")]
pub struct ScanWindow(u64);

impl ScanWindow {
    /// Default window size (100,000 blocks)
    pub const DEFAULT: Self = Self(100_000);

    /// Create a new window size
    ///
    /// A size of zero would never advance, so it is raised to one block.
    pub const fn new(blocks: u64) -> Self {
        if blocks == 0 {
            Self(1)
        } else {
            Self(blocks)
        }
    }

    /// Get the inner u64 value
    pub const fn as_u64(&self) -> u64 {
        self.0
    }

    /// Number of windows needed to cover `[start, end]`
    ///
    /// # Examples
    ///
    /// ```
    /// use revokescan::ScanWindow;
    ///
    /// assert_eq!(ScanWindow::new(100_000).chunks_needed(0, 250_000), 3);
    /// assert_eq!(ScanWindow::new(100_000).chunks_needed(10, 5), 0);
    /// ```
    pub fn chunks_needed(&self, start: u64, end: u64) -> usize {
        if end < start {
            return 0;
        }
        ((end - start) / self.0 + 1) as usize
    }

    /// Split `[start, end]` into ascending inclusive windows
    pub fn chunk_range(&self, start: u64, end: u64) -> WindowIterator {
        WindowIterator {
            current: start,
            end,
            size: self.0,
            done: end < start,
        }
    }
}

impl Default for ScanWindow {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<u64> for ScanWindow {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl From<ScanWindow> for u64 {
    fn from(window: ScanWindow) -> Self {
        window.0
    }
}

impl std::fmt::Display for ScanWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} blocks", self.0)
    }
}

/// Iterator over pagination windows
///
/// Created by [`ScanWindow::chunk_range`]. Yields `(from_block, to_block)`
/// tuples in strictly ascending order.
#[derive(Debug, Clone)]
pub struct WindowIterator {
    current: u64,
    end: u64,
    size: u64,
    done: bool,
}

impl Iterator for WindowIterator {
    type Item = (u64, u64);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let chunk_start = self.current;
        let chunk_end = chunk_start
            .saturating_add(self.size - 1)
            .min(self.end);

        // Checked so a window ending at u64::MAX terminates
        match chunk_end.checked_add(1) {
            Some(next) if next <= self.end => self.current = next,
            _ => self.done = true,
        }

        Some((chunk_start, chunk_end))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            let chunks = ((self.end - self.current) / self.size + 1) as usize;
            (chunks, Some(chunks))
        }
    }
}

impl ExactSizeIterator for WindowIterator {}
