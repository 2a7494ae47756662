//! Half-open byte intervals inside an arena.

use std::fmt;
use std::ops::Range;

/// The half-open interval `[start, end)` a buffer occupies in the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ByteRange {
    /// First byte of the buffer.
    pub start: usize,
    /// One past the last byte of the buffer.
    pub end: usize,
}

impl ByteRange {
    /// Interval of `len` bytes starting at `start`.
    ///
    /// Returns `None` if `start + len` overflows.
    pub fn new(start: usize, len: usize) -> Option<Self> {
        Some(Self {
            start,
            end: start.checked_add(len)?,
        })
    }

    /// Number of bytes covered.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Whether the interval covers no bytes.
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Whether the two intervals share at least one byte.
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// The interval as a slice range.
    pub fn as_range(&self) -> Range<usize> {
        self.start..self.end
    }
}

impl fmt::Display for ByteRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

impl From<ByteRange> for Range<usize> {
    fn from(r: ByteRange) -> Self {
        r.as_range()
    }
}
