//! Half-open offset ranges used to trace segments back to their origin.
//!
//! Two independent coordinate systems are tracked for every segment:
//!
//! - [`SourceSpan`]: byte offsets in the original (decompressed) source, header
//!   and blank lines included.
//! - [`FilteredSpan`]: offsets in the logical concatenation of every accepted
//!   line, with skipped lines removed.

use std::fmt;

/// Half-open byte range `[start, end)` in the original source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SourceSpan {
    pub start: u64,
    pub end: u64,
}
impl SourceSpan {
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "source span must not be inverted");
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
impl fmt::Display for SourceSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Half-open range `[start, end)` in the filtered sequence
///
/// At the moment a segment is produced, `end - start` equals the length of its
/// data. Transforms may change the data length afterwards but never the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct FilteredSpan {
    pub start: u64,
    pub end: u64,
}
impl FilteredSpan {
    #[must_use]
    pub fn new(start: u64, end: u64) -> Self {
        debug_assert!(start <= end, "filtered span must not be inverted");
        Self { start, end }
    }

    #[must_use]
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}
impl fmt::Display for FilteredSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}
