//! Fixed-size segmentation of a filtered line stream.
//!
//! The [`Segmenter`] re-chunks accepted lines into [`Segment`]s of exactly
//! `segment_size` characters, independent of the original line boundaries. Only
//! the final segment of a stream may be shorter, and a stream always produces at
//! least one segment: empty input yields a single empty segment that callers
//! treat as the terminal marker.
//!
//! ## Offset bookkeeping
//!
//! Filtered spans are exact: they advance by `segment_size` per completed
//! segment. Source spans are derived from the spans of the contributing lines:
//!
//! - a segment starts at the source start of the line that opened the buffer,
//!   or where the previous segment ended;
//! - a segment that ends mid-line ends at the source end of the last appended
//!   line minus the number of characters left over in the buffer.
//!
//! The source end is therefore only as precise as the line spans themselves
//! (see [`SpanMode`](crate::SpanMode)): the arithmetic assumes the characters of a
//! line are contiguous from its reported start. A segment's source span also
//! covers any header or blank lines skipped between its first and last line.

use log::debug;

use crate::{
    error::{ConfigError, Result},
    source::SourceLine,
    FilteredSpan, SourceSpan,
};

/// A contiguous chunk of filtered sequence with dual offset tracking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub source: SourceSpan,
    pub filtered: FilteredSpan,
    pub data: Vec<u8>,
}
impl Segment {
    #[must_use]
    pub fn new(source: SourceSpan, filtered: FilteredSpan, data: Vec<u8>) -> Self {
        Self {
            source,
            filtered,
            data,
        }
    }

    /// Returns a new segment with identical spans and replaced data
    #[must_use]
    pub fn with_data(self, data: Vec<u8>) -> Self {
        Self { data, ..self }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Lazy producer of fixed-size segments over a stream of accepted lines
///
/// Memory is bounded by one segment plus the line that overflowed it.
pub struct Segmenter<I> {
    lines: I,
    segment_size: usize,

    /// Accumulated filtered text not yet handed out
    buffer: Vec<u8>,

    /// Source start of the buffered text
    source_start: u64,

    /// Source end of the last line appended to the buffer
    source_end: u64,

    /// Filtered offset of the first buffered character
    filtered_offset: u64,

    /// Input exhausted (or failed)
    drained: bool,

    /// Final segment handed out
    finished: bool,

    n_segments: usize,
}
impl<I> Segmenter<I>
where
    I: Iterator<Item = Result<SourceLine>>,
{
    /// Creates a segmenter over any stream of accepted lines
    ///
    /// Fails with [`ConfigError::ZeroSegmentSize`] before anything is read if
    /// `segment_size` is zero.
    pub fn new(lines: I, segment_size: usize) -> Result<Self> {
        if segment_size == 0 {
            return Err(ConfigError::ZeroSegmentSize.into());
        }
        Ok(Self {
            lines,
            segment_size,
            buffer: Vec::new(),
            source_start: 0,
            source_end: 0,
            filtered_offset: 0,
            drained: false,
            finished: false,
            n_segments: 0,
        })
    }

    pub fn segment_size(&self) -> usize {
        self.segment_size
    }

    /// Number of segments handed out so far
    pub fn n_segments(&self) -> usize {
        self.n_segments
    }

    /// Gives back the line stream, e.g. to read its counters once done
    pub fn into_inner(self) -> I {
        self.lines
    }

    fn push_line(&mut self, line: SourceLine) {
        if self.buffer.is_empty() {
            // first contribution to a new segment
            self.source_start = line.span.start;
            self.buffer = line.text;
        } else {
            self.buffer.extend_from_slice(&line.text);
        }
        self.source_end = line.span.end;
    }

    /// Cuts a full segment off the front of the buffer
    fn split_front(&mut self) -> Segment {
        let remainder = self.buffer.split_off(self.segment_size);
        let data = std::mem::replace(&mut self.buffer, remainder);

        let end = self.source_end.saturating_sub(self.buffer.len() as u64);
        let segment = Segment::new(
            SourceSpan::new(self.source_start, end.max(self.source_start)),
            FilteredSpan::new(
                self.filtered_offset,
                self.filtered_offset + self.segment_size as u64,
            ),
            data,
        );

        // the leftover characters start where this segment ended
        self.source_start = segment.source.end;
        self.filtered_offset += self.segment_size as u64;
        segment
    }

    /// Hands out whatever is buffered as the final segment
    fn take_final(&mut self) -> Segment {
        self.finished = true;
        let data = std::mem::take(&mut self.buffer);
        let length = data.len() as u64;
        Segment::new(
            SourceSpan::new(self.source_start, self.source_end.max(self.source_start)),
            FilteredSpan::new(self.filtered_offset, self.filtered_offset + length),
            data,
        )
    }

    fn next_segment(&mut self) -> Option<Result<Segment>> {
        loop {
            if self.buffer.len() > self.segment_size {
                self.n_segments += 1;
                return Some(Ok(self.split_front()));
            }
            if self.drained {
                if self.finished {
                    return None;
                }
                let segment = self.take_final();
                self.n_segments += 1;
                debug!(
                    "Segmentation finished after {} segments ({} filtered characters)",
                    self.n_segments, segment.filtered.end
                );
                return Some(Ok(segment));
            }
            match self.lines.next() {
                Some(Ok(line)) => self.push_line(line),
                Some(Err(e)) => {
                    // a failed source produces no further segments
                    self.drained = true;
                    self.finished = true;
                    self.buffer.clear();
                    return Some(Err(e));
                }
                None => self.drained = true,
            }
        }
    }
}

impl<I> Iterator for Segmenter<I>
where
    I: Iterator<Item = Result<SourceLine>>,
{
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_segment()
    }
}
