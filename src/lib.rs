//! # segsample
//!
//! Streaming segmentation and sampling of long, FASTA-like sequence files.
//!
//! A source file (plain or compressed) is reduced to the lines that carry
//! sequence data, re-chunked into fixed-size [`Segment`]s, transformed into
//! words, and sampled at evenly spaced windows. Every segment carries two
//! coordinate systems:
//!
//! - a [`SourceSpan`] of byte offsets in the raw source;
//! - a [`FilteredSpan`] of offsets in the concatenation of accepted lines.
//!
//! Every stage is a lazy iterator, so memory stays bounded by one segment.
//!
//! ## Example
//!
//! ```
//! use std::io::Cursor;
//!
//! use segsample::{
//!     sample::{SampleLayout, Sampler, SegmentSampler},
//!     transform::{SegmentStreamExt, WordSplitter},
//!     Segmenter, SourceStream,
//! };
//!
//! # fn main() -> segsample::Result<()> {
//! let input = b">chr1\nACGTACGTAC\nTTTTAAAAGG\n";
//! let source = SourceStream::new(Cursor::new(&input[..]));
//! let sampler = Sampler::new(SampleLayout::for_segment(8, 2, 2)?, 8)?;
//!
//! for segment in Segmenter::new(source, 8)?.transformed(WordSplitter::default()) {
//!     let segment = segment?;
//!     for sample in sampler.samples(&segment) {
//!         println!("{} {} {:?}", segment.source, segment.filtered, sample.orientation);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod segment;
mod span;

pub mod config;
pub mod pipeline;
pub mod sample;
pub mod source;
pub mod transform;
pub mod utils;
pub mod writer;

pub use error::{ConfigError, Error, Result, SourceError};
pub use segment::{Segment, Segmenter};
pub use source::{ExcludePrefix, FileSourceStream, LineFilter, SourceLine, SourceStream, SpanMode};
pub use span::{FilteredSpan, SourceSpan};
