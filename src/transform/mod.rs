//! # transform
//!
//! Text transformations applied to segment data between segmentation and sampling.
//!
//! A stage is a small value implementing [`Transform`]: it maps a segment's data to
//! new data and never touches the segment's spans. Stages compose in two ways:
//!
//! - as an ordered [`TransformChain`], applied one after the other;
//! - by wrapping a segment stream with [`SegmentStreamExt::transformed`], which keeps
//!   the pipeline lazy (one segment in flight at a time).
//!
//! The canonical order used by the processing pipeline is
//! [`Deleter`] → [`WordSplitter`] → [`WordFilter`].
//!
//! ## Example
//!
//! ```
//! use segsample::transform::{Transform, TransformChain, WordFilter, WordSplitter};
//!
//! let chain = TransformChain::new()
//!     .then(WordSplitter::default())
//!     .then(WordFilter::new(3));
//!
//! // GG CAA TTG CA TG, then words shorter than 3 are dropped
//! assert_eq!(chain.transform(b"ggcaattgcnnatg"), b"CAA TTG");
//! ```

mod deleter;
mod filter;
mod replace;
mod splitter;

pub use deleter::Deleter;
pub use filter::WordFilter;
pub(crate) use replace::replace_all;
pub use splitter::{WordSplitter, DEFAULT_SPLIT_PAIRS};

use crate::{error::Result, Segment};

/// A pure transformation of segment data
pub trait Transform {
    /// Transforms a segment's data
    fn transform(&self, data: &[u8]) -> Vec<u8>;

    /// Applies the transformation to a segment, keeping its spans
    fn apply(&self, segment: Segment) -> Segment {
        if self.is_identity() {
            return segment;
        }
        let data = self.transform(&segment.data);
        segment.with_data(data)
    }

    /// Whether this stage leaves every input unchanged
    fn is_identity(&self) -> bool {
        false
    }
}
impl<T: Transform + ?Sized> Transform for &T {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        (**self).transform(data)
    }

    fn is_identity(&self) -> bool {
        (**self).is_identity()
    }
}
impl<T: Transform + ?Sized> Transform for Box<T> {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        (**self).transform(data)
    }

    fn is_identity(&self) -> bool {
        (**self).is_identity()
    }
}

/// An ordered list of stages applied one after the other
#[derive(Default)]
pub struct TransformChain {
    stages: Vec<Box<dyn Transform>>,
}
impl TransformChain {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard pipeline: deletion, word splitting, then word filtering
    #[must_use]
    pub fn standard(deleter: Deleter, splitter: WordSplitter, filter: WordFilter) -> Self {
        Self::new().then(deleter).then(splitter).then(filter)
    }

    /// Appends a stage to the end of the chain
    #[must_use]
    pub fn then<T: Transform + 'static>(mut self, stage: T) -> Self {
        self.push(stage);
        self
    }

    pub fn push<T: Transform + 'static>(&mut self, stage: T) {
        self.stages.push(Box::new(stage));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}
impl Transform for TransformChain {
    fn transform(&self, data: &[u8]) -> Vec<u8> {
        let mut data = data.to_vec();
        for stage in self.stages.iter().filter(|stage| !stage.is_identity()) {
            data = stage.transform(&data);
        }
        data
    }

    fn is_identity(&self) -> bool {
        self.stages.iter().all(|stage| stage.is_identity())
    }
}

/// A segment stream with a stage applied to every segment
///
/// Errors from the wrapped stream pass through untouched.
pub struct Transformed<I, T> {
    inner: I,
    stage: T,
}
impl<I, T> Transformed<I, T> {
    pub fn new(inner: I, stage: T) -> Self {
        Self { inner, stage }
    }

    pub fn into_inner(self) -> I {
        self.inner
    }
}
impl<I, T> Iterator for Transformed<I, T>
where
    I: Iterator<Item = Result<Segment>>,
    T: Transform,
{
    type Item = Result<Segment>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner
            .next()
            .map(|segment| segment.map(|segment| self.stage.apply(segment)))
    }
}

/// Composition helpers for anything producing segments
pub trait SegmentStreamExt: Iterator<Item = Result<Segment>> + Sized {
    /// Wraps this stream so every segment passes through `stage`
    fn transformed<T: Transform>(self, stage: T) -> Transformed<Self, T> {
        Transformed::new(self, stage)
    }
}
impl<I: Iterator<Item = Result<Segment>>> SegmentStreamExt for I {}

#[cfg(test)]
mod testing {

    use std::io::Cursor;

    use super::*;
    use crate::{FilteredSpan, SourceSpan, Segmenter, SourceStream};

    fn segment(data: &[u8]) -> Segment {
        Segment::new(
            SourceSpan::new(10, 30),
            FilteredSpan::new(0, data.len() as u64),
            data.to_vec(),
        )
    }

    #[test]
    fn test_apply_keeps_spans() {
        let original = segment(b"ACGTNNAT");
        let transformed = WordSplitter::default().apply(original.clone());
        assert_eq!(transformed.source, original.source);
        assert_eq!(transformed.filtered, original.filtered);
        assert_eq!(transformed.data, b"AC GTA T");
    }

    #[test]
    fn test_standard_chain() {
        let chain = TransformChain::standard(
            Deleter::from_sequences(["GGGG"]),
            WordSplitter::default(),
            WordFilter::new(3),
        );
        assert_eq!(chain.len(), 3);

        // GGGG and CCCC are removed before splitting
        let out = chain.transform(b"TTTGGGGAAACCCCTTTCGAAA");
        assert_eq!(out, b"TTT AAA TTTC GAAA");
    }

    #[test]
    fn test_chain_of_identities() {
        let chain = TransformChain::new().then(Deleter::default());
        assert!(chain.is_identity());
        assert_eq!(chain.transform(b"acgt"), b"acgt");
    }

    #[test]
    fn test_transformed_stream_is_lazy_and_keeps_spans() -> Result<()> {
        let input = b">h\nACGTACGT\nATATCGCG\n";
        let source = SourceStream::new(Cursor::new(&input[..]));
        let plain: Vec<_> = Segmenter::new(source, 5)?.collect::<Result<_>>()?;

        let source = SourceStream::new(Cursor::new(&input[..]));
        let mut stream = Segmenter::new(source, 5)?
            .transformed(WordSplitter::default())
            .transformed(WordFilter::new(2));

        let first = stream.next().unwrap()?;
        assert_eq!(first.source, plain[0].source);
        assert_eq!(first.filtered, plain[0].filtered);
        assert_eq!(first.data, b"AC GT");

        let rest: Vec<_> = stream.collect::<Result<_>>()?;
        assert_eq!(rest.len(), plain.len() - 1);
        for (got, expected) in rest.iter().zip(&plain[1..]) {
            assert_eq!(got.filtered, expected.filtered);
            assert_eq!(got.source, expected.source);
        }
        Ok(())
    }

    #[test]
    fn test_errors_pass_through() {
        let input: Vec<Result<Segment>> = vec![
            Ok(segment(b"acgt")),
            Err(std::io::Error::other("boom").into()),
        ];
        let mut stream = input.into_iter().transformed(WordSplitter::default());
        assert_eq!(stream.next().unwrap().unwrap().data, b"AC GT");
        assert!(stream.next().unwrap().is_err());
        assert!(stream.next().is_none());
    }
}
