//! # sample
//!
//! Deterministic extraction of evenly spaced sample windows from segments.
//!
//! Every sample is emitted twice: once as read ([`Orientation::Forward`]) and once
//! as its reverse complement ([`Orientation::ReverseComplement`]). Both copies carry
//! the spans of the parent segment unchanged; they describe the segment a sample
//! came from, not the sample's own sub-window.
//!
//! Two strategies are provided:
//!
//! - [`Sampler`] cuts fixed-size character windows separated by fixed margins,
//!   laid out by a validated [`SampleLayout`];
//! - [`WordSampler`] cuts windows of whole words, sized as a percentage of the
//!   segment's word count.

mod sampler;
mod words;

pub use sampler::{SampleLayout, Sampler};
pub use words::WordSampler;

use crate::{utils::reverse_complement, FilteredSpan, Segment, SourceSpan};

/// Reading direction of a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    Forward,
    ReverseComplement,
}

/// A sub-window of a segment in one orientation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// Source span of the parent segment
    pub source: SourceSpan,
    /// Filtered span of the parent segment
    pub filtered: FilteredSpan,
    pub data: Vec<u8>,
    pub orientation: Orientation,
}

/// Strategy for carving samples out of a segment
pub trait SegmentSampler {
    /// Replaces the contents of `samples` with the samples of `segment`
    fn fill(&self, segment: &Segment, samples: &mut Vec<Sample>);

    /// Number of samples (both orientations) produced per segment
    fn samples_per_segment(&self) -> usize;

    /// Samples of `segment` in a freshly allocated vector
    fn samples(&self, segment: &Segment) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(self.samples_per_segment());
        self.fill(segment, &mut samples);
        samples
    }
}

/// Pushes a forward sample followed by its reverse complement
fn push_pair(segment: &Segment, window: Vec<u8>, samples: &mut Vec<Sample>) {
    let reversed = reverse_complement(&window);
    samples.push(Sample {
        source: segment.source,
        filtered: segment.filtered,
        data: window,
        orientation: Orientation::Forward,
    });
    samples.push(Sample {
        source: segment.source,
        filtered: segment.filtered,
        data: reversed,
        orientation: Orientation::ReverseComplement,
    });
}
