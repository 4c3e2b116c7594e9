use log::debug;

use super::{push_pair, Sample, SegmentSampler};
use crate::{
    error::{ConfigError, Result},
    Segment,
};

/// Placement of fixed-size sample windows inside a segment
///
/// Sample `i` starts at `margin_size * (i + 1) + sample_size * i`: there is one
/// margin before the first sample, one between each pair, and at least one
/// after the last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleLayout {
    pub sample_size: usize,
    pub margin_size: usize,
    pub number_samples: usize,
}
impl SampleLayout {
    /// Creates an unvalidated layout, see [`SampleLayout::validate`]
    #[must_use]
    pub fn new(sample_size: usize, margin_size: usize, number_samples: usize) -> Self {
        Self {
            sample_size,
            margin_size,
            number_samples,
        }
    }

    /// Spreads `number_samples` windows evenly over a segment
    ///
    /// The margin is `(segment_size - sample_size * number_samples) / (number_samples + 1)`
    /// (floor division). Fails when the samples alone do not fit.
    pub fn for_segment(
        segment_size: usize,
        sample_size: usize,
        number_samples: usize,
    ) -> Result<Self> {
        if segment_size == 0 {
            return Err(ConfigError::ZeroSegmentSize.into());
        }
        if sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize.into());
        }
        let samples_total = sample_size.checked_mul(number_samples);
        let Some(free) = samples_total.and_then(|total| segment_size.checked_sub(total)) else {
            return Err(Self::new(sample_size, 0, number_samples)
                .overflow(segment_size)
                .into());
        };
        let layout = Self::new(sample_size, free / (number_samples + 1), number_samples);
        layout.validate(segment_size)?;
        Ok(layout)
    }

    /// Characters needed by all samples and margins
    #[must_use]
    pub fn required(&self) -> u128 {
        let n = self.number_samples as u128;
        self.sample_size as u128 * n + self.margin_size as u128 * (n + 1)
    }

    /// Checks that every window and margin fits inside `segment_size`
    pub fn validate(&self, segment_size: usize) -> Result<()> {
        if segment_size == 0 {
            return Err(ConfigError::ZeroSegmentSize.into());
        }
        if self.sample_size == 0 {
            return Err(ConfigError::ZeroSampleSize.into());
        }
        if self.required() > segment_size as u128 {
            return Err(self.overflow(segment_size).into());
        }
        Ok(())
    }

    /// Start offset of sample `i`
    #[must_use]
    pub fn offset(&self, i: usize) -> usize {
        self.margin_size * (i + 1) + self.sample_size * i
    }

    fn overflow(&self, segment_size: usize) -> ConfigError {
        ConfigError::SampleLayoutOverflow {
            segment_size,
            sample_size: self.sample_size,
            margin_size: self.margin_size,
            number_samples: self.number_samples,
            required: self.required(),
        }
    }
}

/// Cuts fixed-size character windows out of segments
///
/// The layout is validated against the segment size once, at construction.
/// Segments shorter than that size (the last one of a stream, or data shrunk by
/// a transform) yield truncated or empty windows; the number of samples per
/// segment never changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    layout: SampleLayout,
}
impl Sampler {
    pub fn new(layout: SampleLayout, segment_size: usize) -> Result<Self> {
        layout.validate(segment_size)?;
        Ok(Self { layout })
    }

    #[must_use]
    pub fn layout(&self) -> SampleLayout {
        self.layout
    }
}
impl SegmentSampler for Sampler {
    fn fill(&self, segment: &Segment, samples: &mut Vec<Sample>) {
        samples.clear();
        let data = &segment.data;
        for i in 0..self.layout.number_samples {
            let start = self.layout.offset(i).min(data.len());
            let end = (start + self.layout.sample_size).min(data.len());
            if end - start < self.layout.sample_size {
                debug!(
                    "Sample {i} of segment at {} truncated to {} characters",
                    segment.filtered,
                    end - start
                );
            }
            push_pair(segment, data[start..end].to_vec(), samples);
        }
    }

    fn samples_per_segment(&self) -> usize {
        2 * self.layout.number_samples
    }
}

#[cfg(test)]
mod testing {

    use super::*;
    use crate::{sample::Orientation, Error, FilteredSpan, SourceSpan};

    fn segment(data: &[u8]) -> Segment {
        Segment::new(
            SourceSpan::new(100, 200),
            FilteredSpan::new(0, data.len() as u64),
            data.to_vec(),
        )
    }

    #[test]
    fn test_explicit_layout() -> Result<()> {
        let sampler = Sampler::new(SampleLayout::new(3, 1, 2), 12)?;
        let samples = sampler.samples(&segment(b"AAABBBCCCDDD"));
        assert_eq!(samples.len(), 4);

        let data: Vec<_> = samples.iter().map(|s| s.data.as_slice()).collect();
        assert_eq!(data, vec![&b"AAB"[..], b"BTT", b"BCC", b"GGB"]);

        let orientations: Vec<_> = samples.iter().map(|s| s.orientation).collect();
        assert_eq!(
            orientations,
            vec![
                Orientation::Forward,
                Orientation::ReverseComplement,
                Orientation::Forward,
                Orientation::ReverseComplement
            ]
        );
        Ok(())
    }

    #[test]
    fn test_samples_inherit_segment_spans() -> Result<()> {
        let parent = segment(b"ACGTACGTACGT");
        let sampler = Sampler::new(SampleLayout::new(2, 2, 2), 12)?;
        for sample in sampler.samples(&parent) {
            assert_eq!(sample.source, parent.source);
            assert_eq!(sample.filtered, parent.filtered);
        }
        Ok(())
    }

    #[test]
    fn test_for_segment_spreads_samples() -> Result<()> {
        let layout = SampleLayout::for_segment(12, 3, 2)?;
        assert_eq!(layout.margin_size, 2);
        assert_eq!(layout.offset(0), 2);
        assert_eq!(layout.offset(1), 7);

        let sampler = Sampler::new(layout, 12)?;
        let samples = sampler.samples(&segment(b"AAABBBCCCDDD"));
        assert_eq!(samples[0].data, b"ABB");
        assert_eq!(samples[2].data, b"CCD");
        Ok(())
    }

    #[test]
    fn test_for_segment_rejects_oversized_samples() {
        assert!(matches!(
            SampleLayout::for_segment(10, 4, 3),
            Err(Error::ConfigError(ConfigError::SampleLayoutOverflow { .. }))
        ));
        assert!(matches!(
            SampleLayout::for_segment(usize::MAX, usize::MAX, 2),
            Err(Error::ConfigError(ConfigError::SampleLayoutOverflow { .. }))
        ));
        assert!(matches!(
            SampleLayout::for_segment(10, 0, 3),
            Err(Error::ConfigError(ConfigError::ZeroSampleSize))
        ));
        assert!(matches!(
            SampleLayout::for_segment(0, 1, 1),
            Err(Error::ConfigError(ConfigError::ZeroSegmentSize))
        ));
    }

    #[test]
    fn test_validate_counts_every_margin() {
        // 2 * 3 + 3 * 2 = 12
        assert!(SampleLayout::new(3, 2, 2).validate(12).is_ok());
        assert!(SampleLayout::new(3, 2, 2).validate(11).is_err());
        assert_eq!(SampleLayout::new(3, 2, 2).required(), 12);
    }

    #[test]
    fn test_short_segment_truncates_windows() -> Result<()> {
        let sampler = Sampler::new(SampleLayout::new(3, 1, 2), 12)?;
        let samples = sampler.samples(&segment(b"AAAAAC"));
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].data, b"AAA");
        assert_eq!(samples[2].data, b"C");
        assert_eq!(samples[3].data, b"G");

        let samples = sampler.samples(&segment(b""));
        assert_eq!(samples.len(), 4);
        assert!(samples.iter().all(|s| s.data.is_empty()));
        Ok(())
    }

    #[test]
    fn test_fill_replaces_previous_contents() -> Result<()> {
        let sampler = Sampler::new(SampleLayout::new(1, 1, 1), 3)?;
        let mut samples = Vec::new();
        sampler.fill(&segment(b"ACG"), &mut samples);
        sampler.fill(&segment(b"TTT"), &mut samples);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].data, b"T");
        assert_eq!(samples[1].data, b"A");
        Ok(())
    }

    #[test]
    fn test_zero_samples() -> Result<()> {
        let sampler = Sampler::new(SampleLayout::new(5, 0, 0), 1)?;
        assert!(sampler.samples(&segment(b"ACGT")).is_empty());
        Ok(())
    }
}
