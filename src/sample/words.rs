use super::{push_pair, Sample, SegmentSampler};
use crate::{
    error::{ConfigError, Result},
    Segment,
};

/// Cuts windows of whole words out of segments
///
/// For a segment with `w` words, each sample holds `w * percent / 100` words.
/// The words left over are split into equal gaps, and half a gap is left before
/// the first sample. Words of a sample are joined with single spaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordSampler {
    percent: usize,
    count: usize,
}
impl WordSampler {
    /// Fails unless `count >= 1`, `1 <= percent <= 100` and all samples together
    /// take at most the whole segment
    pub fn new(percent: usize, count: usize) -> Result<Self> {
        if count == 0 {
            return Err(ConfigError::ZeroSampleCount.into());
        }
        if percent == 0 || percent > 100 {
            return Err(
                ConfigError::InvalidPercent(format!("{percent}% is outside 1..=100")).into(),
            );
        }
        if percent.saturating_mul(count) > 100 {
            return Err(ConfigError::InvalidPercent(format!(
                "{count} samples of {percent}% exceed the segment"
            ))
            .into());
        }
        Ok(Self { percent, count })
    }

    #[must_use]
    pub fn percent(&self) -> usize {
        self.percent
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }
}
impl SegmentSampler for WordSampler {
    fn fill(&self, segment: &Segment, samples: &mut Vec<Sample>) {
        samples.clear();
        let words: Vec<&[u8]> = segment
            .data
            .split(u8::is_ascii_whitespace)
            .filter(|word| !word.is_empty())
            .collect();

        let per_sample = words.len() * self.percent / 100;
        let between = (words.len() - per_sample * self.count) / self.count;
        let left = between / 2;

        for i in 0..self.count {
            let start = (left + i * (between + per_sample)).min(words.len());
            let end = (start + per_sample).min(words.len());
            let window = words[start..end].join(&b' ');
            push_pair(segment, window, samples);
        }
    }

    fn samples_per_segment(&self) -> usize {
        2 * self.count
    }
}
