//! Pipeline parameters and their eager validation.
//!
//! A [`PipelineConfig`] is the full parameter bundle of a processing run. It can
//! be built in code, loaded from a TOML file, or both (the command-line tool
//! loads a file and then overrides single fields). Nothing is streamed until
//! [`PipelineConfig::validate`] has turned it into a [`ValidatedConfig`].
//!
//! ```toml
//! segment_size = "1M"
//! min_word_length = 13
//! seed = 42
//! orientation_style = "named"
//!
//! [sampling]
//! count = 3
//! size = "3%"
//! unit = "chars"
//!
//! [deletion]
//! count = 10
//! length = 6
//! ```

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use log::warn;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    error::{ConfigError, Result},
    sample::{Sample, SampleLayout, Sampler, SegmentSampler, WordSampler},
    transform::{Deleter, TransformChain, WordFilter, WordSplitter, DEFAULT_SPLIT_PAIRS},
    utils::parse_count,
    writer::OrientationStyle,
    Segment, SpanMode,
};

pub const DEFAULT_SEGMENT_SIZE: usize = 1_000_000;
pub const DEFAULT_MIN_WORD_LENGTH: usize = 13;
pub const DEFAULT_SAMPLE_COUNT: usize = 3;
pub const DEFAULT_SAMPLE_PERCENT: usize = 3;

/// Parameters of a processing run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Characters per segment
    #[serde(deserialize_with = "deserialize_count")]
    pub segment_size: usize,

    /// Words shorter than this are dropped after splitting
    pub min_word_length: usize,

    pub sampling: SamplingConfig,

    /// Random subsequence deletion, disabled when absent
    pub deletion: Option<DeletionConfig>,

    /// Seed of the random source used by the deletion stage
    pub seed: Option<u64>,

    pub span_mode: SpanMode,
    pub orientation_style: OrientationStyle,

    /// Replacement table of the word splitter, in application order
    pub split_pairs: Option<Vec<(String, String)>>,
}
impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segment_size: DEFAULT_SEGMENT_SIZE,
            min_word_length: DEFAULT_MIN_WORD_LENGTH,
            sampling: SamplingConfig::default(),
            deletion: None,
            seed: None,
            span_mode: SpanMode::default(),
            orientation_style: OrientationStyle::default(),
            split_pairs: None,
        }
    }
}

/// How many samples are taken per segment, and how large they are
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SamplingConfig {
    #[serde(deserialize_with = "deserialize_count")]
    pub count: usize,
    pub size: SampleSize,
    pub unit: SampleUnit,

    /// Explicit margin between character samples; spread evenly when absent
    pub margin: Option<usize>,
}
impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            count: DEFAULT_SAMPLE_COUNT,
            size: SampleSize::Percent(DEFAULT_SAMPLE_PERCENT),
            unit: SampleUnit::default(),
            margin: None,
        }
    }
}

/// Parameters of the deletion stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeletionConfig {
    /// Number of random subsequences to remove
    pub count: usize,
    /// Length of each subsequence
    pub length: usize,
}

/// Size of a sample, either absolute or relative to the segment
///
/// Written as `"250"`, `"2K"` or `"3%"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "String")]
pub enum SampleSize {
    Absolute(usize),
    Percent(usize),
}
impl SampleSize {
    /// Characters per sample for segments of `segment_size`
    pub fn resolve(self, segment_size: usize) -> Result<usize> {
        match self {
            Self::Absolute(size) => Ok(size),
            Self::Percent(percent) => {
                check_percent(percent)?;
                Ok((segment_size as u128 * percent as u128 / 100) as usize)
            }
        }
    }
}
impl FromStr for SampleSize {
    type Err = crate::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(percent) = s.strip_suffix('%') {
            let percent = percent
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPercent(s.to_string()))?;
            return Ok(Self::Percent(percent));
        }
        parse_count(s).map(Self::Absolute)
    }
}
impl fmt::Display for SampleSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(size) => write!(f, "{size}"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}
impl From<SampleSize> for String {
    fn from(size: SampleSize) -> Self {
        size.to_string()
    }
}
impl<'de> Deserialize<'de> for SampleSize {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match CountRepr::deserialize(deserializer)? {
            CountRepr::Number(size) => Ok(Self::Absolute(size)),
            CountRepr::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// What a sample is measured in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleUnit {
    #[default]
    Chars,
    Words,
}
impl FromStr for SampleUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "chars" | "characters" => Ok(Self::Chars),
            "words" => Ok(Self::Words),
            _ => Err(ConfigError::UnknownOption {
                option: "sample unit",
                value: s.to_string(),
            }),
        }
    }
}
impl fmt::Display for SampleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chars => write!(f, "chars"),
            Self::Words => write!(f, "words"),
        }
    }
}

/// Integer or shorthand string (`"1M"`, `"3%"`) as written in a config file
#[derive(Deserialize)]
#[serde(untagged)]
enum CountRepr {
    Number(usize),
    Text(String),
}

fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<usize, D::Error>
where
    D: Deserializer<'de>,
{
    match CountRepr::deserialize(deserializer)? {
        CountRepr::Number(n) => Ok(n),
        CountRepr::Text(text) => parse_count(&text).map_err(serde::de::Error::custom),
    }
}

fn check_percent(percent: usize) -> Result<()> {
    if percent == 0 || percent > 100 {
        return Err(
            ConfigError::InvalidPercent(format!("{percent}% is outside 1..=100")).into(),
        );
    }
    Ok(())
}

impl PipelineConfig {
    /// Loads a configuration from a TOML file
    ///
    /// Fields missing from the file keep their default values.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config = toml::from_str(content).map_err(ConfigError::Parse)?;
        Ok(config)
    }

    /// Renders the configuration as TOML
    pub fn to_toml_string(&self) -> Result<String> {
        let content = toml::to_string_pretty(self).map_err(anyhow::Error::from)?;
        Ok(content)
    }

    /// Word splitter built from `split_pairs`, or from the default table
    #[must_use]
    pub fn splitter(&self) -> WordSplitter {
        match &self.split_pairs {
            Some(pairs) => WordSplitter::new(pairs.iter().map(|(m, r)| (m.as_str(), r.as_str()))),
            None => WordSplitter::new(DEFAULT_SPLIT_PAIRS),
        }
    }

    /// Checks every parameter and resolves the sampling layout
    pub fn validate(&self) -> Result<ValidatedConfig> {
        if self.segment_size == 0 {
            return Err(ConfigError::ZeroSegmentSize.into());
        }
        let sampling = match self.sampling.unit {
            SampleUnit::Chars => {
                let sample_size = self.sampling.size.resolve(self.segment_size)?;
                let layout = match self.sampling.margin {
                    Some(margin) => SampleLayout::new(sample_size, margin, self.sampling.count),
                    None => SampleLayout::for_segment(
                        self.segment_size,
                        sample_size,
                        self.sampling.count,
                    )?,
                };
                SamplingPlan::Chars(Sampler::new(layout, self.segment_size)?)
            }
            SampleUnit::Words => {
                let SampleSize::Percent(percent) = self.sampling.size else {
                    return Err(ConfigError::UnsupportedSampleUnit { unit: "words" }.into());
                };
                if self.sampling.margin.is_some() {
                    warn!("Sampling by words ignores the configured margin");
                }
                SamplingPlan::Words(WordSampler::new(percent, self.sampling.count)?)
            }
        };
        Ok(ValidatedConfig {
            segment_size: self.segment_size,
            min_word_length: self.min_word_length,
            sampling,
            deletion: self.deletion.filter(|deletion| deletion.count > 0),
            seed: self.seed,
            span_mode: self.span_mode,
            orientation_style: self.orientation_style,
            splitter: self.splitter(),
        })
    }
}

/// Sampling strategy resolved from a [`SamplingConfig`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamplingPlan {
    Chars(Sampler),
    Words(WordSampler),
}
impl SegmentSampler for SamplingPlan {
    fn fill(&self, segment: &Segment, samples: &mut Vec<Sample>) {
        match self {
            Self::Chars(sampler) => sampler.fill(segment, samples),
            Self::Words(sampler) => sampler.fill(segment, samples),
        }
    }

    fn samples_per_segment(&self) -> usize {
        match self {
            Self::Chars(sampler) => sampler.samples_per_segment(),
            Self::Words(sampler) => sampler.samples_per_segment(),
        }
    }
}

/// A configuration that passed [`PipelineConfig::validate`]
#[derive(Debug, Clone)]
pub struct ValidatedConfig {
    pub segment_size: usize,
    pub min_word_length: usize,
    pub sampling: SamplingPlan,
    pub deletion: Option<DeletionConfig>,
    pub seed: Option<u64>,
    pub span_mode: SpanMode,
    pub orientation_style: OrientationStyle,
    pub splitter: WordSplitter,
}
impl ValidatedConfig {
    /// Random source of the run, seeded when a seed is configured
    #[must_use]
    pub fn rng(&self) -> SmallRng {
        match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        }
    }

    /// Deletion, word splitting and word filtering, in that order
    pub fn transform_chain<R: Rng>(&self, rng: &mut R) -> TransformChain {
        let deleter = match self.deletion {
            Some(DeletionConfig { count, length }) => Deleter::new(count, length, rng),
            None => Deleter::default(),
        };
        TransformChain::standard(
            deleter,
            self.splitter.clone(),
            WordFilter::new(self.min_word_length),
        )
    }
}
