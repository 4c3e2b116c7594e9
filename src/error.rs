use std::path::PathBuf;

/// Custom Result type for segsample operations, wrapping the custom [`Error`] type
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for the segsample library, encompassing all possible error cases
/// that can occur while streaming, segmenting, transforming and sampling a source.
#[derive(thiserror::Error, Debug)]
#[error(transparent)]
pub enum Error {
    /// Errors raised while opening or reading a sequence source
    SourceError(#[from] SourceError),
    /// Invalid pipeline parameters, detected before any streaming starts
    ConfigError(#[from] ConfigError),
    /// Standard I/O errors from the Rust standard library (output side)
    IoError(#[from] std::io::Error),
    /// Generic errors that can occur in any part of the system
    AnyhowError(#[from] anyhow::Error),
}

/// Errors that can occur while opening or reading a sequence source
///
/// All of these are fatal for the source being processed: the stream stops
/// yielding records after the first one is reported.
#[derive(thiserror::Error, Debug)]
pub enum SourceError {
    /// The source path could not be opened
    #[error("Unable to open sequence source {path:?}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The (possibly compressed) container could not be recognized or opened
    #[error("Unable to decompress sequence source {path:?}: {source}")]
    Decompression {
        path: PathBuf,
        #[source]
        source: niffler::Error,
    },

    /// A read failed part way through the source
    ///
    /// # Fields
    /// * `offset` - Raw byte offset of the line that could not be read
    #[error("Read failure in {path:?} at byte offset {offset}: {source}")]
    Read {
        path: PathBuf,
        offset: u64,
        #[source]
        source: std::io::Error,
    },
}

/// Errors for pipeline parameters that cannot produce well-formed records
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// Segments must hold at least one character
    #[error("Segment size must be greater than zero")]
    ZeroSegmentSize,

    /// Samples must hold at least one character (or word)
    #[error("Sample size must be greater than zero")]
    ZeroSampleSize,

    /// Samples and margins do not fit inside a segment
    ///
    /// # Fields
    /// * `segment_size` - The configured segment size
    /// * `required` - Characters needed by `number_samples` samples and their margins
    #[error(
        "{number_samples} samples of {sample_size} with margin {margin_size} need {required} characters, but segments hold {segment_size}"
    )]
    SampleLayoutOverflow {
        segment_size: usize,
        sample_size: usize,
        margin_size: usize,
        number_samples: usize,
        required: u128,
    },

    /// Sampling was requested without any sample per segment
    #[error("At least one sample per segment is required")]
    ZeroSampleCount,

    /// A percentage outside of `1..=100`, or percentages that add up past 100
    #[error("Invalid sample percentage: {0}")]
    InvalidPercent(String),

    /// A size string that is neither an integer nor an integer with a K/M/B suffix
    #[error("Invalid count: {0:?}")]
    InvalidCount(String),

    /// The requested sampling unit cannot be combined with the requested size
    #[error("Sampling by {unit} requires a percentage sample size")]
    UnsupportedSampleUnit { unit: &'static str },

    /// A named option value that is not recognized
    #[error("Unknown {option}: {value:?}")]
    UnknownOption { option: &'static str, value: String },

    /// The configuration file is not valid TOML or does not match the expected layout
    #[error("Invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),
}
