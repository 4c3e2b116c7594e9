use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};

use segsample::{
    config::{DeletionConfig, PipelineConfig, SampleSize, SampleUnit},
    utils::parse_count,
    writer::OrientationStyle,
    SpanMode,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Log debug messages (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Segment, transform and sample one chromosome into processed and sample files
    Process {
        /// Species label written on every record
        species: String,
        /// Chromosome label written on every record
        chromosome: String,
        /// Sequence source (plain or gz/bgz/bz2/xz/zst compressed)
        input: PathBuf,

        /// Folder receiving the processed/ and samples/ sub-folders
        #[arg(short, long)]
        target_folder: PathBuf,

        #[command(flatten)]
        params: ProcessParams,
    },

    /// Print transformed segments to stdout, without deletion or sampling
    Segments {
        species: String,
        chromosome: String,
        input: PathBuf,

        #[command(flatten)]
        params: SegmentParams,
    },

    /// Rewrite the sequence lines of a source with a fixed line length
    Reflow {
        input: PathBuf,

        /// Characters per output line (K/M/B suffixes accepted)
        #[arg(short, long, value_parser = parse_count)]
        line_length: usize,

        /// Output file [default: stdout]
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Lines starting with this prefix are skipped
        #[arg(long, default_value = ">")]
        header_prefix: String,
    },
}

/// Parameters shared by every segmenting command
#[derive(ClapArgs)]
pub struct SegmentParams {
    /// TOML configuration file, overridden by the flags below
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Characters per segment (K/M/B suffixes accepted)
    #[arg(short, long, value_parser = parse_count)]
    pub segment_size: Option<usize>,

    /// Words shorter than this are dropped
    #[arg(short, long)]
    pub min_word_length: Option<usize>,

    /// Report source spans over the trimmed line text only
    #[arg(long)]
    pub trimmed_spans: bool,
}
impl SegmentParams {
    /// Loads the configuration file (if any) and applies the flags on top
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_path(path)
                .with_context(|| format!("Unable to load configuration {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(segment_size) = self.segment_size {
            config.segment_size = segment_size;
        }
        if let Some(min_word_length) = self.min_word_length {
            config.min_word_length = min_word_length;
        }
        if self.trimmed_spans {
            config.span_mode = SpanMode::Trimmed;
        }
        Ok(config)
    }
}

#[derive(ClapArgs)]
pub struct ProcessParams {
    #[command(flatten)]
    pub segments: SegmentParams,

    /// Size of each sample: a count (250, 2K) or a percentage of the segment (3%)
    #[arg(long)]
    pub sample_size: Option<SampleSize>,

    /// Samples per segment, each also written as its reverse complement
    #[arg(short = 'n', long)]
    pub samples: Option<usize>,

    /// Measure samples in characters or in words [chars, words]
    #[arg(long)]
    pub sample_unit: Option<SampleUnit>,

    /// Characters between samples [default: spread evenly]
    #[arg(long)]
    pub margin: Option<usize>,

    /// Random subsequences to delete from every segment
    #[arg(long, requires = "deletion_length")]
    pub deletions: Option<usize>,

    /// Length of each deleted subsequence
    #[arg(long, requires = "deletions")]
    pub deletion_length: Option<usize>,

    /// Seed for the random deletions
    #[arg(long)]
    pub seed: Option<u64>,

    /// Spelling of sample orientations [boolean, named]
    #[arg(long)]
    pub orientation: Option<OrientationStyle>,
}
impl ProcessParams {
    pub fn resolve(&self) -> Result<PipelineConfig> {
        let mut config = self.segments.resolve()?;
        if let Some(size) = self.sample_size {
            config.sampling.size = size;
        }
        if let Some(count) = self.samples {
            config.sampling.count = count;
        }
        if let Some(unit) = self.sample_unit {
            config.sampling.unit = unit;
        }
        if let Some(margin) = self.margin {
            config.sampling.margin = Some(margin);
        }
        if let (Some(count), Some(length)) = (self.deletions, self.deletion_length) {
            config.deletion = Some(DeletionConfig { count, length });
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(style) = self.orientation {
            config.orientation_style = style;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod testing {

    use super::*;

    #[test]
    fn test_flags_override_defaults() -> Result<()> {
        let args = Args::try_parse_from([
            "segsample",
            "process",
            "human",
            "chr1",
            "chr1.fa.gz",
            "-t",
            "out",
            "--segment-size",
            "1K",
            "--sample-size",
            "5%",
            "--deletions",
            "2",
            "--deletion-length",
            "4",
            "--orientation",
            "named",
            "--trimmed-spans",
        ])?;
        let Commands::Process { params, .. } = args.command else {
            panic!("expected the process command");
        };
        let config = params.resolve()?;
        assert_eq!(config.segment_size, 1000);
        assert_eq!(config.sampling.size, SampleSize::Percent(5));
        assert_eq!(
            config.deletion,
            Some(DeletionConfig {
                count: 2,
                length: 4
            })
        );
        assert_eq!(config.orientation_style, OrientationStyle::Named);
        assert_eq!(config.span_mode, SpanMode::Trimmed);
        assert!(config.validate().is_ok());
        Ok(())
    }

    #[test]
    fn test_deletions_need_a_length() {
        let args = Args::try_parse_from([
            "segsample", "process", "s", "c", "in.fa", "-t", "out", "--deletions", "2",
        ]);
        assert!(args.is_err());
    }

    #[test]
    fn test_reflow_args() -> Result<()> {
        let args = Args::try_parse_from(["segsample", "reflow", "in.fa", "-l", "60", "-v"])?;
        assert!(args.verbose);
        let Commands::Reflow {
            line_length,
            header_prefix,
            output,
            ..
        } = args.command
        else {
            panic!("expected the reflow command");
        };
        assert_eq!(line_length, 60);
        assert_eq!(header_prefix, ">");
        assert!(output.is_none());
        Ok(())
    }
}
