//! End-to-end processing of one (species, chromosome, source) triple.
//!
//! [`Pipeline`] wires the stages together:
//!
//! ```text
//! SourceStream -> Segmenter -> Deleter -> WordSplitter -> WordFilter -> Sampler
//! ```
//!
//! Processed segments and their samples are written as they are produced, so
//! at most one segment is held in memory at a time.

use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{info, warn};
use rand::Rng;

use crate::{
    config::ValidatedConfig,
    error::Result,
    sample::SegmentSampler,
    source::{FileSourceStream, LineFilter, SourceStream},
    transform::{SegmentStreamExt, Transform, TransformChain},
    writer::RecordWriter,
    Segmenter,
};

/// Counters collected over a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub lines_accepted: usize,
    pub lines_skipped: usize,
    /// Raw bytes consumed from the source
    pub bytes_read: u64,
    /// Length of the filtered sequence
    pub filtered_length: u64,
    pub segments: usize,
    pub samples: usize,
}
impl ProcessingStats {
    fn record_source<R: BufRead, F: LineFilter>(&mut self, source: &SourceStream<R, F>) {
        self.lines_accepted = source.n_accepted();
        self.lines_skipped = source.n_skipped();
        self.bytes_read = source.offset();
        if self.lines_accepted == 0 {
            warn!("No sequence lines found in {}", source.path().display());
        }
    }
}
impl fmt::Display for ProcessingStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} segments and {} samples from {} lines ({} skipped, {} bytes read, {} filtered characters)",
            self.segments,
            self.samples,
            self.lines_accepted,
            self.lines_skipped,
            self.bytes_read,
            self.filtered_length
        )
    }
}

/// Locations of the processed-segment and sample files of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub processed: PathBuf,
    pub samples: PathBuf,
}
impl OutputPaths {
    /// `<target>/processed/<stem>.processed` and `<target>/samples/<stem>.samples`
    ///
    /// The stem is `<species>.<chromosome>.<segment_size>.<min_word_length>`.
    pub fn new<P: AsRef<Path>>(
        target: P,
        species: &str,
        chromosome: &str,
        segment_size: usize,
        min_word_length: usize,
    ) -> Self {
        let target = target.as_ref();
        let stem = format!("{species}.{chromosome}.{segment_size}.{min_word_length}");
        Self {
            processed: target.join("processed").join(format!("{stem}.processed")),
            samples: target.join("samples").join(format!("{stem}.samples")),
        }
    }

    /// Creates the parent directories of both files
    pub fn create_dirs(&self) -> Result<()> {
        for path in [&self.processed, &self.samples] {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// A validated configuration with its transform stages built
pub struct Pipeline {
    config: ValidatedConfig,
    chain: TransformChain,
}
impl Pipeline {
    /// Builds the stages with the random source of the configuration
    #[must_use]
    pub fn new(config: ValidatedConfig) -> Self {
        let mut rng = config.rng();
        Self::with_rng(config, &mut rng)
    }

    /// Builds the stages with an explicit random source
    pub fn with_rng<R: Rng>(config: ValidatedConfig, rng: &mut R) -> Self {
        let chain = config.transform_chain(rng);
        Self { config, chain }
    }

    #[must_use]
    pub fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Streams `source` through every stage, writing segments and samples
    pub fn run<R, F, S, T>(
        &self,
        source: SourceStream<R, F>,
        segments_out: &mut RecordWriter<S>,
        samples_out: &mut RecordWriter<T>,
    ) -> Result<ProcessingStats>
    where
        R: BufRead,
        F: LineFilter,
        S: Write,
        T: Write,
    {
        let source = source.span_mode(self.config.span_mode);
        let mut segments =
            Segmenter::new(source, self.config.segment_size)?.transformed(&self.chain);

        let mut stats = ProcessingStats::default();
        let mut samples = Vec::with_capacity(self.config.sampling.samples_per_segment());
        for segment in segments.by_ref() {
            let segment = segment?;
            segments_out.write_segment(&segment)?;

            self.config.sampling.fill(&segment, &mut samples);
            for sample in &samples {
                samples_out.write_sample(sample)?;
            }

            stats.filtered_length += segment.filtered.len();
            stats.segments += 1;
            stats.samples += samples.len();
        }
        segments_out.flush()?;
        samples_out.flush()?;

        stats.record_source(&segments.into_inner().into_inner());
        Ok(stats)
    }

    /// Processes one source file into the processed and sample files under `target`
    ///
    /// The source is opened before any output is created.
    pub fn run_file<P, Q>(
        &self,
        input: P,
        species: &str,
        chromosome: &str,
        target: Q,
    ) -> Result<(OutputPaths, ProcessingStats)>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let input = input.as_ref();
        let source = FileSourceStream::open(input)?;

        let paths = OutputPaths::new(
            target,
            species,
            chromosome,
            self.config.segment_size,
            self.config.min_word_length,
        );
        paths.create_dirs()?;

        info!(
            "Processing {} ({species} {chromosome}) in segments of {}",
            input.display(),
            self.config.segment_size
        );
        let style = self.config.orientation_style;
        let mut segments_out =
            RecordWriter::new(File::create(&paths.processed)?, species, chromosome)
                .orientation_style(style);
        let mut samples_out =
            RecordWriter::new(File::create(&paths.samples)?, species, chromosome)
                .orientation_style(style);

        let stats = self.run(source, &mut segments_out, &mut samples_out)?;
        info!("Wrote {}: {stats}", paths.processed.display());
        Ok((paths, stats))
    }
}

/// Writes every segment of `source` after `stage`, without sampling
pub fn write_segments<R, F, T, W>(
    source: SourceStream<R, F>,
    segment_size: usize,
    stage: T,
    out: &mut RecordWriter<W>,
) -> Result<ProcessingStats>
where
    R: BufRead,
    F: LineFilter,
    T: Transform,
    W: Write,
{
    let mut segments = Segmenter::new(source, segment_size)?.transformed(stage);
    let mut stats = ProcessingStats::default();
    for segment in segments.by_ref() {
        let segment = segment?;
        out.write_segment(&segment)?;
        stats.filtered_length += segment.filtered.len();
        stats.segments += 1;
    }
    out.flush()?;
    stats.record_source(&segments.into_inner().into_inner());
    Ok(stats)
}

/// Rewrites the filtered sequence of `source` as lines of `line_length` characters
///
/// Only the last line may be shorter. An empty source produces a single empty line.
pub fn reflow<R, F, W>(
    source: SourceStream<R, F>,
    line_length: usize,
    out: W,
) -> Result<ProcessingStats>
where
    R: BufRead,
    F: LineFilter,
    W: Write,
{
    let mut out = BufWriter::new(out);
    let mut segments = Segmenter::new(source, line_length)?;
    let mut stats = ProcessingStats::default();
    for segment in segments.by_ref() {
        let segment = segment?;
        out.write_all(&segment.data)?;
        out.write_all(b"\n")?;
        stats.filtered_length += segment.filtered.len();
        stats.segments += 1;
    }
    out.flush()?;
    stats.record_source(&segments.into_inner());
    Ok(stats)
}

#[cfg(test)]
mod testing {

    use std::io::{Cursor, Write};

    use flate2::{write::GzEncoder, Compression};

    use super::*;
    use crate::{
        config::{PipelineConfig, SampleSize},
        error::{Error, SourceError},
        source::ExcludePrefix,
        transform::{WordFilter, WordSplitter},
        writer::OrientationStyle,
    };

    /// One header line and nine data lines of 20 characters
    fn ten_line_fasta() -> Vec<u8> {
        let mut input = b">chr21 test sequence\n".to_vec();
        for i in 0..9 {
            let base = [b'A', b'C', b'G', b'T'][i % 4];
            input.extend_from_slice(&[base; 20]);
            input.push(b'\n');
        }
        input
    }

    fn small_config() -> Result<ValidatedConfig> {
        let mut config = PipelineConfig {
            segment_size: 50,
            min_word_length: 1,
            seed: Some(42),
            ..Default::default()
        };
        config.sampling.count = 2;
        config.sampling.size = SampleSize::Absolute(5);
        config.validate()
    }

    /// Fields 3 to 6 of every line: source and filtered spans
    fn spans(text: &str) -> Vec<[u64; 4]> {
        text.lines()
            .map(|line| {
                let fields: Vec<u64> = line
                    .split(' ')
                    .skip(2)
                    .take(4)
                    .map(|field| field.parse().unwrap())
                    .collect();
                [fields[0], fields[1], fields[2], fields[3]]
            })
            .collect()
    }

    #[test]
    fn test_ten_line_fasta_end_to_end() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("chr21.fa");
        fs::write(&input, ten_line_fasta())?;

        let pipeline = Pipeline::new(small_config()?);
        let (paths, stats) = pipeline.run_file(&input, "human", "chr21", dir.path())?;

        assert_eq!(
            paths.processed,
            dir.path().join("processed/human.chr21.50.1.processed")
        );
        assert_eq!(paths.samples, dir.path().join("samples/human.chr21.50.1.samples"));
        assert_eq!(stats.segments, 4);
        assert_eq!(stats.samples, 16);
        assert_eq!(stats.lines_accepted, 9);
        assert_eq!(stats.lines_skipped, 1);
        assert_eq!(stats.filtered_length, 180);
        assert_eq!(stats.bytes_read, 21 * 10);

        let processed = fs::read_to_string(&paths.processed)?;
        assert_eq!(
            spans(&processed),
            vec![
                [21, 73, 0, 50],
                [73, 126, 50, 100],
                [126, 178, 100, 150],
                [178, 209, 150, 180]
            ]
        );
        let first = processed.lines().next().unwrap();
        let expected = format!(
            "human chr21 21 73 0 50 {}{} {}",
            "A".repeat(20),
            "C".repeat(20),
            "G".repeat(10)
        );
        assert_eq!(first, expected);

        // margin (50 - 2 * 5) / 3 = 13, offsets 13 and 31
        let samples = fs::read_to_string(&paths.samples)?;
        let lines: Vec<_> = samples.lines().collect();
        assert_eq!(lines.len(), 16);
        assert_eq!(lines[0], "human chr21 21 73 0 50 True AAAAA");
        assert_eq!(lines[1], "human chr21 21 73 0 50 False TTTTT");
        assert_eq!(lines[2], "human chr21 21 73 0 50 True CCCCC");
        assert_eq!(lines[3], "human chr21 21 73 0 50 False GGGGG");
        Ok(())
    }

    #[test]
    fn test_gzip_source_matches_plain() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let plain = dir.path().join("plain.fa");
        let gzipped = dir.path().join("gzipped.fa.gz");
        fs::write(&plain, ten_line_fasta())?;
        let mut encoder = GzEncoder::new(File::create(&gzipped)?, Compression::default());
        encoder.write_all(&ten_line_fasta())?;
        encoder.finish()?;

        let pipeline = Pipeline::new(small_config()?);
        let (plain_paths, _) = pipeline.run_file(&plain, "s", "plain", dir.path())?;
        let (gz_paths, _) = pipeline.run_file(&gzipped, "s", "plain", dir.path().join("gz"))?;
        assert_eq!(fs::read(plain_paths.processed)?, fs::read(gz_paths.processed)?);
        assert_eq!(fs::read(plain_paths.samples)?, fs::read(gz_paths.samples)?);
        Ok(())
    }

    #[test]
    fn test_missing_source_creates_no_output() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let target = dir.path().join("out");
        let pipeline = Pipeline::new(small_config()?);
        let result = pipeline.run_file(dir.path().join("missing.fa"), "s", "c", &target);
        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::Unavailable { .. }))
        ));
        assert!(!target.exists());
        Ok(())
    }

    #[test]
    fn test_directory_source_creates_no_output() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let input = dir.path().join("chr1.fa");
        fs::create_dir(&input)?;
        let target = dir.path().join("out");

        let pipeline = Pipeline::new(small_config()?);
        let result = pipeline.run_file(&input, "s", "c", &target);
        assert!(matches!(
            result,
            Err(Error::SourceError(SourceError::Unavailable { .. }))
        ));
        assert!(!target.exists());
        Ok(())
    }

    #[test]
    fn test_empty_source_writes_terminal_segment() -> Result<()> {
        let pipeline = Pipeline::new(small_config()?);
        let mut segments = RecordWriter::new(Vec::new(), "s", "c");
        let mut samples = RecordWriter::new(Vec::new(), "s", "c");
        let stats = pipeline.run(
            SourceStream::new(Cursor::new(b">only a header\n".to_vec())),
            &mut segments,
            &mut samples,
        )?;
        assert_eq!(stats.segments, 1);
        assert_eq!(stats.samples, 4);
        // no accepted line, so both spans are empty
        assert_eq!(segments.into_inner()?, b"s c 0 0 0 0 \n");
        Ok(())
    }

    #[test]
    fn test_named_orientation_and_trimmed_spans() -> Result<()> {
        let mut config = PipelineConfig {
            segment_size: 8,
            min_word_length: 1,
            span_mode: crate::SpanMode::Trimmed,
            orientation_style: OrientationStyle::Named,
            ..Default::default()
        };
        config.sampling.count = 1;
        config.sampling.size = SampleSize::Absolute(2);
        let pipeline = Pipeline::new(config.validate()?);

        let mut segments = RecordWriter::new(Vec::new(), "s", "c");
        let mut samples = RecordWriter::new(Vec::new(), "s", "c")
            .orientation_style(OrientationStyle::Named);
        pipeline.run(
            SourceStream::new(Cursor::new(b"  AAAAAAAA\n".to_vec())),
            &mut segments,
            &mut samples,
        )?;
        assert_eq!(segments.into_inner()?, b"s c 2 10 0 8 AAAAAAAA\n");

        // margin (8 - 2) / 2 = 3
        let samples = String::from_utf8(samples.into_inner()?).unwrap();
        assert_eq!(samples, "s c 2 10 0 8 same AA\ns c 2 10 0 8 inversed TT\n");
        Ok(())
    }

    #[test]
    fn test_write_segments_without_deletion() -> Result<()> {
        let stage = crate::transform::TransformChain::new()
            .then(WordSplitter::default())
            .then(WordFilter::new(3));
        let mut out = RecordWriter::new(Vec::new(), "s", "c");
        let stats = write_segments(
            SourceStream::new(Cursor::new(b">h\nggcaattgc\nnnatg\n".to_vec())),
            100,
            stage,
            &mut out,
        )?;
        assert_eq!(stats.segments, 1);
        assert_eq!(stats.lines_accepted, 2);
        assert_eq!(out.into_inner()?, b"s c 3 18 0 14 CAA TTG\n");
        Ok(())
    }

    #[test]
    fn test_reflow() -> Result<()> {
        let input = b">h\nACGTA\n\nCGT\n>h2\nAAAAAAA\n".to_vec();
        let mut out = Vec::new();
        let stats = reflow(SourceStream::new(Cursor::new(input)), 4, &mut out)?;
        assert_eq!(out, b"ACGT\nACGT\nAAAA\nAAA\n");
        assert_eq!(stats.segments, 4);
        assert_eq!(stats.lines_skipped, 3);
        Ok(())
    }

    #[test]
    fn test_reflow_exact_multiple_and_custom_header() -> Result<()> {
        let input = b"#comment\nACGT\nACGT\n".to_vec();
        let source = SourceStream::with_filter(Cursor::new(input), ExcludePrefix::new("#"));
        let mut out = Vec::new();
        reflow(source, 4, &mut out)?;
        assert_eq!(out, b"ACGT\nACGT\n");

        let mut out = Vec::new();
        reflow(SourceStream::new(Cursor::new(Vec::new())), 4, &mut out)?;
        assert_eq!(out, b"\n");
        Ok(())
    }
}
