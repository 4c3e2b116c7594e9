//! Line-oriented output of segments and samples.
//!
//! Every record is written on its own line, prefixed by the species and
//! chromosome labels of the run:
//!
//! ```text
//! <species> <chromosome> <sourceStart> <sourceEnd> <filteredStart> <filteredEnd> <data>
//! <species> <chromosome> <sourceStart> <sourceEnd> <filteredStart> <filteredEnd> <orientation> <data>
//! ```
//!
//! The first form holds a processed segment, the second a sample. The textual
//! rendering of the orientation is chosen with [`OrientationStyle`].

use std::fmt;
use std::io::{BufWriter, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    error::{ConfigError, Result},
    sample::{Orientation, Sample},
    FilteredSpan, Segment, SourceSpan,
};

/// How sample orientations are spelled in output files
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrientationStyle {
    /// `True` for forward samples, `False` for reverse complements
    #[default]
    Boolean,
    /// `same` for forward samples, `inversed` for reverse complements
    Named,
}
impl OrientationStyle {
    #[must_use]
    pub fn render(self, orientation: Orientation) -> &'static [u8] {
        match (self, orientation) {
            (Self::Boolean, Orientation::Forward) => b"True",
            (Self::Boolean, Orientation::ReverseComplement) => b"False",
            (Self::Named, Orientation::Forward) => b"same",
            (Self::Named, Orientation::ReverseComplement) => b"inversed",
        }
    }
}
impl FromStr for OrientationStyle {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(Self::Boolean),
            "named" => Ok(Self::Named),
            _ => Err(ConfigError::UnknownOption {
                option: "orientation style",
                value: s.to_string(),
            }),
        }
    }
}
impl fmt::Display for OrientationStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => write!(f, "boolean"),
            Self::Named => write!(f, "named"),
        }
    }
}

/// Writes segment and sample records for one species and chromosome
pub struct RecordWriter<W: Write> {
    inner: BufWriter<W>,

    /// `<species> <chromosome> `
    prefix: Vec<u8>,

    style: OrientationStyle,

    /// Reusable buffer for rendering offsets
    translater: itoa::Buffer,

    records_written: usize,
}
impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, species: &str, chromosome: &str) -> Self {
        let mut prefix = Vec::with_capacity(species.len() + chromosome.len() + 2);
        prefix.extend_from_slice(species.as_bytes());
        prefix.push(b' ');
        prefix.extend_from_slice(chromosome.as_bytes());
        prefix.push(b' ');
        Self {
            inner: BufWriter::new(inner),
            prefix,
            style: OrientationStyle::default(),
            translater: itoa::Buffer::new(),
            records_written: 0,
        }
    }

    /// Sets how sample orientations are rendered
    #[must_use]
    pub fn orientation_style(mut self, style: OrientationStyle) -> Self {
        self.style = style;
        self
    }

    /// Writes a processed-segment line
    pub fn write_segment(&mut self, segment: &Segment) -> Result<()> {
        self.write_spans(segment.source, segment.filtered)?;
        self.inner.write_all(&segment.data)?;
        self.inner.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    /// Writes a sample line
    pub fn write_sample(&mut self, sample: &Sample) -> Result<()> {
        self.write_spans(sample.source, sample.filtered)?;
        self.inner.write_all(self.style.render(sample.orientation))?;
        self.inner.write_all(b" ")?;
        self.inner.write_all(&sample.data)?;
        self.inner.write_all(b"\n")?;
        self.records_written += 1;
        Ok(())
    }

    pub fn records_written(&self) -> usize {
        self.records_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }

    /// Consumes the writer and returns the inner writer after flushing
    pub fn into_inner(self) -> Result<W> {
        match self.inner.into_inner() {
            Ok(inner) => Ok(inner),
            Err(e) => Err(std::io::Error::from(e).into()),
        }
    }

    fn write_spans(&mut self, source: SourceSpan, filtered: FilteredSpan) -> Result<()> {
        self.inner.write_all(&self.prefix)?;
        for offset in [source.start, source.end, filtered.start, filtered.end] {
            self.inner
                .write_all(self.translater.format(offset).as_bytes())?;
            self.inner.write_all(b" ")?;
        }
        Ok(())
    }
}
