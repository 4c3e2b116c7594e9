//! Line-level access to a raw sequence source.
//!
//! A [`SourceStream`] reads a FASTA-like text source line by line and yields only
//! the lines accepted by its [`LineFilter`], together with the byte range each one
//! occupies in the raw source. Every line advances the raw offset by its on-disk
//! length (terminator included), whether it is accepted or not.

use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Result, SourceError},
    SourceSpan,
};

/// Marker of header and comment lines in FASTA-like sources
pub const DEFAULT_HEADER_PREFIX: &[u8] = b">";

/// Capacity of the read buffer placed in front of a (decompressed) source
pub const DEFAULT_BUFFER_CAPACITY: usize = 1024 * 1024;

/// File extensions routed through the decompression layer
const COMPRESSED_EXTENSIONS: [&str; 5] = ["gz", "bgz", "bz2", "xz", "zst"];

/// Decides which raw lines of a source carry sequence data
///
/// The line is passed untrimmed, including its terminator.
pub trait LineFilter {
    fn accept(&self, line: &[u8]) -> bool;
}
impl<F: Fn(&[u8]) -> bool> LineFilter for F {
    fn accept(&self, line: &[u8]) -> bool {
        self(line)
    }
}

/// Rejects blank lines and lines starting with a fixed prefix
///
/// An empty prefix marks no header lines, so only blank lines are rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExcludePrefix {
    prefix: Vec<u8>,
}
impl ExcludePrefix {
    pub fn new(prefix: impl Into<Vec<u8>>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}
impl Default for ExcludePrefix {
    fn default() -> Self {
        Self::new(DEFAULT_HEADER_PREFIX)
    }
}
impl LineFilter for ExcludePrefix {
    fn accept(&self, line: &[u8]) -> bool {
        if line.trim_ascii().is_empty() {
            return false;
        }
        self.prefix.is_empty() || !line.starts_with(&self.prefix)
    }
}

/// Where the source span of an accepted line starts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanMode {
    /// Span starts at the raw line start and is as long as the trimmed text.
    ///
    /// Leading whitespace therefore shifts the reported span to the left of the
    /// bytes it describes.
    #[default]
    LineStart,

    /// Span covers exactly the trimmed bytes of the line
    Trimmed,
}

/// An accepted line and its position in the raw source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub span: SourceSpan,
    /// Line content with surrounding whitespace and terminator removed
    pub text: Vec<u8>,
}

/// Source stream over a file on disk, decompressed when needed
pub type FileSourceStream = SourceStream<BufReader<Box<dyn Read>>>;

/// Lazy, forward-only stream of accepted lines
///
/// The stream is finite and fused: after the end of the input or the first read
/// error it only returns `None`. Restarting means opening a new stream.
pub struct SourceStream<R: BufRead, F: LineFilter = ExcludePrefix> {
    inner: R,

    /// Label used in error reports
    path: PathBuf,

    filter: F,
    mode: SpanMode,

    /// Raw offset of the next unread line
    offset: u64,

    /// Reusable line buffer
    lbuf: Vec<u8>,

    n_accepted: usize,
    n_skipped: usize,
    finished: bool,
}

impl FileSourceStream {
    /// Opens a source with the default filter (no blank lines, no `>` headers)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_filter(path, ExcludePrefix::default())
    }
}

impl<F: LineFilter> SourceStream<BufReader<Box<dyn Read>>, F> {
    /// Opens a source with a custom line filter
    ///
    /// Sources whose extension names a compression format (`gz`, `bgz`, `bz2`,
    /// `xz`, `zst`) are decompressed transparently, anything else is read as
    /// plain text.
    pub fn open_with_filter<P: AsRef<Path>>(path: P, filter: F) -> Result<Self> {
        let path = path.as_ref();
        let unavailable = |source| SourceError::Unavailable {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(unavailable)?;
        if file.metadata().map_err(unavailable)?.is_dir() {
            return Err(unavailable(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "source is a directory",
            ))
            .into());
        }

        let handle: Box<dyn Read> = if is_compressed_path(path) {
            let (handle, format) =
                niffler::get_reader(Box::new(file)).map_err(|source| {
                    SourceError::Decompression {
                        path: path.to_path_buf(),
                        source,
                    }
                })?;
            debug!("Reading {} as {format:?}", path.display());
            handle
        } else {
            debug!("Reading {} as plain text", path.display());
            Box::new(file)
        };

        let reader = BufReader::with_capacity(DEFAULT_BUFFER_CAPACITY, handle);
        Ok(SourceStream::with_filter(reader, filter).label(path))
    }
}

impl<R: BufRead> SourceStream<R> {
    /// Wraps an already opened reader with the default filter
    pub fn new(inner: R) -> Self {
        Self::with_filter(inner, ExcludePrefix::default())
    }
}

impl<R: BufRead, F: LineFilter> SourceStream<R, F> {
    pub fn with_filter(inner: R, filter: F) -> Self {
        Self {
            inner,
            path: PathBuf::from("-"),
            filter,
            mode: SpanMode::default(),
            offset: 0,
            lbuf: Vec::new(),
            n_accepted: 0,
            n_skipped: 0,
            finished: false,
        }
    }

    /// Sets how source spans of accepted lines are reported
    #[must_use]
    pub fn span_mode(mut self, mode: SpanMode) -> Self {
        self.mode = mode;
        self
    }

    /// Sets the name used for this source in error reports
    #[must_use]
    pub fn label<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.path = path.into();
        self
    }

    /// Name of this source in error reports
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Raw offset reached so far (bytes consumed from the source)
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn n_accepted(&self) -> usize {
        self.n_accepted
    }

    pub fn n_skipped(&self) -> usize {
        self.n_skipped
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn next_line(&mut self) -> Option<Result<SourceLine>> {
        if self.finished {
            return None;
        }
        loop {
            self.lbuf.clear();
            let line_start = self.offset;
            match self.inner.read_until(b'\n', &mut self.lbuf) {
                // end of the stream
                Ok(0) => {
                    self.finished = true;
                    return None;
                }
                Ok(n) => self.offset += n as u64,
                Err(source) => {
                    self.finished = true;
                    return Some(Err(SourceError::Read {
                        path: self.path.clone(),
                        offset: line_start,
                        source,
                    }
                    .into()));
                }
            }

            if !self.filter.accept(&self.lbuf) {
                self.n_skipped += 1;
                continue;
            }
            self.n_accepted += 1;

            let text = self.lbuf.trim_ascii();
            let start = match self.mode {
                SpanMode::LineStart => line_start,
                SpanMode::Trimmed => {
                    let leading = self.lbuf.len() - self.lbuf.trim_ascii_start().len();
                    line_start + leading as u64
                }
            };
            return Some(Ok(SourceLine {
                span: SourceSpan::new(start, start + text.len() as u64),
                text: text.to_vec(),
            }));
        }
    }
}

impl<R: BufRead, F: LineFilter> Iterator for SourceStream<R, F> {
    type Item = Result<SourceLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_line()
    }
}

fn is_compressed_path(path: &Path) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| COMPRESSED_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}
