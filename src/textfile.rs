//! Line-Oriented Text File Access
//!
//! Text-file counterparts of the binary file types, which do the heavy
//! lifting underneath:
//! - [`TextFile`]: the whole file in memory via [`BinaryFile`], split
//!   into lines eagerly. Invalid UTF-8 is an error.
//! - [`BigTextFile`]: very large files via [`BlockCachedFile`], with a
//!   line-start index built once and a bounded line cache mirroring the
//!   block cache underneath it.
//!
//! The line ending is selectable: CR (13), LF (10) or CRLF (13 10).

use core::fmt;
use std::collections::{BTreeMap, VecDeque};
use std::os::unix::io::RawFd;
use std::path::Path;

use log::debug;

use crate::binfile::{BinFileError, BinaryFile, BlockCachedFile};

/// Result type for text file operations
pub type TextFileResult<T> = Result<T, TextFileError>;

/// Text file errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextFileError {
    /// The underlying binary file failed
    BinFile(BinFileError),
    /// A line is not valid UTF-8
    InvalidUtf8,
}

impl fmt::Display for TextFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextFileError::BinFile(e) => write!(f, "binary file error: {}", e),
            TextFileError::InvalidUtf8 => write!(f, "line is not valid UTF-8"),
        }
    }
}

impl std::error::Error for TextFileError {}

impl From<BinFileError> for TextFileError {
    fn from(err: BinFileError) -> Self {
        TextFileError::BinFile(err)
    }
}

/// Line ending convention of a text file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// CR (13)
    ClassicMac,
    /// LF (10)
    #[default]
    Unix,
    /// CRLF (13 10)
    Windows,
}

impl LineEnding {
    /// Width of the ending in bytes
    const fn width(self) -> u64 {
        match self {
            LineEnding::Windows => 2,
            _ => 1,
        }
    }

    /// Number of bytes of the ending starting at `data[idx]`, or zero
    /// when there is no ending there.
    fn match_len(self, data: &[u8], idx: usize) -> usize {
        match self {
            LineEnding::ClassicMac => (data[idx] == b'\r') as usize,
            LineEnding::Unix => (data[idx] == b'\n') as usize,
            LineEnding::Windows => {
                if data[idx] == b'\r' && data.get(idx + 1) == Some(&b'\n') {
                    2
                } else {
                    0
                }
            }
        }
    }
}

/// A text file held in memory as lines.
///
/// A trailing line ending does not produce an extra empty line; content
/// after the final ending still counts as a line.
#[derive(Debug, Clone)]
pub struct TextFile {
    lines: Vec<String>,
    ending: LineEnding,
}

impl TextFile {
    /// Load a text file from a path
    pub fn open<P: AsRef<Path>>(path: P, ending: LineEnding) -> TextFileResult<Self> {
        let bin = BinaryFile::open(path)?;
        Ok(Self {
            lines: split_lines(bin.as_slice(), ending)?,
            ending,
        })
    }

    /// Load a text file from a borrowed descriptor
    pub fn from_fd(fd: RawFd, ending: LineEnding) -> TextFileResult<Self> {
        let bin = BinaryFile::from_fd(fd)?;
        Ok(Self {
            lines: split_lines(bin.as_slice(), ending)?,
            ending,
        })
    }

    /// The line ending the file was split with
    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Line `idx` without its ending, or `None` out of range
    pub fn line(&self, idx: usize) -> Option<&str> {
        self.lines.get(idx).map(String::as_str)
    }

    /// The lines in order
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Consume into the line vector
    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

/// Split `data` into lines on `ending`. Strict UTF-8.
fn split_lines(data: &[u8], ending: LineEnding) -> TextFileResult<Vec<String>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    let mut idx = 0;
    while idx < data.len() {
        let matched = ending.match_len(data, idx);
        if matched > 0 {
            let line = String::from_utf8(std::mem::take(&mut current))
                .map_err(|_| TextFileError::InvalidUtf8)?;
            lines.push(line);
            idx += matched;
        } else {
            current.push(data[idx]);
            idx += 1;
        }
    }
    if !current.is_empty() {
        let line = String::from_utf8(current).map_err(|_| TextFileError::InvalidUtf8)?;
        lines.push(line);
    }
    Ok(lines)
}

/// Line-oriented access to a very large text file.
///
/// Line start offsets are indexed once at construction (or on
/// [`refresh`](Self::refresh)); line text is fetched through the block
/// cache on demand and kept in a bounded line cache with the oldest
/// line evicted first. Lines are decoded lossily, so a stray invalid
/// byte degrades to a replacement character instead of failing the
/// whole file.
pub struct BigTextFile {
    inner: BlockCachedFile,
    ending: LineEnding,
    /// Byte offset of the start of each line
    line_starts: Vec<u64>,
    /// True when the file ends with a line ending
    trailing_ending: bool,
    max_lines: usize,
    /// Cached line text keyed by line number
    cache: BTreeMap<u64, String>,
    /// Cache order, oldest line number in front
    history: VecDeque<u64>,
}

impl BigTextFile {
    /// Open a large text file for cached line access.
    ///
    /// `block_size` and `max_blocks` bound the block cache underneath;
    /// `max_lines` bounds the line cache (zero disables line caching).
    pub fn open<P: AsRef<Path>>(
        path: P,
        block_size: u16,
        max_blocks: usize,
        max_lines: usize,
        ending: LineEnding,
    ) -> TextFileResult<Self> {
        let inner = BlockCachedFile::open(path, block_size, max_blocks)?;
        Self::from_inner(inner, max_lines, ending)
    }

    /// Open from a borrowed descriptor; the descriptor is duplicated
    /// and stays open and owned by the caller.
    pub fn from_fd(
        fd: RawFd,
        block_size: u16,
        max_blocks: usize,
        max_lines: usize,
        ending: LineEnding,
    ) -> TextFileResult<Self> {
        let inner = BlockCachedFile::from_fd(fd, block_size, max_blocks)?;
        Self::from_inner(inner, max_lines, ending)
    }

    fn from_inner(
        mut inner: BlockCachedFile,
        max_lines: usize,
        ending: LineEnding,
    ) -> TextFileResult<Self> {
        let (line_starts, trailing_ending) = scan_line_starts(&mut inner, ending)?;
        Ok(Self {
            inner,
            ending,
            line_starts,
            trailing_ending,
            max_lines,
            cache: BTreeMap::new(),
            history: VecDeque::new(),
        })
    }

    /// The line ending the file is indexed with
    pub fn ending(&self) -> LineEnding {
        self.ending
    }

    /// Number of lines
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Drop every cached line. The line index is kept.
    pub fn purge(&mut self) {
        self.cache.clear();
        self.history.clear();
    }

    /// Purge the line cache and rebuild the line index from the file.
    pub fn refresh(&mut self) -> TextFileResult<()> {
        self.purge();
        let (line_starts, trailing_ending) = scan_line_starts(&mut self.inner, self.ending)?;
        self.line_starts = line_starts;
        self.trailing_ending = trailing_ending;
        Ok(())
    }

    /// Remember `line` in the bounded cache.
    fn remember(&mut self, line: u64, text: &str) {
        if self.max_lines == 0 {
            return;
        }
        if self.cache.len() == self.max_lines {
            if let Some(oldest) = self.history.pop_front() {
                self.cache.remove(&oldest);
                debug!("evicting line {}", oldest);
            }
        }
        self.history.push_back(line);
        self.cache.insert(line, text.to_string());
    }

    /// Fetch line `idx` from the block cache.
    fn fetch_line(&mut self, idx: usize) -> Option<String> {
        let start = self.line_starts[idx];
        let end = if idx + 1 < self.line_starts.len() {
            self.line_starts[idx + 1] - self.ending.width()
        } else if self.trailing_ending {
            self.inner.len() - self.ending.width()
        } else {
            self.inner.len()
        };
        // A read failure here means the file changed underneath us.
        let bytes = self.inner.range(start..end).ok()?;
        Some(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Line `idx` without its ending. `None` out of range or when the
    /// file changed underneath the index.
    pub fn line(&mut self, idx: usize) -> Option<String> {
        if idx >= self.line_starts.len() {
            return None;
        }
        if let Some(text) = self.cache.get(&(idx as u64)) {
            return Some(text.clone());
        }
        let text = self.fetch_line(idx)?;
        self.remember(idx as u64, &text);
        Some(text)
    }

    /// Lines `range.start..range.end`, stopping early if a line cannot
    /// be read. Out-of-range portions yield nothing.
    pub fn line_range(&mut self, range: std::ops::Range<usize>) -> Vec<String> {
        let mut lines = Vec::new();
        for idx in range {
            match self.line(idx) {
                Some(text) => lines.push(text),
                None => break,
            }
        }
        lines
    }

    /// Every line of the file, read directly; the line cache is not
    /// populated.
    pub fn all_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.line_count());
        for idx in 0..self.line_count() {
            if let Some(text) = self.cache.get(&(idx as u64)) {
                lines.push(text.clone());
                continue;
            }
            match self.fetch_line(idx) {
                Some(text) => lines.push(text),
                None => break,
            }
        }
        lines
    }
}

impl fmt::Debug for BigTextFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BigTextFile")
            .field("line_count", &self.line_starts.len())
            .field("ending", &self.ending)
            .field("cached", &self.cache.len())
            .field("max_lines", &self.max_lines)
            .finish()
    }
}

/// Index the byte offset of every line start. Returns the offsets and
/// whether the file ends with a line ending.
fn scan_line_starts(
    inner: &mut BlockCachedFile,
    ending: LineEnding,
) -> TextFileResult<(Vec<u64>, bool)> {
    let size = inner.len();
    let block_size = inner.block_size() as u64;
    let mut starts = Vec::new();
    if size == 0 {
        return Ok((starts, false));
    }
    starts.push(0);

    let mut trailing = false;
    let mut pos = 0u64;
    let mut current_block = u64::MAX;
    let mut block = Vec::new();
    while pos < size {
        let number = pos / block_size;
        if number != current_block {
            block = inner.copy_block(number)?;
            current_block = number;
        }
        let offset = (pos % block_size) as usize;

        let matched = match ending {
            LineEnding::ClassicMac => (block[offset] == b'\r') as u64,
            LineEnding::Unix => (block[offset] == b'\n') as u64,
            LineEnding::Windows => {
                if block[offset] != b'\r' || pos + 1 >= size {
                    0
                } else {
                    // The LF may sit in the next block.
                    let next = match block.get(offset + 1) {
                        Some(&b) => b,
                        None => inner.byte(pos + 1)?,
                    };
                    if next == b'\n' {
                        2
                    } else {
                        0
                    }
                }
            }
        };

        if matched > 0 {
            pos += matched;
            if pos < size {
                starts.push(pos);
            } else {
                trailing = true;
            }
        } else {
            pos += 1;
        }
    }
    Ok((starts, trailing))
}
