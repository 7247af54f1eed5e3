//! Directory Contents
//!
//! Gathers the entry names of a directory and iterates them as bare
//! names or full paths. `.` and `..` are always excluded; hidden
//! entries and the file/directory split are controlled by a
//! [`DirFilter`] flag set.

use core::fmt;
use std::path::{Path, PathBuf};

use bitflags::bitflags;
use log::debug;

/// Result type for directory operations
pub type DirResult<T> = Result<T, DirError>;

/// Directory listing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirError {
    /// The path does not exist
    InvalidPath,
    /// The path exists but is not a directory
    NotADir,
    /// The directory exists but cannot be read
    CannotAccess,
}

impl DirError {
    /// Static description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            DirError::InvalidPath => "path does not exist",
            DirError::NotADir => "not a directory",
            DirError::CannotAccess => "cannot access directory",
        }
    }
}

impl fmt::Display for DirError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::error::Error for DirError {}

bitflags! {
    /// Entry selection flags for [`DirContents::gather`]
    pub struct DirFilter: u32 {
        /// Keep entries whose name starts with a dot
        const INCLUDE_HIDDEN = 1 << 0;
        /// Keep regular files
        const FILES = 1 << 1;
        /// Keep directories
        const DIRS = 1 << 2;
        /// Keep entries that are neither regular files nor directories
        /// (symlinks, sockets, devices)
        const OTHER = 1 << 3;
    }
}

impl Default for DirFilter {
    fn default() -> Self {
        DirFilter::all()
    }
}

/// The gathered contents of one directory.
#[derive(Debug, Clone)]
pub struct DirContents {
    path: PathBuf,
    names: Vec<String>,
    filter: DirFilter,
    /// When set, indexed access and iteration yield full paths instead
    /// of bare names
    pub yield_full_paths: bool,
}

impl DirContents {
    /// Create a lister for `path`. Nothing is read until
    /// [`gather`](Self::gather) is called.
    pub fn new<P: AsRef<Path>>(path: P) -> DirResult<Self> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(DirError::InvalidPath);
        }
        Ok(Self {
            path: path.to_path_buf(),
            names: Vec::new(),
            filter: DirFilter::default(),
            yield_full_paths: false,
        })
    }

    /// Restrict which entries [`gather`](Self::gather) keeps
    pub fn set_filter(&mut self, filter: DirFilter) {
        self.filter = filter;
    }

    /// The directory path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the directory, replacing any previously gathered names.
    pub fn gather(&mut self) -> DirResult<()> {
        let meta = std::fs::metadata(&self.path).map_err(|_| DirError::InvalidPath)?;
        if !meta.is_dir() {
            return Err(DirError::NotADir);
        }

        self.names.clear();
        let entries = std::fs::read_dir(&self.path).map_err(|_| DirError::CannotAccess)?;
        for entry in entries {
            let Ok(entry) = entry else {
                debug!("skipping unreadable entry in {:?}", self.path);
                continue;
            };
            let name = match entry.file_name().into_string() {
                Ok(name) => name,
                Err(raw) => raw.to_string_lossy().into_owned(),
            };

            if name.starts_with('.') && !self.filter.contains(DirFilter::INCLUDE_HIDDEN) {
                continue;
            }
            // An entry whose kind cannot be determined is dropped
            // rather than bypassing the filter.
            let Ok(kind) = entry.file_type() else {
                debug!("skipping entry {:?} with unreadable file type", name);
                continue;
            };
            let wanted = if kind.is_file() {
                self.filter.contains(DirFilter::FILES)
            } else if kind.is_dir() {
                self.filter.contains(DirFilter::DIRS)
            } else {
                self.filter.contains(DirFilter::OTHER)
            };
            if !wanted {
                continue;
            }
            self.names.push(name);
        }
        Ok(())
    }

    /// Sort the gathered names lexicographically
    pub fn sort(&mut self) {
        self.names.sort();
    }

    /// Number of gathered entries
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// True if nothing was gathered
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Entry at `idx` as a name or full path depending on
    /// `yield_full_paths`, or `None` out of range
    pub fn get(&self, idx: usize) -> Option<String> {
        let name = self.names.get(idx)?;
        if self.yield_full_paths {
            Some(self.path.join(name).to_string_lossy().into_owned())
        } else {
            Some(name.clone())
        }
    }

    /// The gathered names
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Iterate entries, respecting `yield_full_paths`
    pub fn iter(&self) -> impl Iterator<Item = String> + '_ {
        (0..self.names.len()).filter_map(move |i| self.get(i))
    }

    /// Visit entries with a callback; returning `true` stops the walk
    pub fn for_each<F: FnMut(&str) -> bool>(&self, mut block: F) {
        for entry in self.iter() {
            if block(&entry) {
                break;
            }
        }
    }
}
