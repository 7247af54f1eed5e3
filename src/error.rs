//! Unified Error Type
//!
//! Every module reports failures through its own error enum; this
//! module wraps them all in [`UtilsError`] for callers that funnel the
//! whole crate through one error type.

use core::fmt;

use crate::binfile::BinFileError;
use crate::blob::BlobError;
use crate::dir::DirError;
use crate::fdpath::FdPathError;
use crate::pathstr::PathStringError;
use crate::textfile::TextFileError;

/// Result type using the crate-level error
pub type UtilsResult<T> = Result<T, UtilsError>;

/// Crate-level error wrapping every module error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilsError {
    /// Descriptor path resolution error
    FdPath(FdPathError),
    /// Blob read error
    Blob(BlobError),
    /// Binary file error
    BinFile(BinFileError),
    /// Text file error
    TextFile(TextFileError),
    /// Path string error
    PathString(PathStringError),
    /// Directory listing error
    Dir(DirError),
}

impl fmt::Display for UtilsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UtilsError::FdPath(e) => write!(f, "fd path error: {}", e),
            UtilsError::Blob(e) => write!(f, "blob error: {}", e),
            UtilsError::BinFile(e) => write!(f, "binary file error: {}", e),
            UtilsError::TextFile(e) => write!(f, "text file error: {}", e),
            UtilsError::PathString(e) => write!(f, "path string error: {}", e),
            UtilsError::Dir(e) => write!(f, "directory error: {}", e),
        }
    }
}

impl std::error::Error for UtilsError {}

impl From<FdPathError> for UtilsError {
    fn from(err: FdPathError) -> Self {
        UtilsError::FdPath(err)
    }
}

impl From<BlobError> for UtilsError {
    fn from(err: BlobError) -> Self {
        UtilsError::Blob(err)
    }
}

impl From<BinFileError> for UtilsError {
    fn from(err: BinFileError) -> Self {
        UtilsError::BinFile(err)
    }
}

impl From<TextFileError> for UtilsError {
    fn from(err: TextFileError) -> Self {
        UtilsError::TextFile(err)
    }
}

impl From<PathStringError> for UtilsError {
    fn from(err: PathStringError) -> Self {
        UtilsError::PathString(err)
    }
}

impl From<DirError> for UtilsError {
    fn from(err: DirError) -> Self {
        UtilsError::Dir(err)
    }
}
