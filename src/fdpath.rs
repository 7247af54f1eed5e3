//! File Descriptor Path Resolution
//!
//! Resolves the filesystem path an open descriptor was opened with, via
//! the platform's path-lookup facility: `fcntl(F_GETPATH)` on macOS and
//! a `readlink` of `/proc/self/fd/<fd>` on Linux. The result lands in a
//! caller-owned fixed-capacity [`PathBuffer`]; on failure the buffer is
//! left all-zero. The descriptor is never closed or otherwise altered.

use core::fmt;
use std::ffi::OsString;
use std::os::unix::ffi::OsStringExt;
use std::os::unix::io::RawFd;
use std::path::PathBuf;

use log::debug;

/// Capacity of a path buffer in bytes, including the NUL terminator
pub const PATH_BUF_CAP: usize = 1024;

/// Result type for descriptor path resolution
pub type FdPathResult<T> = Result<T, FdPathError>;

/// Descriptor path resolution errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FdPathError {
    /// The platform could not resolve the descriptor; carries the raw
    /// OS error code unmodified
    ResolutionFailed(i32),
    /// The descriptor is open but not backed by a filesystem path
    /// (pipe, socket, anonymous inode)
    NotAPath,
    /// The resolved path does not fit in [`PATH_BUF_CAP`] bytes
    PathTooLong,
}

impl fmt::Display for FdPathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FdPathError::ResolutionFailed(errno) => {
                write!(f, "path resolution failed (os error {})", errno)
            }
            FdPathError::NotAPath => write!(f, "descriptor is not backed by a filesystem path"),
            FdPathError::PathTooLong => {
                write!(f, "resolved path exceeds {} bytes", PATH_BUF_CAP)
            }
        }
    }
}

impl std::error::Error for FdPathError {}

/// Caller-owned buffer holding a NUL-terminated path.
///
/// Always exactly [`PATH_BUF_CAP`] bytes. Freshly constructed buffers
/// are zero-filled, and [`resolve_into`] re-clears the buffer before
/// every resolution attempt, so a failed call always leaves it
/// all-zero.
#[derive(Clone)]
pub struct PathBuffer {
    bytes: [u8; PATH_BUF_CAP],
}

impl PathBuffer {
    /// Create a zero-filled buffer
    pub const fn new() -> Self {
        Self {
            bytes: [0u8; PATH_BUF_CAP],
        }
    }

    /// The raw buffer contents
    pub fn as_bytes(&self) -> &[u8; PATH_BUF_CAP] {
        &self.bytes
    }

    /// Reset every byte to zero
    pub fn clear(&mut self) {
        self.bytes = [0u8; PATH_BUF_CAP];
    }

    /// True if every byte is zero
    pub fn is_cleared(&self) -> bool {
        self.bytes.iter().all(|&b| b == 0)
    }

    /// Length of the stored path, up to the first NUL
    pub fn path_len(&self) -> usize {
        self.bytes
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(PATH_BUF_CAP)
    }

    /// The stored path as an owned [`PathBuf`], or `None` if the buffer
    /// holds no path
    pub fn to_path_buf(&self) -> Option<PathBuf> {
        let len = self.path_len();
        if len == 0 {
            return None;
        }
        Some(PathBuf::from(OsString::from_vec(self.bytes[..len].to_vec())))
    }
}

impl Default for PathBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PathBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PathBuffer")
            .field("path_len", &self.path_len())
            .finish()
    }
}

fn last_errno() -> i32 {
    std::io::Error::last_os_error().raw_os_error().unwrap_or(0)
}

/// Resolve the path behind `fd` into `buf`.
///
/// The buffer is cleared to all zero bytes first, then filled by the
/// platform call. On any failure the buffer is left (or re-cleared to)
/// all-zero. Idempotent for a stable descriptor; concurrent calls must
/// use distinct buffers.
#[cfg(target_os = "macos")]
pub fn resolve_into(fd: RawFd, buf: &mut PathBuffer) -> FdPathResult<()> {
    buf.clear();

    let res = unsafe { libc::fcntl(fd, libc::F_GETPATH, buf.bytes.as_mut_ptr()) };
    if res < 0 {
        let errno = last_errno();
        debug!("fcntl(F_GETPATH) failed for fd {}: errno {}", fd, errno);
        buf.clear();
        if errno == libc::ENAMETOOLONG {
            return Err(FdPathError::PathTooLong);
        }
        return Err(FdPathError::ResolutionFailed(errno));
    }

    // F_GETPATH succeeds for some descriptors that have no on-disk
    // path; those never start with a slash.
    if buf.bytes[0] != b'/' {
        buf.clear();
        return Err(FdPathError::NotAPath);
    }

    Ok(())
}

/// Resolve the path behind `fd` into `buf`.
///
/// The buffer is cleared to all zero bytes first, then filled by the
/// platform call. On any failure the buffer is left (or re-cleared to)
/// all-zero. Idempotent for a stable descriptor; concurrent calls must
/// use distinct buffers.
#[cfg(not(target_os = "macos"))]
pub fn resolve_into(fd: RawFd, buf: &mut PathBuffer) -> FdPathResult<()> {
    use std::ffi::CString;

    buf.clear();

    let procfs_name = CString::new(format!("/proc/self/fd/{}", fd))
        .map_err(|_| FdPathError::ResolutionFailed(libc::EINVAL))?;

    let n = unsafe {
        libc::readlink(
            procfs_name.as_ptr(),
            buf.bytes.as_mut_ptr() as *mut libc::c_char,
            PATH_BUF_CAP,
        )
    };
    if n < 0 {
        let errno = last_errno();
        debug!("readlink({:?}) failed: errno {}", procfs_name, errno);
        buf.clear();
        return Err(FdPathError::ResolutionFailed(errno));
    }

    // readlink does not NUL-terminate; a result that fills the buffer
    // exactly may have been truncated by the platform.
    if n as usize >= PATH_BUF_CAP {
        buf.clear();
        return Err(FdPathError::PathTooLong);
    }

    // Pipes and sockets resolve to targets like "pipe:[12345]".
    if buf.bytes[0] != b'/' {
        buf.clear();
        return Err(FdPathError::NotAPath);
    }

    Ok(())
}

/// Resolve the path behind `fd` into an owned [`PathBuf`].
pub fn path_of_fd(fd: RawFd) -> FdPathResult<PathBuf> {
    let mut buf = PathBuffer::new();
    resolve_into(fd, &mut buf)?;
    buf.to_path_buf().ok_or(FdPathError::NotAPath)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_cleared() {
        let buf = PathBuffer::new();
        assert!(buf.is_cleared());
        assert_eq!(buf.path_len(), 0);
        assert!(buf.to_path_buf().is_none());
    }

    #[test]
    fn clear_resets_contents() {
        let mut buf = PathBuffer::new();
        buf.bytes[0] = b'/';
        buf.bytes[1] = b'x';
        assert_eq!(buf.path_len(), 2);
        buf.clear();
        assert!(buf.is_cleared());
    }

    #[test]
    fn invalid_descriptor_fails_and_leaves_buffer_zero() {
        let mut buf = PathBuffer::new();
        let res = resolve_into(-1, &mut buf);
        assert!(matches!(res, Err(FdPathError::ResolutionFailed(_))));
        assert!(buf.is_cleared());
    }

    #[test]
    fn error_display_mentions_errno() {
        let msg = FdPathError::ResolutionFailed(9).to_string();
        assert!(msg.contains('9'));
    }
}
