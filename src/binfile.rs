//! Read-Only Binary File Access
//!
//! Two access styles for binary files:
//! - [`BinaryFile`]: loads an entire regular file into memory, from a
//!   path or a borrowed descriptor, and exposes bounds-checked word
//!   accessors over the data.
//! - [`BlockCachedFile`]: random access to very large files through a
//!   bounded cache of fixed-size blocks with FIFO eviction and a
//!   modification-time check that purges the cache when the file
//!   changes behind it.

use core::fmt;
use std::collections::{BTreeMap, VecDeque};
use std::fs::File;
use std::io;
use std::ops::Range;
use std::os::unix::fs::{FileExt, MetadataExt};
use std::os::unix::io::{FromRawFd, RawFd};
use std::path::Path;

use log::debug;

use crate::blob::{self, Blob, BlobError, ByteOrder};

/// Smallest allowed cache block size in bytes
pub const MIN_BLOCK_SIZE: u16 = 256;

/// Result type for binary file operations
pub type BinFileResult<T> = Result<T, BinFileError>;

/// Binary file errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinFileError {
    /// The target exists but is not a regular file
    NotARegularFile,
    /// An I/O operation failed; carries the raw OS error code, or zero
    /// when the platform supplied none
    Io(i32),
    /// A byte position or range lies outside the file
    OutOfRange,
    /// Block size or block count outside the permitted range
    BadCacheGeometry,
}

impl fmt::Display for BinFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinFileError::NotARegularFile => write!(f, "not a regular file"),
            BinFileError::Io(errno) => write!(f, "i/o failure (os error {})", errno),
            BinFileError::OutOfRange => write!(f, "position outside file"),
            BinFileError::BadCacheGeometry => write!(f, "invalid block size or block count"),
        }
    }
}

impl std::error::Error for BinFileError {}

impl From<io::Error> for BinFileError {
    fn from(err: io::Error) -> Self {
        BinFileError::Io(err.raw_os_error().unwrap_or(0))
    }
}

impl From<BlobError> for BinFileError {
    fn from(_: BlobError) -> Self {
        BinFileError::OutOfRange
    }
}

/// An entire regular file held in memory, read-only.
#[derive(Debug, Clone)]
pub struct BinaryFile {
    data: Vec<u8>,
}

impl BinaryFile {
    /// Load a regular file from a path. Non-regular files are rejected.
    pub fn open<P: AsRef<Path>>(path: P) -> BinFileResult<Self> {
        let meta = std::fs::metadata(path.as_ref())?;
        if !meta.file_type().is_file() {
            return Err(BinFileError::NotARegularFile);
        }
        let data = std::fs::read(path.as_ref())?;
        Ok(Self { data })
    }

    /// Load a regular file from a borrowed descriptor.
    ///
    /// The descriptor is read with `pread`, so its offset is untouched,
    /// and it stays open and owned by the caller.
    pub fn from_fd(fd: RawFd) -> BinFileResult<Self> {
        let mut st: libc::stat = unsafe { std::mem::zeroed() };
        let res = unsafe { libc::fstat(fd, &mut st) };
        if res != 0 {
            return Err(BinFileError::Io(
                io::Error::last_os_error().raw_os_error().unwrap_or(0),
            ));
        }
        if (st.st_mode & libc::S_IFMT) != libc::S_IFREG {
            return Err(BinFileError::NotARegularFile);
        }

        let size = st.st_size as usize;
        let mut data = vec![0u8; size];
        let mut filled = 0usize;
        while filled < size {
            let n = unsafe {
                libc::pread(
                    fd,
                    data[filled..].as_mut_ptr() as *mut libc::c_void,
                    size - filled,
                    filled as libc::off_t,
                )
            };
            if n < 0 {
                let errno = io::Error::last_os_error();
                if errno.kind() == io::ErrorKind::Interrupted {
                    continue;
                }
                return Err(errno.into());
            }
            if n == 0 {
                // File shrank underneath us.
                data.truncate(filled);
                break;
            }
            filled += n as usize;
        }
        Ok(Self { data })
    }

    /// File size in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True if the file is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The file contents
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// A [`Blob`] view over the contents
    pub fn blob(&self) -> Blob<'_> {
        Blob::new(&self.data)
    }

    /// Byte at `pos`, or `None` past the end
    pub fn byte(&self, pos: usize) -> Option<u8> {
        self.data.get(pos).copied()
    }

    /// `u16` at byte position `pos` in the given byte order
    pub fn u16_at(&self, pos: usize, order: ByteOrder) -> BinFileResult<u16> {
        Ok(blob::read_u16(&self.data, pos, order)?)
    }

    /// `u32` at byte position `pos` in the given byte order
    pub fn u32_at(&self, pos: usize, order: ByteOrder) -> BinFileResult<u32> {
        Ok(blob::read_u32(&self.data, pos, order)?)
    }

    /// `u64` at byte position `pos` in the given byte order
    pub fn u64_at(&self, pos: usize, order: ByteOrder) -> BinFileResult<u64> {
        Ok(blob::read_u64(&self.data, pos, order)?)
    }

    /// `u16` at byte position `pos`, high byte first
    pub fn u16_be(&self, pos: usize) -> BinFileResult<u16> {
        self.u16_at(pos, ByteOrder::Big)
    }

    /// `u32` at byte position `pos`, high byte first
    pub fn u32_be(&self, pos: usize) -> BinFileResult<u32> {
        self.u32_at(pos, ByteOrder::Big)
    }

    /// `u64` at byte position `pos`, high byte first
    pub fn u64_be(&self, pos: usize) -> BinFileResult<u64> {
        self.u64_at(pos, ByteOrder::Big)
    }
}

/// Block cache statistics
#[derive(Debug, Default, Clone, Copy)]
pub struct CacheStats {
    /// Block lookups served from the cache
    pub hits: u64,
    /// Block lookups that had to load from disk
    pub misses: u64,
    /// Blocks evicted to make room
    pub evictions: u64,
    /// Whole-cache purges after the file changed
    pub purges: u64,
}

/// Random access to a large file through a bounded block cache.
///
/// Blocks load on demand; when the cache holds `max_blocks` blocks the
/// oldest loaded block is evicted first. Reads check the file's
/// modification time and purge the cache if the file changed since the
/// last check.
pub struct BlockCachedFile {
    file: File,
    block_size: usize,
    max_blocks: usize,
    data_size: u64,
    block_count: u64,
    /// Loaded blocks keyed by block number
    blocks: BTreeMap<u64, Vec<u8>>,
    /// Load order, oldest block number in front
    history: VecDeque<u64>,
    /// Modification time (seconds, nanoseconds) at the last check
    last_mtime: (i64, i64),
    stats: CacheStats,
}

impl BlockCachedFile {
    /// Open a regular file for block-cached access.
    ///
    /// `block_size` must be at least [`MIN_BLOCK_SIZE`] and `max_blocks`
    /// at least one; both are fixed for the life of the value.
    pub fn open<P: AsRef<Path>>(
        path: P,
        block_size: u16,
        max_blocks: usize,
    ) -> BinFileResult<Self> {
        if block_size < MIN_BLOCK_SIZE || max_blocks == 0 {
            return Err(BinFileError::BadCacheGeometry);
        }
        let file = File::open(path.as_ref())?;
        Self::from_file(file, block_size, max_blocks)
    }

    /// Open from a borrowed descriptor.
    ///
    /// The descriptor is duplicated; the caller's descriptor stays open
    /// and is never altered.
    pub fn from_fd(fd: RawFd, block_size: u16, max_blocks: usize) -> BinFileResult<Self> {
        if block_size < MIN_BLOCK_SIZE || max_blocks == 0 {
            return Err(BinFileError::BadCacheGeometry);
        }
        let dup = unsafe { libc::dup(fd) };
        if dup < 0 {
            return Err(BinFileError::Io(
                io::Error::last_os_error().raw_os_error().unwrap_or(0),
            ));
        }
        let file = unsafe { File::from_raw_fd(dup) };
        Self::from_file(file, block_size, max_blocks)
    }

    fn from_file(file: File, block_size: u16, max_blocks: usize) -> BinFileResult<Self> {
        let mut cache = Self {
            file,
            block_size: block_size as usize,
            max_blocks,
            data_size: 0,
            block_count: 0,
            blocks: BTreeMap::new(),
            history: VecDeque::new(),
            last_mtime: (i64::MIN, 0),
            stats: CacheStats::default(),
        };
        cache.file_check()?;
        Ok(cache)
    }

    /// File size in bytes at the last check
    pub fn len(&self) -> u64 {
        self.data_size
    }

    /// True if the file was empty at the last check
    pub fn is_empty(&self) -> bool {
        self.data_size == 0
    }

    /// Configured block size in bytes
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Number of blocks the file occupies
    pub fn block_count(&self) -> u64 {
        self.block_count
    }

    /// Size of the final block, which is usually shorter than
    /// `block_size`
    pub fn last_block_size(&self) -> usize {
        if self.data_size == 0 {
            return 0;
        }
        let rem = (self.data_size % self.block_size as u64) as usize;
        if rem == 0 {
            self.block_size
        } else {
            rem
        }
    }

    /// Cache statistics
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Re-stat the file; purge the cache if it changed since the last
    /// check.
    fn file_check(&mut self) -> BinFileResult<()> {
        let meta = self.file.metadata()?;
        if !meta.file_type().is_file() {
            return Err(BinFileError::NotARegularFile);
        }

        let mtime = (meta.mtime(), meta.mtime_nsec());
        if self.last_mtime.0 == i64::MIN {
            self.last_mtime = mtime;
        } else if mtime > self.last_mtime {
            debug!("file changed behind the cache, purging {} blocks", self.blocks.len());
            self.purge();
            self.last_mtime = mtime;
        }

        self.data_size = meta.len();
        self.block_count = if self.data_size > 0 {
            (self.data_size - 1) / self.block_size as u64 + 1
        } else {
            0
        };
        Ok(())
    }

    /// Drop every cached block.
    pub fn purge(&mut self) {
        self.blocks.clear();
        self.history.clear();
        self.stats.purges += 1;
    }

    /// Expected byte length of `block`.
    fn expected_len(&self, block: u64) -> usize {
        if block + 1 == self.block_count {
            self.last_block_size()
        } else {
            self.block_size
        }
    }

    /// Read `block` from disk without touching the cache.
    fn read_block(&self, block: u64) -> BinFileResult<Vec<u8>> {
        let want = self.expected_len(block);
        let mut data = vec![0u8; want];
        let base = block * self.block_size as u64;
        let mut filled = 0usize;
        while filled < want {
            let n = self
                .file
                .read_at(&mut data[filled..], base + filled as u64)?;
            if n == 0 {
                return Err(BinFileError::OutOfRange);
            }
            filled += n;
        }
        Ok(data)
    }

    /// Ensure `block` is cached. Caller has already checked the block
    /// number against `block_count`.
    fn load(&mut self, block: u64) -> BinFileResult<()> {
        if self.blocks.contains_key(&block) {
            self.stats.hits += 1;
            return Ok(());
        }
        self.stats.misses += 1;

        // Cache full, toss the oldest.
        if self.blocks.len() == self.max_blocks {
            if let Some(oldest) = self.history.pop_front() {
                self.blocks.remove(&oldest);
                self.stats.evictions += 1;
                debug!("evicting block {}", oldest);
            }
        }

        let data = self.read_block(block)?;
        self.blocks.insert(block, data);
        self.history.push_back(block);
        Ok(())
    }

    /// Byte at `pos`
    pub fn byte(&mut self, pos: u64) -> BinFileResult<u8> {
        self.file_check()?;
        if pos >= self.data_size {
            return Err(BinFileError::OutOfRange);
        }
        let block = pos / self.block_size as u64;
        let idx = (pos % self.block_size as u64) as usize;
        self.load(block)?;
        Ok(self.blocks[&block][idx])
    }

    /// Bytes in `range`, assembled across block boundaries
    pub fn range(&mut self, range: Range<u64>) -> BinFileResult<Vec<u8>> {
        self.file_check()?;
        if range.end > self.data_size || range.start > range.end {
            return Err(BinFileError::OutOfRange);
        }
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let start_block = range.start / self.block_size as u64;
        let end_block = (range.end - 1) / self.block_size as u64;
        let mut out = Vec::with_capacity((range.end - range.start) as usize);

        for block in start_block..=end_block {
            self.load(block)?;
            let data = &self.blocks[&block];
            let base = block * self.block_size as u64;
            let from = range.start.saturating_sub(base) as usize;
            let to = ((range.end - base) as usize).min(data.len());
            out.extend_from_slice(&data[from..to]);
        }
        Ok(out)
    }

    /// `u16` at byte position `pos` in the given byte order
    pub fn u16_at(&mut self, pos: u64, order: ByteOrder) -> BinFileResult<u16> {
        let bytes = self.range(pos..pos.checked_add(2).ok_or(BinFileError::OutOfRange)?)?;
        Ok(blob::read_u16(&bytes, 0, order)?)
    }

    /// `u32` at byte position `pos` in the given byte order
    pub fn u32_at(&mut self, pos: u64, order: ByteOrder) -> BinFileResult<u32> {
        let bytes = self.range(pos..pos.checked_add(4).ok_or(BinFileError::OutOfRange)?)?;
        Ok(blob::read_u32(&bytes, 0, order)?)
    }

    /// `u64` at byte position `pos` in the given byte order
    pub fn u64_at(&mut self, pos: u64, order: ByteOrder) -> BinFileResult<u64> {
        let bytes = self.range(pos..pos.checked_add(8).ok_or(BinFileError::OutOfRange)?)?;
        Ok(blob::read_u64(&bytes, 0, order)?)
    }

    /// Load `block` into the cache ahead of use. Out-of-range block
    /// numbers are ignored.
    pub fn preload(&mut self, block: u64) -> BinFileResult<()> {
        self.file_check()?;
        if block < self.block_count {
            self.load(block)?;
        }
        Ok(())
    }

    /// Copy of `block`, served from the cache if present but never
    /// loaded into it.
    pub fn copy_block(&mut self, block: u64) -> BinFileResult<Vec<u8>> {
        self.file_check()?;
        if block >= self.block_count {
            return Err(BinFileError::OutOfRange);
        }
        if let Some(data) = self.blocks.get(&block) {
            return Ok(data.clone());
        }
        self.read_block(block)
    }

    /// The entire file contents, read directly from disk. The cache is
    /// neither consulted nor populated.
    pub fn all_data(&mut self) -> BinFileResult<Vec<u8>> {
        self.file_check()?;
        let size = self.data_size as usize;
        let mut data = vec![0u8; size];
        let mut filled = 0usize;
        while filled < size {
            let n = self.file.read_at(&mut data[filled..], filled as u64)?;
            if n == 0 {
                return Err(BinFileError::Io(0));
            }
            filled += n;
        }
        Ok(data)
    }
}

impl fmt::Debug for BlockCachedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockCachedFile")
            .field("data_size", &self.data_size)
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .field("cached", &self.blocks.len())
            .field("max_blocks", &self.max_blocks)
            .finish()
    }
}
