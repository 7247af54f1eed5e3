//! RustUtils - Low-Level File Descriptor, Buffer and String Utilities
//!
//! This crate provides a set of small, independent helpers:
//! - Resolving the filesystem path behind an open file descriptor
//! - Bounds-checked reads of multi-byte values from byte buffers
//! - Read-only binary file access, whole-file or block-cached
//! - Line-oriented text file access with selectable line endings
//! - Path string manipulation with a configurable directory marker
//! - Directory content listing
//! - String helpers and byte-size parsing/formatting
//! - An arbitrary-width bit field
//! - Per-thread values and an atomic counter
//!
//! All operations are synchronous and stateless between calls. Errors are
//! returned through per-module error enums; nothing panics in library code.

pub mod binfile;
pub mod bitfield;
pub mod blob;
pub mod counter;
pub mod dir;
pub mod error;
pub mod fdpath;
pub mod pathstr;
pub mod strings;
pub mod textfile;
pub mod threadval;

pub use binfile::{BinaryFile, BlockCachedFile};
pub use bitfield::BitField;
pub use blob::{Blob, ByteOrder};
pub use counter::AtomicCounter;
pub use dir::{DirContents, DirFilter};
pub use error::UtilsError;
pub use fdpath::{path_of_fd, resolve_into, PathBuffer, PATH_BUF_CAP};
pub use pathstr::PathString;
pub use strings::StrExt;
pub use textfile::{BigTextFile, LineEnding, TextFile};
pub use threadval::ThreadValue;
