//! Bounds-Checked Byte Buffer Reads
//!
//! Reads multi-byte unsigned values out of arbitrary byte buffers at a
//! given offset. Every read is bounds-checked against the buffer length
//! and returns a typed error instead of reading out of bounds, and the
//! byte order is an explicit parameter rather than an implicit host
//! assumption.

use core::fmt;

/// Result type for blob reads
pub type BlobResult<T> = Result<T, BlobError>;

/// Byte order used when assembling multi-byte values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ByteOrder {
    /// Host byte order; matches a raw in-memory load on the host
    #[default]
    Native,
    /// Little-endian, low byte first
    Little,
    /// Big-endian, high byte first
    Big,
}

/// Blob read errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobError {
    /// A read of `len` bytes at `offset` does not fit in `buf_len` bytes
    OutOfBounds {
        /// Byte offset the read started at
        offset: usize,
        /// Number of bytes the read needed
        len: usize,
        /// Length of the buffer
        buf_len: usize,
    },
}

impl fmt::Display for BlobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlobError::OutOfBounds {
                offset,
                len,
                buf_len,
            } => write!(
                f,
                "read of {} bytes at offset {} exceeds buffer length {}",
                len, offset, buf_len
            ),
        }
    }
}

impl std::error::Error for BlobError {}

/// Fetch exactly `N` bytes starting at `offset`.
fn read_bytes<const N: usize>(buf: &[u8], offset: usize) -> BlobResult<[u8; N]> {
    let end = offset.checked_add(N).ok_or(BlobError::OutOfBounds {
        offset,
        len: N,
        buf_len: buf.len(),
    })?;
    let slice = buf.get(offset..end).ok_or(BlobError::OutOfBounds {
        offset,
        len: N,
        buf_len: buf.len(),
    })?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(slice);
    Ok(bytes)
}

/// Read a `u8` at `offset`. The byte order parameter is accepted for
/// uniformity with the wider reads and has no effect.
pub fn read_u8(buf: &[u8], offset: usize, _order: ByteOrder) -> BlobResult<u8> {
    let bytes: [u8; 1] = read_bytes(buf, offset)?;
    Ok(bytes[0])
}

/// Read a `u16` from the two bytes starting at `offset`.
pub fn read_u16(buf: &[u8], offset: usize, order: ByteOrder) -> BlobResult<u16> {
    let bytes: [u8; 2] = read_bytes(buf, offset)?;
    Ok(match order {
        ByteOrder::Native => u16::from_ne_bytes(bytes),
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    })
}

/// Read a `u32` from the four bytes starting at `offset`.
pub fn read_u32(buf: &[u8], offset: usize, order: ByteOrder) -> BlobResult<u32> {
    let bytes: [u8; 4] = read_bytes(buf, offset)?;
    Ok(match order {
        ByteOrder::Native => u32::from_ne_bytes(bytes),
        ByteOrder::Little => u32::from_le_bytes(bytes),
        ByteOrder::Big => u32::from_be_bytes(bytes),
    })
}

/// Read a `u64` from the eight bytes starting at `offset`.
pub fn read_u64(buf: &[u8], offset: usize, order: ByteOrder) -> BlobResult<u64> {
    let bytes: [u8; 8] = read_bytes(buf, offset)?;
    Ok(match order {
        ByteOrder::Native => u64::from_ne_bytes(bytes),
        ByteOrder::Little => u64::from_le_bytes(bytes),
        ByteOrder::Big => u64::from_be_bytes(bytes),
    })
}

/// Read-only view over a byte region with positional and cursor reads.
///
/// The cursor-style `*_at` methods advance the supplied offset past the
/// bytes they consumed, for sequential decoding.
#[derive(Debug, Clone, Copy)]
pub struct Blob<'a> {
    bytes: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Wrap a byte slice
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Length of the underlying region in bytes
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True if the region is empty
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying bytes
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Byte at `offset`
    pub fn u8_at(&self, offset: usize) -> BlobResult<u8> {
        read_u8(self.bytes, offset, ByteOrder::Native)
    }

    /// `u16` at `offset` in the given byte order
    pub fn u16_at(&self, offset: usize, order: ByteOrder) -> BlobResult<u16> {
        read_u16(self.bytes, offset, order)
    }

    /// `u32` at `offset` in the given byte order
    pub fn u32_at(&self, offset: usize, order: ByteOrder) -> BlobResult<u32> {
        read_u32(self.bytes, offset, order)
    }

    /// `u64` at `offset` in the given byte order
    pub fn u64_at(&self, offset: usize, order: ByteOrder) -> BlobResult<u64> {
        read_u64(self.bytes, offset, order)
    }

    /// Read a `u8` at `*offset` and advance the offset by 1
    pub fn read_u8_at(&self, offset: &mut usize, order: ByteOrder) -> BlobResult<u8> {
        let value = read_u8(self.bytes, *offset, order)?;
        *offset += 1;
        Ok(value)
    }

    /// Read a `u16` at `*offset` and advance the offset by 2
    pub fn read_u16_at(&self, offset: &mut usize, order: ByteOrder) -> BlobResult<u16> {
        let value = read_u16(self.bytes, *offset, order)?;
        *offset += 2;
        Ok(value)
    }

    /// Read a `u32` at `*offset` and advance the offset by 4
    pub fn read_u32_at(&self, offset: &mut usize, order: ByteOrder) -> BlobResult<u32> {
        let value = read_u32(self.bytes, *offset, order)?;
        *offset += 4;
        Ok(value)
    }

    /// Read a `u64` at `*offset` and advance the offset by 8
    pub fn read_u64_at(&self, offset: &mut usize, order: ByteOrder) -> BlobResult<u64> {
        let value = read_u64(self.bytes, *offset, order)?;
        *offset += 8;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u16_native_order_matches_host() {
        let buf = [0x34u8, 0x12];
        let value = read_u16(&buf, 0, ByteOrder::Native).unwrap();
        assert_eq!(value, u16::from_ne_bytes(buf));
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn u16_native_on_little_endian_host() {
        assert_eq!(read_u16(&[0x34, 0x12], 0, ByteOrder::Native).unwrap(), 0x1234);
    }

    #[test]
    fn u16_explicit_orders() {
        let buf = [0x12u8, 0x34];
        assert_eq!(read_u16(&buf, 0, ByteOrder::Little).unwrap(), 0x3412);
        assert_eq!(read_u16(&buf, 0, ByteOrder::Big).unwrap(), 0x1234);
    }

    #[test]
    fn u16_at_offset() {
        let buf = [0xFFu8, 0x12, 0x34];
        assert_eq!(read_u16(&buf, 1, ByteOrder::Big).unwrap(), 0x1234);
    }

    #[test]
    fn out_of_bounds_is_an_error() {
        let buf = [0u8; 2];
        assert_eq!(
            read_u16(&buf, 1, ByteOrder::Native),
            Err(BlobError::OutOfBounds {
                offset: 1,
                len: 2,
                buf_len: 2
            })
        );
        assert!(read_u32(&buf, 0, ByteOrder::Native).is_err());
        assert!(read_u8(&[], 0, ByteOrder::Native).is_err());
    }

    #[test]
    fn offset_overflow_is_an_error() {
        let buf = [0u8; 8];
        assert!(read_u64(&buf, usize::MAX, ByteOrder::Native).is_err());
    }

    #[test]
    fn wider_reads() {
        let buf = [0x01u8, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08];
        assert_eq!(read_u32(&buf, 0, ByteOrder::Big).unwrap(), 0x0102_0304);
        assert_eq!(
            read_u64(&buf, 0, ByteOrder::Big).unwrap(),
            0x0102_0304_0506_0708
        );
        assert_eq!(read_u32(&buf, 4, ByteOrder::Little).unwrap(), 0x0807_0605);
    }

    #[test]
    fn cursor_reads_advance() {
        let data = [0x01u8, 0x00, 0x02, 0x00, 0x03, 0x00, 0x00, 0x00];
        let blob = Blob::new(&data);
        let mut offset = 0;
        let a: u16 = blob.read_u16_at(&mut offset, ByteOrder::Little).unwrap();
        let b: u16 = blob.read_u16_at(&mut offset, ByteOrder::Little).unwrap();
        let c: u32 = blob.read_u32_at(&mut offset, ByteOrder::Little).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));
        assert_eq!(offset, 8);
        assert!(blob.read_u16_at(&mut offset, ByteOrder::Little).is_err());
        // A failed cursor read must not advance.
        assert_eq!(offset, 8);
    }
}
