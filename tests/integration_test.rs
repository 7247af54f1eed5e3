//! End-to-end tests against real files and descriptors.

use std::fs::File;
use std::io::Write;
use std::os::unix::io::AsRawFd;
use std::path::PathBuf;

use rustutils::binfile::{BinaryFile, BlockCachedFile};
use rustutils::blob::ByteOrder;
use rustutils::fdpath::{self, FdPathError, PathBuffer};

fn temp_path(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!("rustutils_it_{}_{}", tag, std::process::id()))
}

fn write_temp(tag: &str, data: &[u8]) -> PathBuf {
    let path = temp_path(tag);
    let mut f = File::create(&path).unwrap();
    f.write_all(data).unwrap();
    f.sync_all().unwrap();
    path
}

#[test]
fn resolves_path_of_open_file() {
    let path = write_temp("resolve", b"example");
    let file = File::open(&path).unwrap();
    let fd = file.as_raw_fd();

    let resolved = fdpath::path_of_fd(fd).unwrap();
    assert_eq!(resolved, std::fs::canonicalize(&path).unwrap());

    // Stable descriptor resolves to the same path every time.
    let again = fdpath::path_of_fd(fd).unwrap();
    assert_eq!(resolved, again);

    drop(file);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn resolve_into_fills_caller_buffer() {
    let path = write_temp("buffer", b"example");
    let file = File::open(&path).unwrap();

    let mut buf = PathBuffer::new();
    fdpath::resolve_into(file.as_raw_fd(), &mut buf).unwrap();

    assert!(buf.path_len() > 0);
    assert!(buf.path_len() < rustutils::PATH_BUF_CAP);
    // NUL terminated, leading slash.
    assert_eq!(buf.as_bytes()[0], b'/');
    assert_eq!(buf.as_bytes()[buf.path_len()], 0);
    assert_eq!(
        buf.to_path_buf().unwrap(),
        std::fs::canonicalize(&path).unwrap()
    );

    drop(file);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn pipe_descriptor_has_no_path() {
    let mut fds = [0i32; 2];
    assert_eq!(unsafe { libc::pipe(fds.as_mut_ptr()) }, 0);

    let mut buf = PathBuffer::new();
    let res = fdpath::resolve_into(fds[0], &mut buf);
    assert!(res.is_err());
    assert!(buf.is_cleared());

    unsafe {
        libc::close(fds[0]);
        libc::close(fds[1]);
    }
}

#[test]
fn invalid_descriptor_fails_resolution() {
    // A descriptor number far above anything this process has open.
    let mut buf = PathBuffer::new();
    let res = fdpath::resolve_into(999_999, &mut buf);
    assert!(matches!(res, Err(FdPathError::ResolutionFailed(_))));
    assert!(buf.is_cleared());
}

#[test]
fn binary_file_from_borrowed_descriptor() {
    let path = write_temp("binfd", &[0x12, 0x34, 0x56, 0x78, 0x9A]);
    let file = File::open(&path).unwrap();
    let fd = file.as_raw_fd();

    let bin = BinaryFile::from_fd(fd).unwrap();
    assert_eq!(bin.as_slice(), &[0x12, 0x34, 0x56, 0x78, 0x9A]);
    assert_eq!(bin.u32_be(0).unwrap(), 0x1234_5678);

    // The descriptor stays open and usable.
    assert!(unsafe { libc::fcntl(fd, libc::F_GETFD) } >= 0);
    let again = BinaryFile::from_fd(fd).unwrap();
    assert_eq!(again.len(), 5);

    drop(file);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn block_cache_sees_file_replacement() {
    let path = write_temp("mtime", &vec![1u8; 600]);
    let mut cached = BlockCachedFile::open(&path, 256, 2).unwrap();
    assert_eq!(cached.byte(0).unwrap(), 1);

    // Rewrite the file; the next read must observe the new contents.
    std::thread::sleep(std::time::Duration::from_millis(50));
    std::fs::write(&path, vec![2u8; 600]).unwrap();

    assert_eq!(cached.byte(0).unwrap(), 2);
    assert!(cached.stats().purges >= 1);
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn words_from_cached_file() {
    let mut data = vec![0u8; 700];
    data[0] = 0x34;
    data[1] = 0x12;
    let path = write_temp("words", &data);

    let mut cached = BlockCachedFile::open(&path, 256, 4).unwrap();
    assert_eq!(cached.u16_at(0, ByteOrder::Little).unwrap(), 0x1234);
    assert_eq!(
        cached.u16_at(0, ByteOrder::Native).unwrap(),
        u16::from_ne_bytes([0x34, 0x12])
    );
    std::fs::remove_file(&path).unwrap();
}
