//! Smoke tests across the pure in-memory helpers.

use rustutils::bitfield::BitField;
use rustutils::blob::{self, Blob, ByteOrder};
use rustutils::counter::AtomicCounter;
use rustutils::pathstr::PathString;
use rustutils::strings::StrExt;
use rustutils::threadval::ThreadValue;

#[test]
fn native_u16_read() {
    let buf = [0x34u8, 0x12];
    let value = blob::read_u16(&buf, 0, ByteOrder::Native).unwrap();
    assert_eq!(value, u16::from_ne_bytes(buf));
    #[cfg(target_endian = "little")]
    assert_eq!(value, 0x1234);
}

#[test]
fn blob_view_round() {
    let data = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let blob = Blob::new(&data);
    assert_eq!(blob.len(), 8);
    assert_eq!(blob.u8_at(3).unwrap(), 3);
    assert_eq!(blob.u32_at(0, ByteOrder::Big).unwrap(), 0x0001_0203);
    assert!(blob.u64_at(1, ByteOrder::Big).is_err());
}

#[test]
fn path_building() {
    let mut p = PathString::new("/tmp");
    p.push("work");
    p.push("data");
    p.add_suffix("bin");
    assert_eq!(p.as_str(), "/tmp/work/data.bin");
    assert_eq!(p.last_component(), Some("data.bin"));
    p.remove_suffix().unwrap();
    assert_eq!(p.as_str(), "/tmp/work/data");
}

#[test]
fn string_helpers() {
    assert_eq!("ABCDEFGH".remove_chars("ABCD"), "EFGH");
    assert_eq!("/a//b///c".reduce_consecutive_char('/'), "/a/b/c");
    assert_eq!("64KiB".parse_suffixed_uint(), Some(65536));
}

#[test]
fn bitfield_round() {
    let mut bf = BitField::new(12).unwrap();
    bf.set(0, true);
    bf.set(11, true);
    assert_eq!(bf.count_ones(), 2);
    bf.shift_right(1);
    assert!(bf.get(10));
    assert!(!bf.get(11));
}

#[test]
fn counter_and_thread_value() {
    let counter = AtomicCounter::new(0);
    assert_eq!(counter.add_and_get(5), 5);

    let tv = ThreadValue::new();
    tv.set(counter.get());
    assert_eq!(tv.get(), Some(5));
}
