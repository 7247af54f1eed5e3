//! String Helpers
//!
//! Character-set filtering, run reduction, splitting, and byte-size
//! parsing/formatting. Exposed as the [`StrExt`] extension trait on
//! `str` plus two free formatting functions.

/// Byte-size suffixes, powers of 1024
const SUFFIX_1024: [&str; 6] = ["byte", "KiB", "MiB", "GiB", "TiB", "PiB"];
/// Byte-size suffixes, powers of 1000
const SUFFIX_1000: [&str; 6] = ["byte", "KB", "MB", "GB", "TB", "PB"];

/// String helper operations
pub trait StrExt {
    /// Copy with every character in `set` removed
    fn remove_chars(&self, set: &str) -> String;

    /// Copy keeping only characters in `set`
    fn retain_chars(&self, set: &str) -> String;

    /// True if every character is in `set`; false for an empty `set`
    fn only_contains(&self, set: &str) -> bool;

    /// True if no character is in `set`
    fn contains_none_of(&self, set: &str) -> bool;

    /// Copy with every character in `set` replaced by `with`
    fn replace_chars(&self, set: &str, with: char) -> String;

    /// Number of occurrences of `c`
    fn count_of(&self, c: char) -> usize;

    /// Text after the last occurrence of `c`, or `None` when absent.
    /// Empty when `c` is the final character.
    fn after_last(&self, c: char) -> Option<&str>;

    /// Text before the last occurrence of `c`, or `None` when absent.
    /// Empty when `c` is the first character.
    fn before_last(&self, c: char) -> Option<&str>;

    /// Collapse every run of equal characters to one:
    /// `AAABBC` -> `ABC`
    fn reduce_consecutive(&self) -> String;

    /// Collapse runs of `c` only:
    /// `AABBDDD` with `D` -> `AABBD`
    fn reduce_consecutive_char(&self, c: char) -> String;

    /// Split into pieces of exactly `char_count` characters; `None`
    /// when the length is not a multiple of `char_count`
    fn equal_split(&self, char_count: usize) -> Option<Vec<String>>;

    /// Pieces before and after the first occurrence of `separator`;
    /// the second piece is `None` when the separator is absent
    fn before_and_after(&self, separator: &str) -> (&str, Option<&str>);

    /// Parse as hexadecimal. Empty input is zero; more than 16 digits
    /// or a non-hex character is `None`
    fn hex_to_uint(&self) -> Option<u64>;

    /// Parse a number with an optional byte-magnitude suffix:
    /// `"4KiB"` -> 4096, `"1.5 MB"` -> 1500000. Recognises
    /// byte/KB/MB/GB/TB/PB and KiB/MiB/GiB/TiB/PiB. `None` on unknown
    /// suffixes, more than one decimal point, or non-integral results.
    fn parse_suffixed_uint(&self) -> Option<u64>;
}

impl StrExt for str {
    fn remove_chars(&self, set: &str) -> String {
        self.chars().filter(|c| !set.contains(*c)).collect()
    }

    fn retain_chars(&self, set: &str) -> String {
        self.chars().filter(|c| set.contains(*c)).collect()
    }

    fn only_contains(&self, set: &str) -> bool {
        if set.is_empty() {
            return false;
        }
        self.chars().all(|c| set.contains(c))
    }

    fn contains_none_of(&self, set: &str) -> bool {
        !self.chars().any(|c| set.contains(c))
    }

    fn replace_chars(&self, set: &str, with: char) -> String {
        self.chars()
            .map(|c| if set.contains(c) { with } else { c })
            .collect()
    }

    fn count_of(&self, c: char) -> usize {
        self.chars().filter(|&x| x == c).count()
    }

    fn after_last(&self, c: char) -> Option<&str> {
        let idx = self.rfind(c)?;
        Some(&self[idx + c.len_utf8()..])
    }

    fn before_last(&self, c: char) -> Option<&str> {
        let idx = self.rfind(c)?;
        Some(&self[..idx])
    }

    fn reduce_consecutive(&self) -> String {
        let mut out = String::with_capacity(self.len());
        let mut last: Option<char> = None;
        for c in self.chars() {
            if Some(c) != last {
                out.push(c);
                last = Some(c);
            }
        }
        out
    }

    fn reduce_consecutive_char(&self, target: char) -> String {
        let mut out = String::with_capacity(self.len());
        let mut last: Option<char> = None;
        for c in self.chars() {
            if c == target && last == Some(target) {
                continue;
            }
            out.push(c);
            last = Some(c);
        }
        out
    }

    fn equal_split(&self, char_count: usize) -> Option<Vec<String>> {
        if char_count == 0 || self.chars().count() % char_count != 0 {
            return None;
        }
        let mut pieces = Vec::new();
        let mut piece = String::new();
        let mut count = 0;
        for c in self.chars() {
            piece.push(c);
            count += 1;
            if count == char_count {
                pieces.push(std::mem::take(&mut piece));
                count = 0;
            }
        }
        Some(pieces)
    }

    fn before_and_after(&self, separator: &str) -> (&str, Option<&str>) {
        match self.find(separator) {
            Some(idx) => (&self[..idx], Some(&self[idx + separator.len()..])),
            None => (self, None),
        }
    }

    fn hex_to_uint(&self) -> Option<u64> {
        if self.is_empty() {
            return Some(0);
        }
        if self.chars().count() > 16 {
            return None;
        }
        let mut value: u64 = 0;
        for c in self.chars() {
            let digit = c.to_digit(16)? as u64;
            value = (value << 4) + digit;
        }
        Some(value)
    }

    fn parse_suffixed_uint(&self) -> Option<u64> {
        let line = self.trim();
        if line.is_empty() {
            return None;
        }
        if line.count_of('.') > 1 {
            return None;
        }

        // No suffix at all.
        if let Ok(v) = line.parse::<f64>() {
            return f64_to_exact_uint(v);
        }

        let digits: usize = line
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .map(|c| c.len_utf8())
            .sum();
        if digits == 0 {
            return None;
        }
        let value: f64 = line[..digits].parse().ok()?;
        let suffix = line[digits..].trim().to_ascii_lowercase();

        let factor: f64 = match suffix.as_str() {
            "byte" | "bytes" => 1.0,
            "kb" => 1e3,
            "mb" => 1e6,
            "gb" => 1e9,
            "tb" => 1e12,
            "pb" => 1e15,
            "kib" => 1024.0,
            "mib" => 1048576.0,
            "gib" => 1073741824.0,
            "tib" => 1099511627776.0,
            "pib" => 1125899906842624.0,
            _ => return None,
        };
        f64_to_exact_uint(value * factor)
    }
}

/// `u64` from an `f64` only when the value is a non-negative integer in
/// range.
fn f64_to_exact_uint(v: f64) -> Option<u64> {
    if !v.is_finite() || v < 0.0 || v.fract() != 0.0 || v > u64::MAX as f64 {
        return None;
    }
    Some(v as u64)
}

/// Format a byte count with powers-of-1024 suffixes: `4096` ->
/// `"4.00 KiB"`
pub fn byte_string_1024(bytes: u64) -> String {
    scaled_string(bytes, 1024.0, &SUFFIX_1024)
}

/// Format a byte count with powers-of-1000 suffixes: `4000` ->
/// `"4.00 KB"`
pub fn byte_string_1000(bytes: u64) -> String {
    scaled_string(bytes, 1000.0, &SUFFIX_1000)
}

fn scaled_string(bytes: u64, step: f64, suffixes: &[&str; 6]) -> String {
    let mut value = bytes as f64;
    let mut idx = 0;
    while value > step && idx < suffixes.len() - 1 {
        value /= step;
        idx += 1;
    }
    format!("{:.2} {}", value, suffixes[idx])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remove_and_retain() {
        assert_eq!("ABCDEFGH".remove_chars("ABCD"), "EFGH");
        assert_eq!("ABCDEFGH".retain_chars("ABCD"), "ABCD");
        assert_eq!("".remove_chars("AB"), "");
    }

    #[test]
    fn containment() {
        assert!("ABBA".only_contains("AB"));
        assert!(!"ABC".only_contains("AB"));
        assert!(!"ABC".only_contains(""));
        assert!("XYZ".contains_none_of("AB"));
        assert!(!"XAZ".contains_none_of("AB"));
    }

    #[test]
    fn replace_and_count() {
        assert_eq!("A-B_C".replace_chars("-_", '.'), "A.B.C");
        assert_eq!("banana".count_of('a'), 3);
        assert_eq!("banana".count_of('z'), 0);
    }

    #[test]
    fn before_and_after_last() {
        assert_eq!("/a/b/c.txt".after_last('/'), Some("c.txt"));
        assert_eq!("/a/b/c.txt".before_last('/'), Some("/a/b"));
        assert_eq!("abc".after_last('/'), None);
        assert_eq!("abc/".after_last('/'), Some(""));
        assert_eq!("/abc".before_last('/'), Some(""));
    }

    #[test]
    fn run_reduction() {
        assert_eq!("AAABBCDDDEE".reduce_consecutive(), "ABCDE");
        assert_eq!(
            "AABBCCCDDDEEEEE".reduce_consecutive_char('D'),
            "AABBCCCDEEEEE"
        );
        assert_eq!("".reduce_consecutive(), "");
    }

    #[test]
    fn splitting() {
        assert_eq!(
            "AABBCC".equal_split(2),
            Some(vec!["AA".into(), "BB".into(), "CC".into()])
        );
        assert_eq!("AABBC".equal_split(2), None);
        assert_eq!("AABB".equal_split(0), None);

        // Characters, not bytes.
        assert_eq!(
            "αβγδ".equal_split(2),
            Some(vec!["αβ".into(), "γδ".into()])
        );

        assert_eq!("key=value".before_and_after("="), ("key", Some("value")));
        assert_eq!("plain".before_and_after("="), ("plain", None));
    }

    #[test]
    fn hex_parsing() {
        assert_eq!("".hex_to_uint(), Some(0));
        assert_eq!("ff".hex_to_uint(), Some(255));
        assert_eq!("DEADbeef".hex_to_uint(), Some(0xDEAD_BEEF));
        assert_eq!("xyz".hex_to_uint(), None);
        assert_eq!("11112222333344445".hex_to_uint(), None);
    }

    #[test]
    fn suffixed_uint() {
        assert_eq!("4KiB".parse_suffixed_uint(), Some(4096));
        assert_eq!("4 KB".parse_suffixed_uint(), Some(4000));
        assert_eq!("1.5MB".parse_suffixed_uint(), Some(1_500_000));
        assert_eq!("123".parse_suffixed_uint(), Some(123));
        assert_eq!("2GiB".parse_suffixed_uint(), Some(2_147_483_648));
        assert_eq!("1.2.3".parse_suffixed_uint(), None);
        assert_eq!("4XB".parse_suffixed_uint(), None);
        assert_eq!("".parse_suffixed_uint(), None);
        // 1.5 KiB = 1536 bytes, exact.
        assert_eq!("1.5KiB".parse_suffixed_uint(), Some(1536));
    }

    #[test]
    fn byte_strings() {
        assert_eq!(byte_string_1024(4096), "4.00 KiB");
        assert_eq!(byte_string_1000(4000), "4.00 KB");
        assert_eq!(byte_string_1024(512), "512.00 byte");
    }
}
