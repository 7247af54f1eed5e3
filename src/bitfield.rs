//! Arbitrary-Width Bit Field
//!
//! [`BitField`] holds a fixed number of bits (1..=255) in `u64` words.
//! Unused high bits of the last word are always zero; every mutating
//! operation re-masks them. Out-of-range bit numbers read as unset and
//! are ignored on writes, so no bit access can fail.

use core::fmt;

/// Grouping value that disables spacing in the [`fmt::Display`] output
const NO_GROUPING: u8 = 255;

/// A fixed-width field of up to 255 bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitField {
    words: Vec<u64>,
    bit_count: u8,
    /// Spacing step for `Display`; 255 means none
    group: u8,
}

impl BitField {
    /// Create an all-zero field of `bit_count` bits. `None` for a zero
    /// count.
    pub fn new(bit_count: u8) -> Option<Self> {
        if bit_count == 0 {
            return None;
        }
        let word_count = (bit_count as usize - 1) / 64 + 1;
        Some(Self {
            words: vec![0u64; word_count],
            bit_count,
            group: NO_GROUPING,
        })
    }

    fn from_word(value: u64, bit_count: u8) -> Self {
        let mut field = Self {
            words: vec![value],
            bit_count,
            group: NO_GROUPING,
        };
        field.clear_unused();
        field
    }

    /// Number of bits in the field
    pub fn bit_count(&self) -> u8 {
        self.bit_count
    }

    /// Mask covering the used bits of the last word
    fn keep_mask(&self) -> u64 {
        let used = self.bit_count as u32 % 64;
        if used == 0 {
            u64::MAX
        } else {
            (1u64 << used) - 1
        }
    }

    /// Zero the unused high bits of the last word.
    fn clear_unused(&mut self) {
        let mask = self.keep_mask();
        if let Some(last) = self.words.last_mut() {
            *last &= mask;
        }
    }

    /// Bit `bit`, or false out of range
    pub fn get(&self, bit: u8) -> bool {
        if bit >= self.bit_count {
            return false;
        }
        self.words[bit as usize / 64] & (1u64 << (bit % 64)) != 0
    }

    /// Set or clear bit `bit`; out of range is a no-op
    pub fn set(&mut self, bit: u8, value: bool) {
        if bit >= self.bit_count {
            return;
        }
        let word = &mut self.words[bit as usize / 64];
        if value {
            *word |= 1u64 << (bit % 64);
        } else {
            *word &= !(1u64 << (bit % 64));
        }
    }

    /// Flip bit `bit`; out of range is a no-op
    pub fn toggle(&mut self, bit: u8) {
        if bit >= self.bit_count {
            return;
        }
        self.words[bit as usize / 64] ^= 1u64 << (bit % 64);
    }

    /// Set every bit
    pub fn set_all(&mut self) {
        for word in &mut self.words {
            *word = u64::MAX;
        }
        self.clear_unused();
    }

    /// Clear every bit
    pub fn clear_all(&mut self) {
        for word in &mut self.words {
            *word = 0;
        }
    }

    /// Number of set bits
    pub fn count_ones(&self) -> u32 {
        self.words.iter().map(|w| w.count_ones()).sum()
    }

    /// Lowest set bit, or `None` when all clear
    pub fn first_set(&self) -> Option<u8> {
        (0..self.bit_count).find(|&bit| self.get(bit))
    }

    /// Lowest clear bit, or `None` when all set
    pub fn first_clear(&self) -> Option<u8> {
        (0..self.bit_count).find(|&bit| !self.get(bit))
    }

    /// First 64 bits of the field
    pub fn first_word(&self) -> u64 {
        self.words[0]
    }

    /// The field as a `u64`, when it fits
    pub fn value(&self) -> Option<u64> {
        if self.bit_count <= 64 {
            Some(self.words[0])
        } else {
            None
        }
    }

    /// Combine the first `min(self, other)` bits with `op`; bits above
    /// that width are untouched.
    fn combine<F: Fn(u64, u64) -> u64>(&mut self, other: &BitField, op: F) {
        let mut remaining = self.bit_count.min(other.bit_count) as u32;
        let mut idx = 0;
        while remaining >= 64 {
            self.words[idx] = op(self.words[idx], other.words[idx]);
            idx += 1;
            remaining -= 64;
        }
        if remaining > 0 {
            let mask = (1u64 << remaining) - 1;
            let merged = op(self.words[idx], other.words[idx]) & mask;
            self.words[idx] = (self.words[idx] & !mask) | merged;
        }
        self.clear_unused();
    }

    /// AND with another field over the lesser of the two widths
    pub fn and(&mut self, other: &BitField) {
        self.combine(other, |a, b| a & b);
    }

    /// OR with another field over the lesser of the two widths
    pub fn or(&mut self, other: &BitField) {
        self.combine(other, |a, b| a | b);
    }

    /// XOR with another field over the lesser of the two widths
    pub fn xor(&mut self, other: &BitField) {
        self.combine(other, |a, b| a ^ b);
    }

    /// AND a value into the first 64 bits (or fewer for narrow fields)
    pub fn and_value(&mut self, value: u64) {
        self.words[0] &= value;
        self.clear_unused();
    }

    /// OR a value into the first 64 bits (or fewer for narrow fields)
    pub fn or_value(&mut self, value: u64) {
        self.words[0] |= value;
        self.clear_unused();
    }

    /// XOR a value into the first 64 bits (or fewer for narrow fields)
    pub fn xor_value(&mut self, value: u64) {
        self.words[0] ^= value;
        self.clear_unused();
    }

    /// Invert every bit
    pub fn invert(&mut self) {
        for word in &mut self.words {
            *word = !*word;
        }
        self.clear_unused();
    }

    /// Shift every bit toward bit zero. Shifts of the full width or
    /// more clear the field.
    pub fn shift_right(&mut self, bits: u8) {
        if bits >= self.bit_count {
            self.clear_all();
            return;
        }
        let word_shift = bits as usize / 64;
        let bit_shift = bits as u32 % 64;
        let len = self.words.len();
        for i in 0..len {
            let src = i + word_shift;
            let low = self.words.get(src).copied().unwrap_or(0);
            let high = self.words.get(src + 1).copied().unwrap_or(0);
            self.words[i] = if bit_shift == 0 {
                low
            } else {
                (low >> bit_shift) | (high << (64 - bit_shift))
            };
        }
        self.clear_unused();
    }

    /// Shift every bit away from bit zero. Shifts of the full width or
    /// more clear the field.
    pub fn shift_left(&mut self, bits: u8) {
        if bits >= self.bit_count {
            self.clear_all();
            return;
        }
        let word_shift = bits as usize / 64;
        let bit_shift = bits as u32 % 64;
        let len = self.words.len();
        for i in (0..len).rev() {
            let low = i
                .checked_sub(word_shift)
                .and_then(|src| self.words.get(src))
                .copied()
                .unwrap_or(0);
            let lower = i
                .checked_sub(word_shift + 1)
                .and_then(|src| self.words.get(src))
                .copied()
                .unwrap_or(0);
            self.words[i] = if bit_shift == 0 {
                low
            } else {
                (low << bit_shift) | (lower >> (64 - bit_shift))
            };
        }
        self.clear_unused();
    }

    /// Insert a space every `step` bits in the `Display` output; 255
    /// disables grouping
    pub fn set_group_spacing(&mut self, step: u8) {
        self.group = step;
    }
}

impl From<u8> for BitField {
    fn from(value: u8) -> Self {
        Self::from_word(value as u64, 8)
    }
}

impl From<u16> for BitField {
    fn from(value: u16) -> Self {
        Self::from_word(value as u64, 16)
    }
}

impl From<u32> for BitField {
    fn from(value: u32) -> Self {
        Self::from_word(value as u64, 32)
    }
}

impl From<u64> for BitField {
    fn from(value: u64) -> Self {
        Self::from_word(value, 64)
    }
}

/// Prints lowest bit first, optionally grouped.
impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut step = 1u8;
        for bit in 0..self.bit_count {
            f.write_str(if self.get(bit) { "1" } else { "0" })?;
            if step == self.group {
                f.write_str(" ")?;
                step = 0;
            }
            step += 1;
        }
        Ok(())
    }
}
