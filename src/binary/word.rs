//! Fixed-width unsigned binary words.
//!
//! The machine has two register widths:
//! - `Word5`: address-class registers (`L`, `A`, `busA`) and memory addresses
//! - `Word8`: data-class registers (`I`, `AK`, `S`, `JAML`, `busS`) and memory cells
//!
//! A `Word<BITS>` can never hold a value outside `0..2^BITS`. Every
//! constructor either truncates explicitly or fails.

use std::fmt;
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// An unsigned word of `BITS` bits (1 to 8), stored in the low bits of a byte.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Word<const BITS: u32> {
    bits: u8,
}

/// 5-bit address word (0-31).
pub type Word5 = Word<5>;

/// 8-bit data word (0-255).
pub type Word8 = Word<8>;

impl<const BITS: u32> Word<BITS> {
    /// Number of bits in this word.
    pub const WIDTH: u32 = BITS;

    /// Mask selecting the valid bits.
    pub const MASK: u8 = {
        assert!(BITS >= 1 && BITS <= 8, "word width must be 1..=8 bits");
        ((1u16 << BITS) - 1) as u8
    };

    /// Largest representable value.
    pub const MAX: u8 = Self::MASK;

    /// Number of distinct values (`2^BITS`).
    pub const COUNT: usize = 1 << BITS;

    /// The zero word.
    #[inline]
    pub const fn zero() -> Self {
        Self { bits: 0 }
    }

    /// Keep the low `BITS` bits of `value`, dropping the rest.
    #[inline]
    pub const fn truncate(value: u8) -> Self {
        Self { bits: value & Self::MASK }
    }

    /// The stored value.
    #[inline]
    pub const fn value(self) -> u8 {
        self.bits
    }

    /// The stored value as an index.
    #[inline]
    pub const fn index(self) -> usize {
        self.bits as usize
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.bits == 0
    }

    /// Add one, wrapping from `MAX` to 0.
    #[inline]
    pub const fn wrapping_inc(self) -> Self {
        Self::truncate(self.bits.wrapping_add(1))
    }

    /// Subtract one, wrapping from 0 to `MAX`.
    #[inline]
    pub const fn wrapping_dec(self) -> Self {
        Self::truncate(self.bits.wrapping_sub(1))
    }

    /// Bitwise NOT within the word width.
    #[inline]
    pub const fn not(self) -> Self {
        Self::truncate(!self.bits)
    }

    /// Shift left by one, dropping the bit that leaves the word.
    #[inline]
    pub const fn shl1(self) -> Self {
        Self::truncate(self.bits << 1)
    }

    /// Parse a binary string such as `"00101"` (exactly `BITS` digits).
    pub fn parse(s: &str) -> Result<Self, WidthError> {
        let s = s.trim();
        let s = s.strip_prefix("0b").unwrap_or(s);

        if s.len() != BITS as usize {
            return Err(WidthError::WrongLength { expected: BITS, got: s.len() });
        }

        let mut bits = 0u8;
        for c in s.chars() {
            bits = (bits << 1) | match c {
                '0' => 0,
                '1' => 1,
                _ => return Err(WidthError::InvalidChar(c)),
            };
        }

        Ok(Self { bits })
    }
}

impl<const BITS: u32> TryFrom<u8> for Word<BITS> {
    type Error = WidthError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value > Self::MAX {
            return Err(WidthError::OutOfRange { value, bits: BITS });
        }
        Ok(Self { bits: value })
    }
}

impl<const BITS: u32> From<Word<BITS>> for u8 {
    fn from(word: Word<BITS>) -> u8 {
        word.bits
    }
}

impl<const BITS: u32> std::ops::BitOr for Word<BITS> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self { bits: self.bits | rhs.bits }
    }
}

impl<const BITS: u32> std::ops::BitAnd for Word<BITS> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self { bits: self.bits & rhs.bits }
    }
}

impl<const BITS: u32> std::ops::BitXor for Word<BITS> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        Self { bits: self.bits ^ rhs.bits }
    }
}

impl<const BITS: u32> fmt::Debug for Word<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self, self.bits)
    }
}

impl<const BITS: u32> fmt::Display for Word<BITS> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0width$b}", self.bits, width = BITS as usize)
    }
}

/// Errors when building a word from outside data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WidthError {
    #[error("value {value} does not fit in {bits} bits")]
    OutOfRange { value: u8, bits: u32 },

    #[error("expected {expected} binary digits, got {got}")]
    WrongLength { expected: u32, got: usize },

    #[error("invalid binary digit: '{0}'")]
    InvalidChar(char),
}
