//! Word arithmetic as the machine's ALU performs it.
//!
//! Addition and subtraction are written as carry/borrow propagation loops
//! over whole words rather than with native integer operators, so the
//! results match the panel's bit-level behavior exactly.

use crate::binary::Word;

/// Add two words by carry propagation. Wraps at the word width.
pub fn add<const BITS: u32>(a: Word<BITS>, b: Word<BITS>) -> Word<BITS> {
    let mut sum = a;
    let mut carry = b;

    while !carry.is_zero() {
        let next = sum & carry;
        sum = sum ^ carry;
        carry = next.shl1();
    }

    sum
}

/// Subtract `b` from `a` by borrow propagation. Wraps at the word width.
///
/// Each round computes `borrow = !a & b`, `a = a ^ b`, `b = borrow << 1`
/// until nothing is left to borrow. Borrows past the top bit are dropped.
pub fn subtract<const BITS: u32>(a: Word<BITS>, b: Word<BITS>) -> Word<BITS> {
    let mut diff = a;
    let mut borrow_in = b;

    while !borrow_in.is_zero() {
        let borrow = diff.not() & borrow_in;
        diff = diff ^ borrow_in;
        borrow_in = borrow.shl1();
    }

    diff
}

/// Bitwise OR. This is what the panel's `DOD` ("add") signal computes.
#[inline]
pub fn or<const BITS: u32>(a: Word<BITS>, b: Word<BITS>) -> Word<BITS> {
    a | b
}

/// Move a word into a different width, keeping the low-order bits.
#[inline]
pub fn narrow<const FROM: u32, const TO: u32>(w: Word<FROM>) -> Word<TO> {
    Word::<TO>::truncate(w.value())
}
