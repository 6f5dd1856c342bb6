//! Fixed-width binary words and the ALU operations over them.
//!
//! - [`Word5`] - 5-bit address word (registers `L`, `A` and the address bus)
//! - [`Word8`] - 8-bit data word (registers `I`, `AK`, `S`, `JAML`, the data bus, memory cells)

mod word;
pub mod arith;

pub use word::{Word, Word5, Word8, WidthError};
