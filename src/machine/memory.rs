//! The PaO store: the machine's instruction/data memory.
//!
//! One 8-bit cell per value of the 5-bit address register `A`, so an
//! address taken from `A` is always in range. Cells 32-63 of the 64-cell
//! reference layout cannot be addressed through `A` and are not modelled.

use crate::binary::{Word5, Word8};
use serde::{Serialize, Deserialize};
use thiserror::Error;

/// The number of memory cells.
pub const MEMORY_SIZE: usize = Word5::COUNT;

/// Number of cells shown at once in the memory window.
pub const WINDOW_SIZE: usize = 4;

/// PaO memory: 32 eight-bit cells.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Memory {
    cells: Vec<Word8>,
}

impl Memory {
    /// Create a new memory with all cells zeroed.
    pub fn new() -> Self {
        Self {
            cells: vec![Word8::zero(); MEMORY_SIZE],
        }
    }

    /// Read the cell at an address.
    #[inline]
    pub fn read(&self, addr: Word5) -> Word8 {
        self.cells[addr.index()]
    }

    /// Write the cell at an address.
    #[inline]
    pub fn write(&mut self, addr: Word5, value: Word8) {
        self.cells[addr.index()] = value;
    }

    /// Read by plain index, for callers that do not hold an address word.
    pub fn get(&self, index: usize) -> Result<Word8, MemoryError> {
        self.cells
            .get(index)
            .copied()
            .ok_or(MemoryError::AddressOutOfRange(index))
    }

    /// Four consecutive cells starting at `base`.
    ///
    /// # Panics
    /// Panics if the window would run past the end of memory; the memory
    /// window never produces such a base.
    pub fn window(&self, base: usize) -> [Word8; WINDOW_SIZE] {
        assert!(
            base + WINDOW_SIZE <= MEMORY_SIZE,
            "memory window at {} runs past the last address {}",
            base, MEMORY_SIZE - 1
        );
        let mut out = [Word8::zero(); WINDOW_SIZE];
        out.copy_from_slice(&self.cells[base..base + WINDOW_SIZE]);
        out
    }

    /// Clear all memory to zeros.
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            *cell = Word8::zero();
        }
    }

    /// Load an image into memory starting at address 0. Cells past the
    /// image are cleared.
    pub fn load(&mut self, image: &[Word8]) -> Result<(), MemoryError> {
        if image.len() > MEMORY_SIZE {
            return Err(MemoryError::ImageTooLarge {
                size: image.len(),
                available: MEMORY_SIZE,
            });
        }

        self.clear();
        self.cells[..image.len()].copy_from_slice(image);
        Ok(())
    }

    /// All cells, address 0 first.
    pub fn cells(&self) -> &[Word8] {
        &self.cells
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Memory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let non_zero = self.cells.iter().filter(|cell| !cell.is_zero()).count();

        f.debug_struct("Memory")
            .field("non_zero_cells", &non_zero)
            .field("total_cells", &MEMORY_SIZE)
            .finish()
    }
}

/// Errors that can occur during memory operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoryError {
    #[error("memory address {0} out of range (0-31)")]
    AddressOutOfRange(usize),

    #[error("image size {size} exceeds memory size {available}")]
    ImageTooLarge { size: usize, available: usize },
}
