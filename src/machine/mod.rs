//! Control-unit simulator for the W teaching machine.
//!
//! This module holds the whole logical machine:
//! - 32 eight-bit PaO memory cells addressed by `A`
//! - 5-bit registers L and A, 8-bit registers I, AK, S and JAML
//! - two buses (address and data)
//! - 16 control signals executed together on a clock pulse

pub mod memory;
pub mod registers;
pub mod signal;
pub mod editor;
pub mod view;
pub mod control;

pub use memory::{Memory, MemoryError, MEMORY_SIZE};
pub use registers::{Registers, RegisterId, EditableRegister, BusId, BusActivity};
pub use signal::{Signal, SignalSet, SignalConflict, Phase};
pub use editor::{Editor, MemoryWindow, Rotation};
pub use view::RegisterFileView;
pub use control::{ControlUnit, EngineState, MachineError, Toggle};
