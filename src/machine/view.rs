//! Read-only snapshot of the machine for rendering.

use crate::binary::Word8;
use crate::machine::memory::WINDOW_SIZE;
use crate::machine::registers::{BusActivity, EditableRegister, RegisterId, Registers};
use crate::machine::signal::Signal;
use serde::{Serialize, Deserialize};

/// Insert-mode part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsertView {
    pub enabled: bool,
    pub selected: EditableRegister,
}

/// Memory-window part of a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowView {
    pub base: usize,
    pub cells: [Word8; WINDOW_SIZE],
}

/// Everything a display needs, copied out of the control unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterFileView {
    pub registers: Registers,
    /// Bus lamp requests not yet taken by the host.
    pub bus_lit: BusActivity,
    /// Armed signals in catalog order.
    pub armed: Vec<Signal>,
    /// Last refused signal, until the next successful arm or pulse.
    pub rejected: Option<Signal>,
    pub insert: InsertView,
    pub window: WindowView,
    pub memory: Vec<Word8>,
    pub pulses: u64,
}

impl RegisterFileView {
    pub fn register(&self, id: RegisterId) -> u8 {
        self.registers.get(id)
    }

    pub fn is_armed(&self, signal: Signal) -> bool {
        self.armed.contains(&signal)
    }

    /// The register to blink, if insert mode is on.
    pub fn blinking(&self) -> Option<RegisterId> {
        self.insert.enabled.then_some(self.insert.selected.id())
    }
}
