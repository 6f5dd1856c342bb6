//! The machine's register file.
//!
//! Address-class registers are 5 bits wide:
//! - L: program line counter
//! - A: memory address register
//! - busA: address bus
//!
//! Data-class registers are 8 bits wide:
//! - I: instruction register
//! - AK: accumulator
//! - S: memory data register
//! - JAML: ALU input register
//! - busS: data bus

use crate::binary::{Word5, Word8};
use crate::machine::editor::Rotation;
use serde::{Serialize, Deserialize};
use std::fmt;

/// Every register the machine holds, buses included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegisterId {
    L,
    A,
    BusA,
    I,
    Ak,
    S,
    Jaml,
    BusS,
}

impl RegisterId {
    pub const ALL: [RegisterId; 8] = [
        RegisterId::L,
        RegisterId::A,
        RegisterId::BusA,
        RegisterId::I,
        RegisterId::Ak,
        RegisterId::S,
        RegisterId::Jaml,
        RegisterId::BusS,
    ];

    /// Name as printed on the panel.
    pub const fn name(self) -> &'static str {
        match self {
            RegisterId::L => "L",
            RegisterId::A => "A",
            RegisterId::BusA => "busA",
            RegisterId::I => "I",
            RegisterId::Ak => "AK",
            RegisterId::S => "S",
            RegisterId::Jaml => "JAML",
            RegisterId::BusS => "busS",
        }
    }

    /// Width in bits.
    pub const fn width(self) -> u32 {
        match self {
            RegisterId::L | RegisterId::A | RegisterId::BusA => Word5::WIDTH,
            _ => Word8::WIDTH,
        }
    }
}

impl fmt::Display for RegisterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The registers an operator can edit with the rotary control, in
/// selection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EditableRegister {
    A,
    Ak,
    L,
    I,
    S,
}

impl EditableRegister {
    pub const ALL: [EditableRegister; 5] = [
        EditableRegister::A,
        EditableRegister::Ak,
        EditableRegister::L,
        EditableRegister::I,
        EditableRegister::S,
    ];

    /// The next register in the selection cycle (`S` wraps to `A`).
    pub const fn next(self) -> Self {
        match self {
            EditableRegister::A => EditableRegister::Ak,
            EditableRegister::Ak => EditableRegister::L,
            EditableRegister::L => EditableRegister::I,
            EditableRegister::I => EditableRegister::S,
            EditableRegister::S => EditableRegister::A,
        }
    }

    pub const fn id(self) -> RegisterId {
        match self {
            EditableRegister::A => RegisterId::A,
            EditableRegister::Ak => RegisterId::Ak,
            EditableRegister::L => RegisterId::L,
            EditableRegister::I => RegisterId::I,
            EditableRegister::S => RegisterId::S,
        }
    }
}

/// The two buses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BusId {
    /// Address bus (5 bits).
    A,
    /// Data bus (8 bits).
    S,
}

impl BusId {
    pub const ALL: [BusId; 2] = [BusId::A, BusId::S];
}

/// Which buses were driven since the flags were last taken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BusActivity {
    pub a: bool,
    pub s: bool,
}

impl BusActivity {
    pub fn get(&self, bus: BusId) -> bool {
        match bus {
            BusId::A => self.a,
            BusId::S => self.s,
        }
    }

    pub fn any(&self) -> bool {
        self.a || self.s
    }
}

/// The register file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registers {
    /// L: program line counter
    pub l: Word5,

    /// A: memory address register
    pub a: Word5,

    /// Address bus
    pub bus_a: Word5,

    /// I: instruction register
    pub i: Word8,

    /// AK: accumulator
    pub ak: Word8,

    /// S: memory data register
    pub s: Word8,

    /// JAML: ALU input register
    pub jaml: Word8,

    /// Data bus
    pub bus_s: Word8,

    /// Bus lamp requests raised by drive signals, not yet handed to the display.
    pub lit: BusActivity,
}

impl Registers {
    /// Create a new register file with all values zeroed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset all registers to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Read any register as a plain integer.
    pub fn get(&self, id: RegisterId) -> u8 {
        match id {
            RegisterId::L => self.l.value(),
            RegisterId::A => self.a.value(),
            RegisterId::BusA => self.bus_a.value(),
            RegisterId::I => self.i.value(),
            RegisterId::Ak => self.ak.value(),
            RegisterId::S => self.s.value(),
            RegisterId::Jaml => self.jaml.value(),
            RegisterId::BusS => self.bus_s.value(),
        }
    }

    /// Step an editable register up or down by one, wrapping at 0 and at
    /// its maximum.
    pub fn adjust(&mut self, reg: EditableRegister, rotation: Rotation) {
        fn step5(w: &mut Word5, rotation: Rotation) {
            *w = match rotation {
                Rotation::Up => w.wrapping_inc(),
                Rotation::Down => w.wrapping_dec(),
                Rotation::Idle => *w,
            };
        }
        fn step8(w: &mut Word8, rotation: Rotation) {
            *w = match rotation {
                Rotation::Up => w.wrapping_inc(),
                Rotation::Down => w.wrapping_dec(),
                Rotation::Idle => *w,
            };
        }

        match reg {
            EditableRegister::A => step5(&mut self.a, rotation),
            EditableRegister::L => step5(&mut self.l, rotation),
            EditableRegister::Ak => step8(&mut self.ak, rotation),
            EditableRegister::I => step8(&mut self.i, rotation),
            EditableRegister::S => step8(&mut self.s, rotation),
        }
    }

    /// Hand over the pending bus lamp requests and clear them.
    pub fn take_lit(&mut self) -> BusActivity {
        std::mem::take(&mut self.lit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_is_zeroed() {
        let regs = Registers::new();
        for id in RegisterId::ALL {
            assert_eq!(regs.get(id), 0, "{} should start at 0", id);
        }
        assert!(!regs.lit.any());
    }

    #[test]
    fn test_widths() {
        assert_eq!(RegisterId::L.width(), 5);
        assert_eq!(RegisterId::BusA.width(), 5);
        assert_eq!(RegisterId::Jaml.width(), 8);
        assert_eq!(RegisterId::BusS.width(), 8);
    }

    #[test]
    fn test_selection_cycle() {
        let mut reg = EditableRegister::A;
        let mut seen = Vec::new();
        for _ in 0..6 {
            seen.push(reg);
            reg = reg.next();
        }
        assert_eq!(
            seen,
            vec![
                EditableRegister::A,
                EditableRegister::Ak,
                EditableRegister::L,
                EditableRegister::I,
                EditableRegister::S,
                EditableRegister::A,
            ]
        );
    }

    #[test]
    fn test_adjust_wraps_data_register() {
        let mut regs = Registers::new();
        regs.adjust(EditableRegister::Ak, Rotation::Down);
        assert_eq!(regs.ak.value(), 255);
        regs.adjust(EditableRegister::Ak, Rotation::Up);
        assert_eq!(regs.ak.value(), 0);
    }

    #[test]
    fn test_adjust_wraps_address_register() {
        let mut regs = Registers::new();
        regs.adjust(EditableRegister::L, Rotation::Down);
        assert_eq!(regs.l.value(), 31);
        regs.adjust(EditableRegister::L, Rotation::Up);
        assert_eq!(regs.l.value(), 0);
        regs.adjust(EditableRegister::L, Rotation::Idle);
        assert_eq!(regs.l.value(), 0);
    }

    #[test]
    fn test_take_lit_clears() {
        let mut regs = Registers::new();
        regs.lit.s = true;
        let lit = regs.take_lit();
        assert!(lit.s && !lit.a);
        assert!(!regs.lit.any());
    }
}
