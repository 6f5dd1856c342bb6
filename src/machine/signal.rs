//! The control-signal catalog.
//!
//! The panel has 16 signal buttons. Each signal is one register transfer;
//! a microinstruction is the set of signals armed before a clock pulse.
//! Some signals may never be armed together: they would drive the same
//! bus twice, touch the same memory cell both ways, or select two ALU
//! functions.

use serde::{Serialize, Deserialize};
use std::fmt;
use thiserror::Error;

/// A control signal.
///
/// Declaration order is the catalog order used for display and for
/// ordering signals within one execution phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Signal {
    /// L := L + 1
    Il,
    /// L := busA
    Wel,
    /// busA := L
    Wyl,
    /// busA := I (low five bits)
    Wyad,
    /// I := busS
    Wei,
    /// AK := JAML
    Weak,
    /// AK := AK | JAML
    Dod,
    /// AK := AK - JAML
    Ode,
    /// AK := JAML
    Przep,
    /// busS := AK
    Wyak,
    /// JAML := busS
    Weja,
    /// A := busA
    Wea,
    /// S := PaO[A]
    Czyt,
    /// PaO[A] := S
    Pisz,
    /// busS := S
    Wes,
    /// busS := S
    Wys,
}

/// Execution phases of a clock pulse, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    /// Memory cell into S.
    MemoryRead,
    /// Registers onto the buses.
    Drive,
    /// Buses into registers.
    Latch,
    /// Accumulator operations.
    Alu,
    /// S into the memory cell.
    MemoryWrite,
    /// Line counter increment.
    Increment,
}

impl Phase {
    pub const ALL: [Phase; 6] = [
        Phase::MemoryRead,
        Phase::Drive,
        Phase::Latch,
        Phase::Alu,
        Phase::MemoryWrite,
        Phase::Increment,
    ];
}

impl Signal {
    /// All signals in catalog order.
    pub const ALL: [Signal; 16] = [
        Signal::Il,
        Signal::Wel,
        Signal::Wyl,
        Signal::Wyad,
        Signal::Wei,
        Signal::Weak,
        Signal::Dod,
        Signal::Ode,
        Signal::Przep,
        Signal::Wyak,
        Signal::Weja,
        Signal::Wea,
        Signal::Czyt,
        Signal::Pisz,
        Signal::Wes,
        Signal::Wys,
    ];

    /// Panel name of the signal.
    pub const fn name(self) -> &'static str {
        match self {
            Signal::Il => "IL",
            Signal::Wel => "WEL",
            Signal::Wyl => "WYL",
            Signal::Wyad => "WYAD",
            Signal::Wei => "WEI",
            Signal::Weak => "WEAK",
            Signal::Dod => "DOD",
            Signal::Ode => "ODE",
            Signal::Przep => "PRZEP",
            Signal::Wyak => "WYAK",
            Signal::Weja => "WEJA",
            Signal::Wea => "WEA",
            Signal::Czyt => "CZYT",
            Signal::Pisz => "PISZ",
            Signal::Wes => "WES",
            Signal::Wys => "WYS",
        }
    }

    /// Look a signal up by panel name, ignoring case.
    pub fn from_name(name: &str) -> Option<Signal> {
        let name = name.trim();
        Signal::ALL
            .into_iter()
            .find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// Position in the catalog.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Signals that may not be armed together with this one.
    pub const fn conflicts(self) -> &'static [Signal] {
        match self {
            Signal::Czyt => &[Signal::Pisz],
            Signal::Pisz => &[Signal::Czyt],

            Signal::Wyak => &[Signal::Wys],
            Signal::Wys => &[Signal::Wyak],

            Signal::Il => &[Signal::Wel],
            Signal::Wel => &[Signal::Il],

            Signal::Dod => &[Signal::Ode, Signal::Przep],
            Signal::Ode => &[Signal::Dod, Signal::Przep],
            Signal::Przep => &[Signal::Dod, Signal::Ode],

            Signal::Wyl => &[Signal::Wyad],
            Signal::Wyad => &[Signal::Wyl],

            Signal::Wei | Signal::Weak | Signal::Weja | Signal::Wea | Signal::Wes => &[],
        }
    }

    /// True if the two signals may not share a microinstruction.
    /// Checked in both directions.
    pub fn conflicts_with(self, other: Signal) -> bool {
        self.conflicts().contains(&other) || other.conflicts().contains(&self)
    }

    /// The phase of a clock pulse in which this signal runs.
    pub const fn phase(self) -> Phase {
        match self {
            Signal::Czyt => Phase::MemoryRead,
            Signal::Wyl | Signal::Wyad | Signal::Wyak | Signal::Wes | Signal::Wys => Phase::Drive,
            Signal::Wel | Signal::Wei | Signal::Wea | Signal::Weja => Phase::Latch,
            Signal::Dod | Signal::Ode | Signal::Przep | Signal::Weak => Phase::Alu,
            Signal::Pisz => Phase::MemoryWrite,
            Signal::Il => Phase::Increment,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A set of signals, one bit per catalog entry.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SignalSet {
    bits: u16,
}

impl SignalSet {
    pub const fn new() -> Self {
        Self { bits: 0 }
    }

    #[inline]
    pub const fn contains(&self, signal: Signal) -> bool {
        self.bits & (1 << signal.index()) != 0
    }

    /// Add a signal. Returns false if it was already present.
    pub fn insert(&mut self, signal: Signal) -> bool {
        let present = self.contains(signal);
        self.bits |= 1 << signal.index();
        !present
    }

    /// Remove a signal. Returns false if it was not present.
    pub fn remove(&mut self, signal: Signal) -> bool {
        let present = self.contains(signal);
        self.bits &= !(1 << signal.index());
        present
    }

    pub fn clear(&mut self) {
        self.bits = 0;
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub const fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Members in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        Signal::ALL.into_iter().filter(move |s| self.contains(*s))
    }

    /// Members in the order a clock pulse applies them: by phase, then by
    /// catalog order.
    pub fn execution_order(&self) -> impl Iterator<Item = Signal> + '_ {
        Phase::ALL
            .into_iter()
            .flat_map(move |phase| self.iter().filter(move |s| s.phase() == phase))
    }

    /// The first member that may not be armed together with `signal`.
    pub fn first_conflict(&self, signal: Signal) -> Option<Signal> {
        self.iter().find(|armed| armed.conflicts_with(signal))
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<T: IntoIterator<Item = Signal>>(iter: T) -> Self {
        let mut set = SignalSet::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

impl fmt::Debug for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for SignalSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for s in self.iter() {
            if !first {
                f.write_str(" ")?;
            }
            f.write_str(s.name())?;
            first = false;
        }
        Ok(())
    }
}

/// An arm request refused because it clashes with an armed signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("signal {signal} conflicts with armed signal {armed}")]
pub struct SignalConflict {
    /// The signal that was refused.
    pub signal: Signal,
    /// The armed signal it clashes with.
    pub armed: Signal,
}
