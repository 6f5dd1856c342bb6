//! Clock/execution engine for the machine.
//!
//! The operator arms signals one at a time; a clock pulse (TAKT) applies
//! every armed signal at once and disarms them all. Conflicts are refused
//! when a signal is armed, so a pulse never has anything to reject and
//! always applies in full.

use crate::binary::{arith, Word5, Word8};
use crate::machine::editor::{Editor, Rotation};
use crate::machine::memory::{Memory, MemoryError};
use crate::machine::registers::{BusActivity, Registers};
use crate::machine::signal::{Signal, SignalConflict, SignalSet};
use crate::machine::view::{InsertView, RegisterFileView, WindowView};
use serde::{Serialize, Deserialize};
use thiserror::Error;
use tracing::{event, Level};

/// Engine state. `Executing` only exists for the duration of a pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    /// The armed set may be changed.
    Idle,
    /// A pulse is applying the armed set.
    Executing,
}

/// What an accepted arm request did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Armed,
    Disarmed,
}

/// The control unit: register file, memory, armed signals and insert mode.
#[derive(Clone, Debug)]
pub struct ControlUnit {
    regs: Registers,
    mem: Memory,
    armed: SignalSet,
    state: EngineState,
    editor: Editor,
    rejected: Option<Signal>,
    /// Number of pulses that applied at least one signal.
    pulses: u64,
}

impl ControlUnit {
    /// Create a control unit with zeroed registers and memory.
    pub fn new() -> Self {
        Self::from_parts(Registers::new(), Memory::new())
    }

    /// Create a control unit with the given starting state.
    pub fn from_parts(regs: Registers, mem: Memory) -> Self {
        Self {
            regs,
            mem,
            armed: SignalSet::new(),
            state: EngineState::Idle,
            editor: Editor::new(),
            rejected: None,
            pulses: 0,
        }
    }

    /// Zero the registers, disarm everything and leave insert mode.
    /// Memory is kept.
    pub fn reset(&mut self) {
        self.regs.reset();
        self.armed.clear();
        self.state = EngineState::Idle;
        self.editor = Editor::new();
        self.rejected = None;
        self.pulses = 0;
    }

    /// Replace the memory contents with an image.
    pub fn load_memory(&mut self, image: &[Word8]) -> Result<(), MemoryError> {
        self.mem.load(image)
    }

    pub fn registers(&self) -> &Registers {
        &self.regs
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    pub fn armed(&self) -> SignalSet {
        self.armed
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn pulses(&self) -> u64 {
        self.pulses
    }

    /// Toggle a signal in the armed set.
    ///
    /// An armed signal is disarmed. Otherwise the signal is checked against
    /// every armed signal, in both directions, before it is added; on a
    /// clash nothing changes and the conflict is returned.
    pub fn arm_signal(&mut self, signal: Signal) -> Result<Toggle, SignalConflict> {
        debug_assert_eq!(self.state, EngineState::Idle);

        if self.armed.remove(signal) {
            self.rejected = None;
            event!(Level::DEBUG, %signal, "signal disarmed");
            return Ok(Toggle::Disarmed);
        }

        if let Some(armed) = self.armed.first_conflict(signal) {
            self.rejected = Some(signal);
            event!(Level::DEBUG, %signal, %armed, "signal conflicts with armed signal");
            return Err(SignalConflict { signal, armed });
        }

        self.armed.insert(signal);
        self.rejected = None;
        event!(Level::DEBUG, %signal, armed = %self.armed, "signal armed");
        Ok(Toggle::Armed)
    }

    /// Toggle a signal given by panel name.
    pub fn arm_by_name(&mut self, name: &str) -> Result<Toggle, MachineError> {
        let signal = Signal::from_name(name)
            .ok_or_else(|| MachineError::UnknownSignal(name.trim().to_string()))?;
        Ok(self.arm_signal(signal)?)
    }

    /// Clock pulse: apply every armed signal, then disarm them all.
    ///
    /// Returns the number of signals applied; an empty armed set is a no-op.
    pub fn pulse(&mut self) -> usize {
        self.rejected = None;
        if self.armed.is_empty() {
            return 0;
        }

        self.state = EngineState::Executing;
        let microinstruction = self.armed;
        for signal in microinstruction.execution_order() {
            self.execute(signal);
        }
        self.armed.clear();
        self.state = EngineState::Idle;
        self.pulses += 1;

        event!(
            Level::INFO,
            pulse = self.pulses,
            signals = %microinstruction,
            l = self.regs.l.value(),
            a = self.regs.a.value(),
            i = self.regs.i.value(),
            ak = self.regs.ak.value(),
            s = self.regs.s.value(),
            "clock pulse"
        );

        microinstruction.len()
    }

    /// Apply one poll of rotary input to insert mode or the memory window.
    pub fn tick_insert_mode(&mut self, rotation: Rotation, edit_edge: bool, edit_long_press: bool) {
        self.editor.tick(&mut self.regs, rotation, edit_edge, edit_long_press);
    }

    /// Hand the bus lamp requests to the caller and clear them.
    pub fn take_bus_activity(&mut self) -> BusActivity {
        self.regs.take_lit()
    }

    /// Copy out the current state for rendering.
    pub fn snapshot(&self) -> RegisterFileView {
        let window = self.editor.window();
        RegisterFileView {
            registers: self.regs.clone(),
            bus_lit: self.regs.lit,
            armed: self.armed.iter().collect(),
            rejected: self.rejected,
            insert: InsertView {
                enabled: self.editor.enabled(),
                selected: self.editor.cursor(),
            },
            window: WindowView {
                base: window.base(),
                cells: self.mem.window(window.base()),
            },
            memory: self.mem.cells().to_vec(),
            pulses: self.pulses,
        }
    }

    /// The register transfer of one signal.
    fn execute(&mut self, signal: Signal) {
        let regs = &mut self.regs;
        match signal {
            Signal::Il => {
                regs.l = arith::add(regs.l, Word5::truncate(1));
            }
            Signal::Wel => {
                regs.l = regs.bus_a;
            }
            Signal::Wyl => {
                regs.bus_a = regs.l;
                regs.lit.a = true;
            }
            Signal::Wyad => {
                regs.bus_a = arith::narrow(regs.i);
                regs.lit.a = true;
            }
            Signal::Wei => {
                regs.i = regs.bus_s;
            }
            Signal::Weak => {
                regs.ak = regs.jaml;
            }
            Signal::Dod => {
                regs.ak = arith::or(regs.ak, regs.jaml);
            }
            Signal::Ode => {
                regs.ak = arith::subtract(regs.ak, regs.jaml);
            }
            Signal::Przep => {
                regs.ak = regs.jaml;
            }
            Signal::Wyak => {
                regs.bus_s = regs.ak;
                regs.lit.s = true;
            }
            Signal::Weja => {
                regs.jaml = regs.bus_s;
            }
            Signal::Wea => {
                regs.a = regs.bus_a;
            }
            Signal::Czyt => {
                regs.s = self.mem.read(regs.a);
            }
            Signal::Pisz => {
                self.mem.write(regs.a, regs.s);
            }
            Signal::Wes | Signal::Wys => {
                regs.bus_s = regs.s;
                regs.lit.s = true;
            }
        }
    }
}

impl Default for ControlUnit {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors the control unit reports to its callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("unknown signal: {0}")]
    UnknownSignal(String),

    #[error(transparent)]
    Conflict(#[from] SignalConflict),
}
