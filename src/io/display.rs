//! The display side of the panel.
//!
//! A [`DisplayProjector`] stands for the lamps and digit displays. It only
//! ever receives values; nothing it does reaches back into the machine.
//! Calls accumulate until `commit`, which pushes the whole frame out at
//! once. The same vocabulary serves the local control unit and any remote
//! driver of the panel.

use crate::binary::Word8;
use crate::machine::memory::WINDOW_SIZE;
use crate::machine::{BusActivity, BusId, RegisterFileView, RegisterId, Signal};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

/// Registers with a digit display on the panel.
pub const DISPLAYED_REGISTERS: [RegisterId; 5] = [
    RegisterId::A,
    RegisterId::Ak,
    RegisterId::L,
    RegisterId::I,
    RegisterId::S,
];

/// Sink for panel output.
pub trait DisplayProjector {
    fn set_register_display(&mut self, register: RegisterId, value: u8);

    fn set_signal_indicator(&mut self, signal: Signal, on: bool);

    fn set_bus_indicator(&mut self, bus: BusId, on: bool);

    fn set_memory_window(&mut self, base: usize, cells: [Word8; WINDOW_SIZE]);

    /// Blink a register display for this frame.
    fn blink(&mut self, register: RegisterId);

    /// Show which signal was last refused, if any.
    fn set_conflict_indicator(&mut self, _rejected: Option<Signal>) {}

    /// Push all pending changes out.
    fn commit(&mut self);
}

/// Bus lamps: each lights for a fixed time after its bus is driven,
/// however long the value stays on the bus.
#[derive(Debug, Clone)]
pub struct BusLamps {
    duration: Duration,
    lit_at: [Option<Duration>; 2],
}

impl BusLamps {
    pub fn new(duration: Duration) -> Self {
        Self { duration, lit_at: [None; 2] }
    }

    fn slot(bus: BusId) -> usize {
        match bus {
            BusId::A => 0,
            BusId::S => 1,
        }
    }

    /// Restart the lamp of every bus driven in `activity`.
    pub fn activate(&mut self, activity: BusActivity, now: Duration) {
        for bus in BusId::ALL {
            if activity.get(bus) {
                self.lit_at[Self::slot(bus)] = Some(now);
            }
        }
    }

    pub fn is_lit(&self, bus: BusId, now: Duration) -> bool {
        self.lit_at[Self::slot(bus)]
            .map_or(false, |at| now.saturating_sub(at) < self.duration)
    }
}

/// Push one snapshot through a projector and commit it.
pub fn project<D: DisplayProjector + ?Sized>(
    view: &RegisterFileView,
    lamps: &BusLamps,
    now: Duration,
    display: &mut D,
) {
    for id in DISPLAYED_REGISTERS {
        display.set_register_display(id, view.register(id));
    }

    for signal in Signal::ALL {
        display.set_signal_indicator(signal, view.is_armed(signal));
    }

    for bus in BusId::ALL {
        display.set_bus_indicator(bus, lamps.is_lit(bus, now));
    }

    display.set_memory_window(view.window.base, view.window.cells);

    if let Some(id) = view.blinking() {
        display.blink(id);
    }

    display.set_conflict_indicator(view.rejected);
    display.commit();
}

/// Everything shown on the panel in one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PanelFrame {
    pub displays: BTreeMap<RegisterId, u8>,
    pub signals: BTreeSet<Signal>,
    pub bus_a: bool,
    pub bus_s: bool,
    pub window_base: usize,
    pub window: [Word8; WINDOW_SIZE],
    pub blinking: Option<RegisterId>,
    pub rejected: Option<Signal>,
}

impl PanelFrame {
    pub fn display(&self, id: RegisterId) -> Option<u8> {
        self.displays.get(&id).copied()
    }

    pub fn bus(&self, bus: BusId) -> bool {
        match bus {
            BusId::A => self.bus_a,
            BusId::S => self.bus_s,
        }
    }
}

/// A projector that keeps the last committed frame in memory, for
/// renderers that draw on their own schedule.
#[derive(Debug, Clone, Default)]
pub struct FrameBuffer {
    pending: PanelFrame,
    committed: PanelFrame,
    commits: u64,
}

impl FrameBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last committed frame.
    pub fn frame(&self) -> &PanelFrame {
        &self.committed
    }

    pub fn commits(&self) -> u64 {
        self.commits
    }
}

impl DisplayProjector for FrameBuffer {
    fn set_register_display(&mut self, register: RegisterId, value: u8) {
        self.pending.displays.insert(register, value);
    }

    fn set_signal_indicator(&mut self, signal: Signal, on: bool) {
        if on {
            self.pending.signals.insert(signal);
        } else {
            self.pending.signals.remove(&signal);
        }
    }

    fn set_bus_indicator(&mut self, bus: BusId, on: bool) {
        match bus {
            BusId::A => self.pending.bus_a = on,
            BusId::S => self.pending.bus_s = on,
        }
    }

    fn set_memory_window(&mut self, base: usize, cells: [Word8; WINDOW_SIZE]) {
        self.pending.window_base = base;
        self.pending.window = cells;
    }

    fn blink(&mut self, register: RegisterId) {
        self.pending.blinking = Some(register);
    }

    fn set_conflict_indicator(&mut self, rejected: Option<Signal>) {
        self.pending.rejected = rejected;
    }

    fn commit(&mut self) {
        self.committed = self.pending.clone();
        // Blinking is requested per frame.
        self.pending.blinking = None;
        self.commits += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::{ControlUnit, Rotation};

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn test_lamp_lights_for_fixed_time() {
        let mut lamps = BusLamps::new(400 * MS);
        lamps.activate(BusActivity { a: true, s: false }, 1000 * MS);

        assert!(lamps.is_lit(BusId::A, 1000 * MS));
        assert!(lamps.is_lit(BusId::A, 1399 * MS));
        assert!(!lamps.is_lit(BusId::A, 1400 * MS));
        assert!(!lamps.is_lit(BusId::S, 1000 * MS));
    }

    #[test]
    fn test_lamp_restarts_on_new_activity() {
        let mut lamps = BusLamps::new(400 * MS);
        lamps.activate(BusActivity { a: false, s: true }, 0 * MS);
        lamps.activate(BusActivity { a: false, s: true }, 300 * MS);
        assert!(lamps.is_lit(BusId::S, 600 * MS));
        lamps.activate(BusActivity::default(), 650 * MS);
        assert!(!lamps.is_lit(BusId::S, 700 * MS));
    }

    #[test]
    fn test_pending_changes_wait_for_commit() {
        let mut fb = FrameBuffer::new();
        fb.set_register_display(RegisterId::A, 3);
        assert_eq!(fb.frame().display(RegisterId::A), None);
        fb.commit();
        assert_eq!(fb.frame().display(RegisterId::A), Some(3));
        assert_eq!(fb.commits(), 1);
    }

    #[test]
    fn test_project_snapshot() {
        let mut unit = ControlUnit::new();
        unit.arm_signal(Signal::Il).unwrap();
        unit.arm_signal(Signal::Wyl).unwrap();
        unit.tick_insert_mode(Rotation::Idle, false, true);
        let lamps = BusLamps::new(400 * MS);
        let mut fb = FrameBuffer::new();

        project(&unit.snapshot(), &lamps, Duration::ZERO, &mut fb);

        let frame = fb.frame();
        assert_eq!(frame.displays.len(), 5);
        assert_eq!(frame.display(RegisterId::Jaml), None);
        assert_eq!(
            frame.signals.iter().copied().collect::<Vec<_>>(),
            vec![Signal::Il, Signal::Wyl]
        );
        assert_eq!(frame.blinking, Some(RegisterId::A));
        assert!(!frame.bus(BusId::A));
    }

    #[test]
    fn test_indicators_off_after_pulse() {
        let mut unit = ControlUnit::new();
        unit.arm_signal(Signal::Wyl).unwrap();
        let mut lamps = BusLamps::new(400 * MS);
        let mut fb = FrameBuffer::new();

        project(&unit.snapshot(), &lamps, Duration::ZERO, &mut fb);
        assert!(fb.frame().signals.contains(&Signal::Wyl));

        unit.pulse();
        lamps.activate(unit.take_bus_activity(), 10 * MS);
        project(&unit.snapshot(), &lamps, 20 * MS, &mut fb);

        assert!(fb.frame().signals.is_empty());
        assert!(fb.frame().bus(BusId::A));
        assert_eq!(fb.frame().blinking, None);
    }
}
