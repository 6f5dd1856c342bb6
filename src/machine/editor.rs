//! Insert mode and memory-window navigation.
//!
//! The rotary control does one of two jobs. With insert mode off it pages
//! the four-cell memory window; with insert mode on it edits the selected
//! register, and a short press of its button moves the selection along
//! `A -> AK -> L -> I -> S -> A`. A long press switches insert mode.

use crate::machine::memory::{MEMORY_SIZE, WINDOW_SIZE};
use crate::machine::registers::{EditableRegister, Registers};
use serde::{Serialize, Deserialize};
use tracing::{event, Level};

/// One poll's worth of rotary movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Idle,
    Up,
    Down,
}

/// The scrollable four-cell view into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MemoryWindow {
    base: usize,
}

impl MemoryWindow {
    /// Highest base address; the window ends on the last cell.
    pub const MAX_BASE: usize = MEMORY_SIZE - WINDOW_SIZE;

    pub const fn new() -> Self {
        Self { base: 0 }
    }

    /// Address of the first visible cell.
    pub const fn base(&self) -> usize {
        self.base
    }

    /// Move the window by one address, wrapping at both ends.
    pub fn scroll(&mut self, rotation: Rotation) {
        self.base = match rotation {
            Rotation::Idle => self.base,
            Rotation::Up if self.base < Self::MAX_BASE => self.base + 1,
            Rotation::Up => 0,
            Rotation::Down if self.base > 0 => self.base - 1,
            Rotation::Down => Self::MAX_BASE,
        };
    }
}

/// Insert-mode state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Editor {
    enabled: bool,
    cursor: EditableRegister,
    window: MemoryWindow,
}

impl Editor {
    pub const fn new() -> Self {
        Self {
            enabled: false,
            cursor: EditableRegister::A,
            window: MemoryWindow::new(),
        }
    }

    pub const fn enabled(&self) -> bool {
        self.enabled
    }

    /// The register the rotary control would edit.
    pub const fn cursor(&self) -> EditableRegister {
        self.cursor
    }

    pub const fn window(&self) -> MemoryWindow {
        self.window
    }

    /// The register to blink, if insert mode is on.
    pub fn blinking(&self) -> Option<EditableRegister> {
        self.enabled.then_some(self.cursor)
    }

    /// Apply one poll of rotary input.
    ///
    /// A long press toggles insert mode first; the rest of the tick then
    /// runs in the new mode. A short press that arrives together with a
    /// long press belongs to that long press and is not a selection step.
    pub fn tick(&mut self, regs: &mut Registers, rotation: Rotation, edge: bool, long_press: bool) {
        if long_press {
            self.enabled = !self.enabled;
            event!(Level::INFO, enabled = self.enabled, "insert mode toggled");
        }

        if self.enabled {
            if edge && !long_press {
                self.cursor = self.cursor.next();
                event!(Level::DEBUG, register = %self.cursor.id(), "insert cursor moved");
            }
            regs.adjust(self.cursor, rotation);
        } else {
            self.window.scroll(rotation);
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new()
    }
}
