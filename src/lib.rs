//! # W Machine
//!
//! A control-unit simulator for the W teaching machine, the minimal
//! computer used to teach how a processor works one register transfer at
//! a time.
//!
//! The operator arms control signals on the front panel and fires a clock
//! pulse (TAKT); every armed signal then moves data between registers,
//! buses and memory together. Nothing happens between pulses, so each
//! microinstruction can be followed on the panel lamps.

pub mod binary;
pub mod machine;
pub mod io;
pub mod host;
pub mod script;
pub mod image;
pub mod config;

#[cfg(feature = "tui")]
pub mod tui;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-export commonly used types
pub use binary::{Word, Word5, Word8, WidthError};
pub use machine::{ControlUnit, MachineError, RegisterFileView, RegisterId, Rotation, Signal, SignalConflict, SignalSet};
pub use io::{DisplayProjector, InputAdapter};
pub use host::{Host, HostEvent, Mode};
pub use script::{Microinstruction, ScriptError};
pub use image::{load_image, parse_image, save_image, ImageError};
pub use config::{ConfigError, PanelConfig};

#[cfg(feature = "tui")]
pub use tui::run_panel;
