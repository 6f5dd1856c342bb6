//! Terminal front panel for the W machine.
//!
//! Shows the panel the way the hardware does:
//! - Register displays with the insert-mode cursor blinking
//! - The 16 signal lamps, lit while armed
//! - Bus lamps and the PaO memory window
//!
//! The keyboard stands in for the buttons and the rotary control.

mod app;
mod ui;

pub use app::{KeyboardInput, KeyAction, PanelApp, Palette, run_panel, key_for, KEY_MAP};
