//! Boundaries between the control unit and the physical panel.
//!
//! - [`input`] - button and rotary-control input, edge detection
//! - [`display`] - register displays, signal and bus lamps, memory window

pub mod input;
pub mod display;

pub use input::{InputAdapter, InputFrame, QueuedInput, Button, ButtonEdge, TAKT};
pub use display::{DisplayProjector, BusLamps, FrameBuffer, PanelFrame, project, DISPLAYED_REGISTERS};
