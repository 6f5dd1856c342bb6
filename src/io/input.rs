//! The input side of the panel.
//!
//! An [`InputAdapter`] reports what the operator is doing, already
//! debounced: which button is held (by name), how the rotary control
//! moved, and the state of the rotary control's push button. The host
//! acts only on button edges, so holding a button does nothing more than
//! pressing it once.

use crate::machine::{Rotation, Signal};
use std::collections::VecDeque;

/// Name of the clock-pulse button.
pub const TAKT: &str = "TAKT";

/// Source of operator input, polled once per host tick.
///
/// `pressed_token` is called first in each tick; the other three report
/// on the same tick.
pub trait InputAdapter {
    /// The button currently held down, if any.
    fn pressed_token(&mut self) -> Option<String>;

    /// Rotary movement since the last tick.
    fn rotation(&mut self) -> Rotation;

    /// The rotary push button was short-pressed (released before the
    /// long-press time).
    fn edit_button_edge(&mut self) -> bool;

    /// The rotary push button has just been held for the long-press time.
    fn edit_button_long_press(&mut self) -> bool;
}

/// What a panel button does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Takt,
    Signal(Signal),
}

impl Button {
    /// Decode a button token. Unknown tokens give `None`.
    pub fn decode(token: &str) -> Option<Button> {
        if token.trim().eq_ignore_ascii_case(TAKT) {
            return Some(Button::Takt);
        }
        Signal::from_name(token).map(Button::Signal)
    }
}

/// Rising-edge detector over successive button tokens.
#[derive(Debug, Clone, Default)]
pub struct ButtonEdge {
    last: Option<String>,
}

impl ButtonEdge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed this tick's token. Returns it only when it differs from the
    /// previous tick's token and is not a release.
    pub fn rising(&mut self, token: Option<String>) -> Option<String> {
        if token == self.last {
            return None;
        }
        self.last = token.clone();
        token
    }
}

/// One tick of input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub token: Option<String>,
    pub rotation: Rotation,
    pub edit_edge: bool,
    pub edit_long_press: bool,
}

/// An input adapter fed from a queue of frames.
///
/// Each `pressed_token` call moves to the next frame; once the queue is
/// empty every tick reads as idle. Keyboards, scripts and bindings push
/// frames here instead of sampling hardware.
#[derive(Debug, Clone, Default)]
pub struct QueuedInput {
    frames: VecDeque<InputFrame>,
    current: InputFrame,
}

impl QueuedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw frame.
    pub fn push(&mut self, frame: InputFrame) {
        self.frames.push_back(frame);
    }

    /// Queue a press and release of a button.
    pub fn press(&mut self, token: &str) {
        self.push(InputFrame {
            token: Some(token.to_string()),
            ..InputFrame::default()
        });
        self.push(InputFrame::default());
    }

    pub fn rotate(&mut self, rotation: Rotation) {
        self.push(InputFrame { rotation, ..InputFrame::default() });
    }

    pub fn short_press(&mut self) {
        self.push(InputFrame { edit_edge: true, ..InputFrame::default() });
    }

    pub fn long_press(&mut self) {
        self.push(InputFrame { edit_long_press: true, ..InputFrame::default() });
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every queued frame.
    pub fn clear(&mut self) {
        self.frames.clear();
        self.current = InputFrame::default();
    }
}

impl InputAdapter for QueuedInput {
    fn pressed_token(&mut self) -> Option<String> {
        self.current = self.frames.pop_front().unwrap_or_default();
        self.current.token.clone()
    }

    fn rotation(&mut self) -> Rotation {
        self.current.rotation
    }

    fn edit_button_edge(&mut self) -> bool {
        self.current.edit_edge
    }

    fn edit_button_long_press(&mut self) -> bool {
        self.current.edit_long_press
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode() {
        assert_eq!(Button::decode("TAKT"), Some(Button::Takt));
        assert_eq!(Button::decode("takt"), Some(Button::Takt));
        assert_eq!(Button::decode("WEJA"), Some(Button::Signal(Signal::Weja)));
        assert_eq!(Button::decode("STOP"), None);
    }

    #[test]
    fn test_edge_fires_once_per_press() {
        let mut edge = ButtonEdge::new();
        assert_eq!(edge.rising(Some("IL".into())), Some("IL".into()));
        assert_eq!(edge.rising(Some("IL".into())), None);
        assert_eq!(edge.rising(Some("IL".into())), None);
        assert_eq!(edge.rising(None), None);
        assert_eq!(edge.rising(Some("IL".into())), Some("IL".into()));
    }

    #[test]
    fn test_edge_on_direct_change() {
        let mut edge = ButtonEdge::new();
        edge.rising(Some("IL".into()));
        assert_eq!(edge.rising(Some("WEL".into())), Some("WEL".into()));
    }

    #[test]
    fn test_queued_input_press_releases() {
        let mut input = QueuedInput::new();
        input.press("IL");
        input.press("IL");
        let tokens: Vec<_> = (0..5).map(|_| input.pressed_token()).collect();
        assert_eq!(
            tokens,
            vec![Some("IL".into()), None, Some("IL".into()), None, None]
        );
    }

    #[test]
    fn test_queued_input_frame_fields() {
        let mut input = QueuedInput::new();
        input.rotate(Rotation::Down);
        input.long_press();

        assert_eq!(input.pressed_token(), None);
        assert_eq!(input.rotation(), Rotation::Down);
        assert!(!input.edit_button_long_press());

        input.pressed_token();
        assert_eq!(input.rotation(), Rotation::Idle);
        assert!(input.edit_button_long_press());
        assert!(input.is_empty());
    }
}
