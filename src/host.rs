//! The poll loop that ties the panel to the control unit.
//!
//! A [`Host`] owns the single [`ControlUnit`] for the life of the program.
//! Each [`Host::tick`] reads the input adapter once, acts on button edges,
//! feeds the rotary control to insert mode, and projects the new state.
//! Time is passed in as a [`Duration`] since start so the same loop runs
//! under a terminal, a test, or a browser.

use crate::io::{project, Button, ButtonEdge, BusLamps, DisplayProjector, InputAdapter};
use crate::machine::{ControlUnit, Signal, SignalConflict, Toggle};
use std::time::Duration;
use tracing::{event, Level};

/// Who drives the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// The local control unit reads the buttons and drives the displays.
    #[default]
    Local,
    /// An external driver owns the panel; the control unit is left alone.
    Remote,
}

impl Mode {
    pub fn toggled(self) -> Mode {
        match self {
            Mode::Local => Mode::Remote,
            Mode::Remote => Mode::Local,
        }
    }
}

/// What a tick did with the button input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// TAKT fired; carries the number of signals applied.
    Pulsed(usize),
    Armed(Signal),
    Disarmed(Signal),
    Rejected(SignalConflict),
    /// A button token that names nothing on the panel.
    Ignored(String),
}

/// Owner of the control unit and the panel state around it.
#[derive(Debug, Clone)]
pub struct Host {
    unit: ControlUnit,
    edge: ButtonEdge,
    lamps: BusLamps,
    mode: Mode,
}

impl Host {
    pub fn new(unit: ControlUnit, bus_light: Duration) -> Self {
        Self {
            unit,
            edge: ButtonEdge::new(),
            lamps: BusLamps::new(bus_light),
            mode: Mode::Local,
        }
    }

    pub fn unit(&self) -> &ControlUnit {
        &self.unit
    }

    pub fn unit_mut(&mut self) -> &mut ControlUnit {
        &mut self.unit
    }

    pub fn lamps(&self) -> &BusLamps {
        &self.lamps
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        if mode != self.mode {
            event!(Level::INFO, ?mode, "panel mode changed");
            // A button held across the switch must not fire afterwards.
            self.edge = ButtonEdge::new();
            self.mode = mode;
        }
    }

    /// One poll of the panel.
    ///
    /// Only a rising edge of the button token acts. In remote mode nothing
    /// is read or projected.
    pub fn tick<I, D>(&mut self, input: &mut I, display: &mut D, now: Duration) -> Option<HostEvent>
    where
        I: InputAdapter + ?Sized,
        D: DisplayProjector + ?Sized,
    {
        if self.mode == Mode::Remote {
            return None;
        }

        let event = self
            .edge
            .rising(input.pressed_token())
            .map(|token| self.press(&token));

        let rotation = input.rotation();
        let edit_edge = input.edit_button_edge();
        let long_press = input.edit_button_long_press();
        self.unit.tick_insert_mode(rotation, edit_edge, long_press);

        self.lamps.activate(self.unit.take_bus_activity(), now);
        self.refresh(display, now);

        event
    }

    /// Project the current state without reading input.
    pub fn refresh<D: DisplayProjector + ?Sized>(&self, display: &mut D, now: Duration) {
        project(&self.unit.snapshot(), &self.lamps, now, display);
    }

    fn press(&mut self, token: &str) -> HostEvent {
        match Button::decode(token) {
            Some(Button::Takt) => HostEvent::Pulsed(self.unit.pulse()),
            Some(Button::Signal(signal)) => match self.unit.arm_signal(signal) {
                Ok(Toggle::Armed) => HostEvent::Armed(signal),
                Ok(Toggle::Disarmed) => HostEvent::Disarmed(signal),
                Err(conflict) => HostEvent::Rejected(conflict),
            },
            None => {
                event!(Level::WARN, token, "unrecognized button");
                HostEvent::Ignored(token.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{FrameBuffer, InputFrame, QueuedInput};
    use crate::machine::{BusId, RegisterId, Rotation};

    const MS: Duration = Duration::from_millis(1);

    fn host() -> Host {
        Host::new(ControlUnit::new(), 400 * MS)
    }

    fn held(token: &str) -> InputFrame {
        InputFrame { token: Some(token.to_string()), ..InputFrame::default() }
    }

    #[test]
    fn test_held_button_fires_once() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        for _ in 0..3 {
            input.push(held("IL"));
        }

        assert_eq!(host.tick(&mut input, &mut fb, Duration::ZERO), Some(HostEvent::Armed(Signal::Il)));
        assert_eq!(host.tick(&mut input, &mut fb, 20 * MS), None);
        assert_eq!(host.tick(&mut input, &mut fb, 40 * MS), None);
        assert!(host.unit().armed().contains(Signal::Il));
    }

    #[test]
    fn test_press_twice_disarms() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        input.press("WYL");
        input.press("WYL");

        let events: Vec<_> = (0..4)
            .filter_map(|_| host.tick(&mut input, &mut fb, Duration::ZERO))
            .collect();
        assert_eq!(events, vec![HostEvent::Armed(Signal::Wyl), HostEvent::Disarmed(Signal::Wyl)]);
        assert!(host.unit().armed().is_empty());
    }

    #[test]
    fn test_takt_pulses_and_lights_bus() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        input.press("WYL");
        input.press("WEA");
        input.press("TAKT");

        let mut last = None;
        for i in 0..6 {
            if let Some(e) = host.tick(&mut input, &mut fb, i * 20 * MS) {
                last = Some(e);
            }
        }

        assert_eq!(last, Some(HostEvent::Pulsed(2)));
        assert!(fb.frame().signals.is_empty());
        assert!(fb.frame().bus(BusId::A));
        assert!(!fb.frame().bus(BusId::S));

        // The lamp goes dark after its light time even with no input.
        host.tick(&mut input, &mut fb, 1000 * MS);
        assert!(!fb.frame().bus(BusId::A));
    }

    #[test]
    fn test_conflict_reported_and_shown() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        input.press("CZYT");
        input.press("PISZ");

        host.tick(&mut input, &mut fb, Duration::ZERO);
        host.tick(&mut input, &mut fb, Duration::ZERO);
        let event = host.tick(&mut input, &mut fb, Duration::ZERO);

        assert_eq!(
            event,
            Some(HostEvent::Rejected(SignalConflict { signal: Signal::Pisz, armed: Signal::Czyt }))
        );
        assert_eq!(fb.frame().rejected, Some(Signal::Pisz));
        assert!(fb.frame().signals.contains(&Signal::Czyt));
    }

    #[test]
    fn test_unknown_token_ignored() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        input.press("STOP");

        let event = host.tick(&mut input, &mut fb, Duration::ZERO);
        assert_eq!(event, Some(HostEvent::Ignored("STOP".into())));
        assert!(host.unit().armed().is_empty());
    }

    #[test]
    fn test_rotation_reaches_insert_mode() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        input.long_press();
        input.rotate(Rotation::Up);
        input.rotate(Rotation::Up);

        for _ in 0..3 {
            host.tick(&mut input, &mut fb, Duration::ZERO);
        }

        assert_eq!(host.unit().registers().a.value(), 2);
        assert_eq!(fb.frame().display(RegisterId::A), Some(2));
        assert_eq!(fb.frame().blinking, Some(RegisterId::A));
    }

    #[test]
    fn test_remote_mode_leaves_core_alone() {
        let mut host = host();
        let mut input = QueuedInput::new();
        let mut fb = FrameBuffer::new();
        host.set_mode(Mode::Remote);
        input.press("IL");

        assert_eq!(host.tick(&mut input, &mut fb, Duration::ZERO), None);
        assert!(host.unit().armed().is_empty());
        assert_eq!(fb.commits(), 0);
        // The remote tick did not consume the frame.
        assert!(!input.is_empty());

        host.set_mode(Mode::Local);
        assert_eq!(host.tick(&mut input, &mut fb, Duration::ZERO), Some(HostEvent::Armed(Signal::Il)));
    }
}
