//! Panel application state and the keyboard.

use crate::config::{ColorRole, PanelConfig, Rgb};
use crate::host::{Host, HostEvent, Mode};
use crate::io::{FrameBuffer, InputAdapter, QueuedInput, TAKT};
use crate::machine::{ControlUnit, Rotation, Signal};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::{Duration, Instant};
use tracing::{event, Level};

/// Keyboard keys for the 16 signal buttons.
pub const KEY_MAP: [(char, Signal); 16] = [
    ('q', Signal::Il),
    ('w', Signal::Wel),
    ('e', Signal::Wyl),
    ('r', Signal::Wyad),
    ('t', Signal::Wei),
    ('y', Signal::Weak),
    ('u', Signal::Dod),
    ('i', Signal::Ode),
    ('o', Signal::Przep),
    ('p', Signal::Wyak),
    ('a', Signal::Weja),
    ('s', Signal::Wea),
    ('d', Signal::Czyt),
    ('f', Signal::Pisz),
    ('g', Signal::Wes),
    ('h', Signal::Wys),
];

/// The key bound to a signal button.
pub fn key_for(signal: Signal) -> char {
    KEY_MAP[signal.index()].0
}

/// Keys that act on the application rather than the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Panel,
    ToggleMode,
    Reset,
    Quit,
    Unbound,
}

/// The keyboard as a panel: key presses become button and rotary frames.
#[derive(Debug, Default)]
pub struct KeyboardInput {
    queue: QueuedInput,
}

impl KeyboardInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, key: KeyEvent) -> KeyAction {
        if key.kind != KeyEventKind::Press {
            return KeyAction::Unbound;
        }

        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => KeyAction::Quit,
            KeyCode::Esc => KeyAction::Quit,
            KeyCode::F(2) => KeyAction::ToggleMode,
            KeyCode::Char('x') => KeyAction::Reset,
            KeyCode::Char(' ') => {
                self.queue.press(TAKT);
                KeyAction::Panel
            }
            KeyCode::Char(c) => match KEY_MAP.iter().find(|(k, _)| *k == c.to_ascii_lowercase()) {
                Some((_, signal)) => {
                    self.queue.press(signal.name());
                    KeyAction::Panel
                }
                None => KeyAction::Unbound,
            },
            KeyCode::Up | KeyCode::Right => {
                self.queue.rotate(Rotation::Up);
                KeyAction::Panel
            }
            KeyCode::Down | KeyCode::Left => {
                self.queue.rotate(Rotation::Down);
                KeyAction::Panel
            }
            KeyCode::Enter => {
                self.queue.short_press();
                KeyAction::Panel
            }
            KeyCode::Tab => {
                self.queue.long_press();
                KeyAction::Panel
            }
            _ => KeyAction::Unbound,
        }
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }
}

impl InputAdapter for KeyboardInput {
    fn pressed_token(&mut self) -> Option<String> {
        self.queue.pressed_token()
    }

    fn rotation(&mut self) -> Rotation {
        self.queue.rotation()
    }

    fn edit_button_edge(&mut self) -> bool {
        self.queue.edit_button_edge()
    }

    fn edit_button_long_press(&mut self) -> bool {
        self.queue.edit_button_long_press()
    }
}

/// Colours resolved once from the config.
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub signal_line: Rgb,
    pub display: Rgb,
    pub bus: Rgb,
}

impl Palette {
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            signal_line: config.color(ColorRole::SignalLine),
            display: config.color(ColorRole::Display),
            bus: config.color(ColorRole::Bus),
        }
    }
}

/// Panel application state.
pub struct PanelApp {
    pub host: Host,
    pub input: KeyboardInput,
    /// What the panel currently shows.
    pub frame: FrameBuffer,
    pub palette: Palette,
    pub status: String,
    pub should_quit: bool,
    blink: Duration,
    started: Instant,
}

impl PanelApp {
    pub fn new(config: &PanelConfig, unit: ControlUnit) -> Self {
        let host = Host::new(unit, config.bus_light());
        let mut frame = FrameBuffer::new();
        host.refresh(&mut frame, Duration::ZERO);

        Self {
            host,
            input: KeyboardInput::new(),
            frame,
            palette: Palette::from_config(config),
            status: "Ready. Arm signals with their keys, space pulses, Esc quits.".into(),
            should_quit: false,
            blink: config.blink(),
            started: Instant::now(),
        }
    }

    /// Time since the panel started.
    pub fn now(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.input.handle(key) {
            KeyAction::Quit => self.should_quit = true,
            KeyAction::ToggleMode => self.toggle_mode(),
            KeyAction::Reset => self.reset(),
            KeyAction::Panel | KeyAction::Unbound => {}
        }
    }

    /// One poll of the panel.
    pub fn tick(&mut self) {
        let now = self.now();
        if let Some(event) = self.host.tick(&mut self.input, &mut self.frame, now) {
            self.status = describe(&event);
        }
    }

    pub fn toggle_mode(&mut self) {
        let mode = self.host.mode().toggled();
        self.host.set_mode(mode);
        self.input.clear();
        self.status = match mode {
            Mode::Local => "Local mode: the panel drives the machine.".into(),
            Mode::Remote => "Remote mode: panel input is not processed.".into(),
        };
    }

    /// Clear registers and the armed set. Memory is kept.
    pub fn reset(&mut self) {
        self.host.unit_mut().reset();
        self.input.clear();
        let now = self.now();
        self.host.refresh(&mut self.frame, now);
        event!(Level::INFO, "panel reset");
        self.status = "Reset. Memory kept.".into();
    }

    /// Blink phase of the selected register display.
    pub fn blink_on(&self) -> bool {
        let period = self.blink.as_millis().max(1);
        (self.now().as_millis() / period) % 2 == 0
    }
}

fn describe(event: &HostEvent) -> String {
    match event {
        HostEvent::Pulsed(0) => "TAKT: nothing armed.".into(),
        HostEvent::Pulsed(n) => format!("TAKT: {} signal(s) executed.", n),
        HostEvent::Armed(s) => format!("{} armed.", s),
        HostEvent::Disarmed(s) => format!("{} disarmed.", s),
        HostEvent::Rejected(conflict) => format!("Refused: {}.", conflict),
        HostEvent::Ignored(token) => format!("Unknown button {}.", token),
    }
}

/// Run the terminal panel until the operator quits.
pub fn run_panel(config: &PanelConfig, unit: ControlUnit) -> std::io::Result<()> {
    use crossterm::{
        event::{self, Event},
        terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
        ExecutableCommand,
    };
    use ratatui::prelude::*;
    use std::io::stdout;

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut app = PanelApp::new(config, unit);
    event!(Level::INFO, "panel started");

    loop {
        terminal.draw(|frame| {
            super::ui::draw(frame, &app);
        })?;

        if event::poll(config.tick())? {
            if let Event::Key(key) = event::read()? {
                app.handle_key(key);
            }
        }

        app.tick();

        if app.should_quit {
            break;
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    event!(Level::INFO, pulses = app.host.unit().pulses(), "panel closed");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::machine::RegisterId;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app() -> PanelApp {
        let config = PanelConfig::default();
        let unit = config.build_unit().unwrap();
        PanelApp::new(&config, unit)
    }

    fn settle(app: &mut PanelApp) {
        for _ in 0..4 {
            app.tick();
        }
    }

    #[test]
    fn test_key_map_follows_catalog() {
        for signal in Signal::ALL {
            assert_eq!(KEY_MAP[signal.index()].1, signal);
        }
        assert_eq!(key_for(Signal::Czyt), 'd');
    }

    #[test]
    fn test_keys_arm_and_pulse() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('e'))); // WYL
        app.handle_key(key(KeyCode::Char('s'))); // WEA
        settle(&mut app);
        assert_eq!(app.frame.frame().signals.len(), 2);

        app.handle_key(key(KeyCode::Char('q'))); // IL
        app.handle_key(key(KeyCode::Char(' ')));
        settle(&mut app);

        assert!(app.host.unit().armed().is_empty());
        assert_eq!(app.frame.frame().display(RegisterId::L), Some(1));
        assert!(app.status.starts_with("TAKT"));
    }

    #[test]
    fn test_conflict_status() {
        let mut app = app();
        app.handle_key(key(KeyCode::Char('d'))); // CZYT
        app.handle_key(key(KeyCode::Char('f'))); // PISZ
        settle(&mut app);
        assert!(app.status.starts_with("Refused"));
        assert_eq!(app.frame.frame().rejected, Some(Signal::Pisz));
    }

    #[test]
    fn test_quit_keys() {
        let mut app = app();
        app.handle_key(key(KeyCode::Esc));
        assert!(app.should_quit);

        let mut app = self::app();
        app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }

    #[test]
    fn test_remote_mode_drops_input() {
        let mut app = app();
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(app.host.mode(), Mode::Remote);
        app.handle_key(key(KeyCode::Char('q')));
        settle(&mut app);
        assert!(app.host.unit().armed().is_empty());
    }

    #[test]
    fn test_reset_keeps_memory() {
        let mut app = app();
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Up));
        settle(&mut app);
        assert_eq!(app.host.unit().registers().a.value(), 1);

        app.handle_key(key(KeyCode::Char('x')));
        assert_eq!(app.frame.frame().display(RegisterId::A), Some(0));
        assert_eq!(app.host.unit().memory().cells()[0].value(), 1);
    }
}
