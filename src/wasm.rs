//! WebAssembly bindings for the W machine.
//!
//! A browser front end drives the same [`Host`] poll loop as the terminal
//! panel: it queues button presses and rotary steps, calls `tick` from a
//! timer, and reads the committed panel frame back as JSON.

use wasm_bindgen::prelude::*;
use crate::host::{Host, HostEvent, Mode};
use crate::io::{FrameBuffer, QueuedInput};
use crate::machine::Rotation;
use crate::config::PanelConfig;
use crate::{image, script};
use std::time::Duration;

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

fn js_err<E: std::fmt::Display>(e: E) -> JsError {
    JsError::new(&e.to_string())
}

/// The panel and control unit, for JavaScript.
#[wasm_bindgen]
pub struct WasmMachine {
    host: Host,
    input: QueuedInput,
    frame: FrameBuffer,
    started_ms: f64,
}

#[wasm_bindgen]
impl WasmMachine {
    /// A machine with the default panel config.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<WasmMachine, JsError> {
        Self::with_config(&PanelConfig::default())
    }

    /// A machine configured from panel config JSON.
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<WasmMachine, JsError> {
        let config = PanelConfig::from_json(json).map_err(js_err)?;
        Self::with_config(&config)
    }

    fn with_config(config: &PanelConfig) -> Result<WasmMachine, JsError> {
        let unit = config.build_unit().map_err(js_err)?;
        let mut machine = Self {
            host: Host::new(unit, config.bus_light()),
            input: QueuedInput::new(),
            frame: FrameBuffer::new(),
            started_ms: js_sys::Date::now(),
        };
        machine.host.refresh(&mut machine.frame, Duration::ZERO);
        Ok(machine)
    }

    fn now(&self) -> Duration {
        let elapsed = (js_sys::Date::now() - self.started_ms).max(0.0);
        Duration::from_millis(elapsed as u64)
    }

    /// Queue a press and release of a panel button (`"TAKT"` or a signal).
    #[wasm_bindgen]
    pub fn press(&mut self, token: &str) {
        self.input.press(token);
    }

    /// Queue one rotary step: positive is up, negative is down.
    #[wasm_bindgen]
    pub fn rotate(&mut self, direction: i32) {
        let rotation = match direction.signum() {
            1 => Rotation::Up,
            -1 => Rotation::Down,
            _ => Rotation::Idle,
        };
        self.input.rotate(rotation);
    }

    #[wasm_bindgen]
    pub fn short_press(&mut self) {
        self.input.short_press();
    }

    #[wasm_bindgen]
    pub fn long_press(&mut self) {
        self.input.long_press();
    }

    /// One poll of the panel. Returns a description of what the buttons
    /// did, if anything.
    #[wasm_bindgen]
    pub fn tick(&mut self) -> Option<String> {
        let now = self.now();
        self.host
            .tick(&mut self.input, &mut self.frame, now)
            .map(|event| match event {
                HostEvent::Pulsed(n) => format!("pulse:{}", n),
                HostEvent::Armed(s) => format!("armed:{}", s),
                HostEvent::Disarmed(s) => format!("disarmed:{}", s),
                HostEvent::Rejected(conflict) => format!("rejected:{}", conflict),
                HostEvent::Ignored(token) => format!("ignored:{}", token),
            })
    }

    /// Hand the panel to a remote driver, or take it back.
    #[wasm_bindgen]
    pub fn set_remote(&mut self, remote: bool) {
        self.host.set_mode(if remote { Mode::Remote } else { Mode::Local });
        self.input.clear();
    }

    /// Clear registers and the armed set. Memory is kept.
    #[wasm_bindgen]
    pub fn reset(&mut self) {
        self.host.unit_mut().reset();
        self.input.clear();
        let now = self.now();
        self.host.refresh(&mut self.frame, now);
    }

    /// Load memory from image text.
    #[wasm_bindgen]
    pub fn load_image(&mut self, text: &str) -> Result<usize, JsError> {
        let cells = image::parse_image(text).map_err(js_err)?;
        self.host.unit_mut().load_memory(&cells).map_err(js_err)?;
        let now = self.now();
        self.host.refresh(&mut self.frame, now);
        Ok(cells.len())
    }

    /// Run a microprogram script. Returns the number of pulses.
    #[wasm_bindgen]
    pub fn run_script(&mut self, source: &str) -> Result<usize, JsError> {
        let program = script::parse(source).map_err(js_err)?;
        let pulses = script::run(self.host.unit_mut(), &program).map_err(js_err)?;
        let now = self.now();
        self.host.refresh(&mut self.frame, now);
        Ok(pulses)
    }

    #[wasm_bindgen]
    pub fn pulses(&self) -> u64 {
        self.host.unit().pulses()
    }

    /// The last committed panel frame as JSON.
    #[wasm_bindgen]
    pub fn frame_json(&self) -> Result<String, JsError> {
        serde_json::to_string(self.frame.frame()).map_err(js_err)
    }

    /// The full machine state as JSON.
    #[wasm_bindgen]
    pub fn snapshot_json(&self) -> Result<String, JsError> {
        serde_json::to_string(&self.host.unit().snapshot()).map_err(js_err)
    }
}

/// Check a microprogram script. Returns the number of microinstructions.
#[wasm_bindgen]
pub fn wasm_check_script(source: &str) -> Result<usize, JsError> {
    script::parse(source).map(|p| p.len()).map_err(js_err)
}
