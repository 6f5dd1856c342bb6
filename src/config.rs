//! Panel configuration.
//!
//! Loaded from a JSON file; every field is optional:
//! ```json
//! {
//!   "colors": { "signal_line": "#ffaa00", "display": "#00ff40", "bus": "#3080ff" },
//!   "bus_light_ms": 400,
//!   "blink_ms": 300,
//!   "tick_ms": 20,
//!   "memory": [1, 2, 4, 8, 17, 34, 36, 56]
//! }
//! ```

use crate::binary::Word8;
use crate::machine::{ControlUnit, MemoryError, MEMORY_SIZE};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{event, Level};

/// Shown when a configured colour cannot be read.
pub const FALLBACK_COLOR: Rgb = Rgb { r: 0x88, g: 0x00, b: 0x11 };

/// PaO contents the panel starts with.
pub const DEFAULT_MEMORY: [u8; 8] = [1, 2, 4, 8, 17, 34, 36, 56];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    /// Parse `#rrggbb`.
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.strip_prefix('#')?;
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? })
    }
}

/// Which panel element a colour belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorRole {
    SignalLine,
    Display,
    Bus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Colors {
    pub signal_line: String,
    pub display: String,
    pub bus: String,
}

impl Default for Colors {
    fn default() -> Self {
        Self {
            signal_line: "#ffaa00".into(),
            display: "#00ff40".into(),
            bus: "#3080ff".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    pub colors: Colors,
    /// How long a bus lamp stays lit after the bus is driven.
    pub bus_light_ms: u64,
    /// Half-period of the insert-mode blink.
    pub blink_ms: u64,
    /// Poll interval of the panel loop.
    pub tick_ms: u64,
    /// Initial PaO cells, address 0 first.
    pub memory: Vec<u8>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            colors: Colors::default(),
            bus_light_ms: 400,
            blink_ms: 300,
            tick_ms: 20,
            memory: DEFAULT_MEMORY.to_vec(),
        }
    }
}

impl PanelConfig {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e.to_string()))?;
        let config = Self::from_json(&text)?;
        event!(Level::INFO, path = %path.as_ref().display(), "loaded panel config");
        Ok(config)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Colour of a panel element, or pink if the setting is unreadable.
    pub fn color(&self, role: ColorRole) -> Rgb {
        let hex = match role {
            ColorRole::SignalLine => &self.colors.signal_line,
            ColorRole::Display => &self.colors.display,
            ColorRole::Bus => &self.colors.bus,
        };
        Rgb::parse_hex(hex).unwrap_or_else(|| {
            event!(Level::WARN, ?role, color = %hex, "invalid colour, using fallback");
            FALLBACK_COLOR
        })
    }

    pub fn bus_light(&self) -> Duration {
        Duration::from_millis(self.bus_light_ms)
    }

    pub fn blink(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn initial_memory(&self) -> Result<Vec<Word8>, ConfigError> {
        if self.memory.len() > MEMORY_SIZE {
            return Err(ConfigError::Memory(MemoryError::ImageTooLarge {
                size: self.memory.len(),
                available: MEMORY_SIZE,
            }));
        }
        Ok(self.memory.iter().map(|&v| Word8::truncate(v)).collect())
    }

    /// A control unit with the configured memory loaded.
    pub fn build_unit(&self) -> Result<ControlUnit, ConfigError> {
        let mut unit = ControlUnit::new();
        unit.load_memory(&self.initial_memory()?)?;
        Ok(unit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("invalid config: {0}")]
    Parse(String),

    #[error(transparent)]
    Memory(#[from] MemoryError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!(Rgb::parse_hex("#ff8000"), Some(Rgb { r: 255, g: 128, b: 0 }));
        assert_eq!(Rgb::parse_hex("ff8000"), None);
        assert_eq!(Rgb::parse_hex("#ff80"), None);
        assert_eq!(Rgb::parse_hex("#gg0000"), None);
    }

    #[test]
    fn test_invalid_color_falls_back_to_pink() {
        let mut config = PanelConfig::default();
        config.colors.bus = "blue".into();
        assert_eq!(config.color(ColorRole::Bus), FALLBACK_COLOR);
        assert_ne!(config.color(ColorRole::Display), FALLBACK_COLOR);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = PanelConfig::from_json(r##"{ "tick_ms": 50, "colors": { "bus": "#010203" } }"##).unwrap();
        assert_eq!(config.tick(), Duration::from_millis(50));
        assert_eq!(config.bus_light_ms, 400);
        assert_eq!(config.colors.bus, "#010203");
        assert_eq!(config.colors.display, Colors::default().display);
        assert_eq!(config.memory, DEFAULT_MEMORY.to_vec());
    }

    #[test]
    fn test_json_round_trip() {
        let config = PanelConfig::default();
        assert_eq!(PanelConfig::from_json(&config.to_json()).unwrap(), config);
    }

    #[test]
    fn test_bad_json() {
        assert!(matches!(PanelConfig::from_json("{ tick_ms: }"), Err(ConfigError::Parse(_))));
        assert!(matches!(PanelConfig::from_json(r#"{ "memory": [300] }"#), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_build_unit_loads_memory() {
        let unit = PanelConfig::default().build_unit().unwrap();
        assert_eq!(unit.memory().cells()[4].value(), 17);
        assert_eq!(unit.memory().cells()[8].value(), 0);

        let config = PanelConfig { memory: vec![0; MEMORY_SIZE + 1], ..PanelConfig::default() };
        assert!(matches!(config.build_unit(), Err(ConfigError::Memory(_))));
    }
}
