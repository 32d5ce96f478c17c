//! System operating modes

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Operating mode of the security controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SystemMode {
    /// Intrusion triggers the alarm
    #[default]
    Armed,
    /// Motion is logged silently
    Home,
    /// Alarm output suppressed
    Debug,
}

// Wire format values
const MODE_ARMED: u8 = 0;
const MODE_HOME: u8 = 1;
const MODE_DEBUG: u8 = 2;

impl SystemMode {
    /// Parse a mode from its stored byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            MODE_ARMED => Some(SystemMode::Armed),
            MODE_HOME => Some(SystemMode::Home),
            MODE_DEBUG => Some(SystemMode::Debug),
            _ => None,
        }
    }

    /// Convert to stored byte
    pub fn to_byte(self) -> u8 {
        match self {
            SystemMode::Armed => MODE_ARMED,
            SystemMode::Home => MODE_HOME,
            SystemMode::Debug => MODE_DEBUG,
        }
    }

    /// Next mode in the key-press cycle: Armed → Home → Debug → Armed
    pub fn next(self) -> Self {
        match self {
            SystemMode::Armed => SystemMode::Home,
            SystemMode::Home => SystemMode::Debug,
            SystemMode::Debug => SystemMode::Armed,
        }
    }

    /// Upper-case label used on the console and display
    pub fn label(self) -> &'static str {
        match self {
            SystemMode::Armed => "ARMED",
            SystemMode::Home => "HOME",
            SystemMode::Debug => "DEBUG",
        }
    }
}
