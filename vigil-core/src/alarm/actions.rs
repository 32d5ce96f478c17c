//! Machine inputs and outputs

use vigil_protocol::SystemMode;

/// Most actions a single step can produce
pub const MAX_ACTIONS: usize = 8;

/// Actions produced by one call into the machine
pub type Actions = heapless::Vec<Action, MAX_ACTIONS>;

/// Sensor snapshot for one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Inputs {
    /// PIR sensor reports motion
    pub ir_detected: bool,
    /// Temperature in °C
    pub temperature: u8,
    /// Relative humidity in %
    pub humidity: u8,
    /// Temperature and humidity hold a real sample; thresholds are not
    /// checked until one arrives
    pub climate_sampled: bool,
}

/// Something to report on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Notice {
    /// Motion while armed
    Intrusion,
    /// Motion while at home
    MotionDetected,
    /// Intrusion alarm cleared
    AlarmStopped,
    /// Temperature outside the armed window
    TemperatureOutOfRange { value: u8, low: u8, high: u8 },
    /// Humidity outside the armed window
    HumidityOutOfRange { value: u8, low: u8, high: u8 },
    /// Mode switched
    ModeChanged(SystemMode),
}

/// Side effect requested by the machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Action {
    /// Sound the buzzer for `ms` milliseconds
    Beep { ms: u32 },
    /// Switch the buzzer off
    Silence,
    /// Append the current readings to the event log
    RecordEvent,
    /// Print a notice
    Notify(Notice),
}
