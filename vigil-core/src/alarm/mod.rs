//! Alarm logic
//!
//! A pure state machine: it consumes sensor readings and mode changes
//! and returns [`Action`]s. Driving the buzzer, printing notices and
//! appending records is left to the caller.

mod actions;
mod machine;

pub use actions::{Action, Actions, Inputs, Notice, MAX_ACTIONS};
pub use machine::{AlarmMachine, ALARM_BEEP_MS, MODE_BEEP_MS};
