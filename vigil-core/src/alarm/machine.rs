//! Alarm state machine
//!
//! ```text
//!            key press / `mode` command
//!   ┌───────┐        ┌──────┐        ┌───────┐
//!   │ ARMED │ ─────▶ │ HOME │ ─────▶ │ DEBUG │ ──┐
//!   └───────┘        └──────┘        └───────┘   │
//!       ▲                                        │
//!       └────────────────────────────────────────┘
//! ```
//!
//! - ARMED: motion raises the alarm once per detection and is logged;
//!   readings outside the threshold window beep on every step.
//! - HOME: motion is logged silently.
//! - DEBUG: nothing alarms.

use vigil_protocol::{SystemMode, ThresholdConfig};

use super::actions::{Action, Actions, Inputs, Notice};

/// Beep length for an alarm
pub const ALARM_BEEP_MS: u32 = 500;

/// Beep length acknowledging a mode change
pub const MODE_BEEP_MS: u32 = 100;

/// Alarm state
#[derive(Debug, Clone)]
pub struct AlarmMachine {
    mode: SystemMode,
    /// Current detection already handled
    motion_latched: bool,
    /// A reading was outside its window on the last armed step
    out_of_range: bool,
}

impl Default for AlarmMachine {
    fn default() -> Self {
        Self::new(SystemMode::Armed)
    }
}

impl AlarmMachine {
    /// Create a machine in `mode` with no alarm raised
    pub fn new(mode: SystemMode) -> Self {
        Self {
            mode,
            motion_latched: false,
            out_of_range: false,
        }
    }

    /// Current mode
    pub fn mode(&self) -> SystemMode {
        self.mode
    }

    /// Whether the alarm indicator is on
    ///
    /// In HOME this reflects an unacknowledged motion event.
    pub fn alarm_active(&self) -> bool {
        self.motion_latched || self.out_of_range
    }

    /// Switch to `mode`
    ///
    /// Silences the buzzer and gives a short acknowledgement beep. No-op
    /// if already in `mode`.
    pub fn set_mode(&mut self, mode: SystemMode) -> Actions {
        let mut actions = Actions::new();
        if mode == self.mode {
            return actions;
        }

        self.mode = mode;
        emit(&mut actions, Action::Silence);
        emit(&mut actions, Action::Beep { ms: MODE_BEEP_MS });
        emit(&mut actions, Action::Notify(Notice::ModeChanged(mode)));
        actions
    }

    /// Advance to the next mode in the key-press cycle
    pub fn cycle_mode(&mut self) -> Actions {
        self.set_mode(self.mode.next())
    }

    /// Evaluate one set of readings
    pub fn step(&mut self, inputs: &Inputs, thresholds: &ThresholdConfig) -> Actions {
        let mut actions = Actions::new();
        let was_active = self.alarm_active();

        match self.mode {
            SystemMode::Armed => {
                self.check_thresholds(inputs, thresholds, &mut actions);

                if inputs.ir_detected {
                    if !self.motion_latched {
                        self.motion_latched = true;
                        emit(&mut actions, Action::Beep { ms: ALARM_BEEP_MS });
                        emit(&mut actions, Action::Notify(Notice::Intrusion));
                        emit(&mut actions, Action::RecordEvent);
                    }
                } else if self.motion_latched {
                    self.motion_latched = false;
                    emit(&mut actions, Action::Silence);
                    emit(&mut actions, Action::Notify(Notice::AlarmStopped));
                }
            }
            SystemMode::Home => {
                self.out_of_range = false;

                if inputs.ir_detected {
                    if !self.motion_latched {
                        self.motion_latched = true;
                        emit(&mut actions, Action::Silence);
                        emit(&mut actions, Action::Notify(Notice::MotionDetected));
                        emit(&mut actions, Action::RecordEvent);
                    }
                } else {
                    self.motion_latched = false;
                }
            }
            SystemMode::Debug => {
                self.motion_latched = false;
                self.out_of_range = false;
            }
        }

        // Alarm just ended: make sure the buzzer is off
        if was_active && !self.alarm_active() && !actions.contains(&Action::Silence) {
            emit(&mut actions, Action::Silence);
        }
        actions
    }

    fn check_thresholds(
        &mut self,
        inputs: &Inputs,
        thresholds: &ThresholdConfig,
        actions: &mut Actions,
    ) {
        self.out_of_range = false;
        if !inputs.climate_sampled {
            return;
        }

        if !thresholds.temperature_ok(inputs.temperature) {
            self.out_of_range = true;
            emit(actions, Action::Beep { ms: ALARM_BEEP_MS });
            emit(
                actions,
                Action::Notify(Notice::TemperatureOutOfRange {
                    value: inputs.temperature,
                    low: thresholds.temp_low,
                    high: thresholds.temp_high,
                }),
            );
        }

        if !thresholds.humidity_ok(inputs.humidity) {
            self.out_of_range = true;
            emit(actions, Action::Beep { ms: ALARM_BEEP_MS });
            emit(
                actions,
                Action::Notify(Notice::HumidityOutOfRange {
                    value: inputs.humidity,
                    low: thresholds.humidity_low,
                    high: thresholds.humidity_high,
                }),
            );
        }
    }
}

/// Push an action; [`MAX_ACTIONS`](super::MAX_ACTIONS) covers the longest step
fn emit(actions: &mut Actions, action: Action) {
    let pushed = actions.push(action).is_ok();
    debug_assert!(pushed, "action list full");
}
