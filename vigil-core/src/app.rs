//! Application context
//!
//! [`App`] owns everything the main loop mutates: storage, the alarm
//! machine, the thresholds and the latest sensor readings. The firmware
//! creates exactly one and drives it from a single task; interrupt
//! handlers only raise flags.
//!
//! Console output goes to any [`core::fmt::Write`]. Buzzer commands are
//! queued and collected with [`App::take_buzzer_actions`] so the core
//! never touches a pin.

use core::fmt::Write;

use vigil_hal::FlashDevice;
use vigil_protocol::{Record, SystemMode, ThresholdConfig, IR_CLEAR, IR_DETECTED};

use crate::alarm::{Action, Actions, AlarmMachine, Inputs};
use crate::console::{report, Command, Outcome};
use crate::error::{Error, StorageError};
use crate::storage::{Storage, StorageLayout};

/// Steps between `[DATA]` telemetry lines
pub const TELEMETRY_INTERVAL: u32 = 4;

/// Buzzer commands waiting for the firmware
pub const PENDING_ACTIONS: usize = 16;

/// Buzzer queue type
pub type BuzzerActions = heapless::Vec<Action, PENDING_ACTIONS>;

/// Latest sensor values
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Readings {
    /// Temperature in °C
    pub temperature: u8,
    /// Relative humidity in %
    pub humidity: u8,
    /// [`IR_DETECTED`] or [`IR_CLEAR`]
    pub ir_status: u8,
}

impl Default for Readings {
    fn default() -> Self {
        Self {
            temperature: 0,
            humidity: 0,
            ir_status: IR_CLEAR,
        }
    }
}

/// What [`App::boot`] found on the flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BootReport {
    /// No valid config block; defaults were written
    pub config_defaulted: bool,
    /// Slot the next record goes to
    pub next_index: u32,
    /// Records the log reports as present
    pub total_records: u32,
}

/// The controller state
pub struct App<F> {
    storage: Storage<F>,
    alarm: AlarmMachine,
    thresholds: ThresholdConfig,
    readings: Readings,
    /// [`App::update_readings`] has been called
    sampled: bool,
    /// Last timestamp passed to [`App::step`]
    now: u32,
    ticks: u32,
    buzzer: BuzzerActions,
}

impl<F: FlashDevice> App<F> {
    /// Open storage, load thresholds and print the boot banner
    ///
    /// A missing or damaged config block is replaced by the defaults,
    /// which are written back immediately.
    pub fn boot<W: Write>(
        flash: F,
        layout: StorageLayout,
        out: &mut W,
    ) -> Result<(Self, BootReport), Error> {
        let mut storage = Storage::open(flash, layout)?;

        let (thresholds, config_defaulted) = match storage.config().load() {
            Ok(config) => {
                report::info(out, "System configuration loaded from W25Q64")?;
                (config, false)
            }
            Err(StorageError::ChecksumMismatch(e)) => {
                log_warn!("app: config invalid ({:?}), writing defaults", e);
                let config = ThresholdConfig::default();
                storage.config().save(&config)?;
                report::info(out, "Default system configuration saved to W25Q64")?;
                (config, true)
            }
            Err(e) => return Err(e.into()),
        };

        let log = storage.log();
        let summary = BootReport {
            config_defaulted,
            next_index: log.next_index(),
            total_records: log.total_count(),
        };
        writeln!(out, "[INFO] Record index initialized: {}", summary.next_index)?;

        let alarm = AlarmMachine::default();
        report::info(out, "System Initialized")?;
        writeln!(out, "[MODE]{}", alarm.mode().label())?;

        log_info!("app: booted, {:?}", summary);
        Ok((
            Self {
                storage,
                alarm,
                thresholds,
                readings: Readings::default(),
                sampled: false,
                now: 0,
                ticks: 0,
                buzzer: BuzzerActions::new(),
            },
            summary,
        ))
    }

    /// Current mode
    pub fn mode(&self) -> SystemMode {
        self.alarm.mode()
    }

    /// Whether the alarm indicator is on
    pub fn alarm_active(&self) -> bool {
        self.alarm.alarm_active()
    }

    /// Thresholds in effect
    pub fn thresholds(&self) -> &ThresholdConfig {
        &self.thresholds
    }

    /// Latest readings
    pub fn readings(&self) -> &Readings {
        &self.readings
    }

    /// Underlying storage
    pub fn storage(&mut self) -> &mut Storage<F> {
        &mut self.storage
    }

    /// Store a new temperature/humidity sample
    pub fn update_readings(&mut self, temperature: u8, humidity: u8) {
        self.readings.temperature = temperature;
        self.readings.humidity = humidity;
        self.sampled = true;
    }

    /// Run one main-loop iteration of the alarm logic
    ///
    /// Logs a record when the machine asks for one, prints notices and
    /// emits telemetry every [`TELEMETRY_INTERVAL`] steps.
    pub fn step<W: Write>(&mut self, ir_status: u8, timestamp: u32, out: &mut W) -> Result<(), Error> {
        self.readings.ir_status = ir_status;
        self.now = timestamp;

        let inputs = Inputs {
            ir_detected: ir_status == IR_DETECTED,
            temperature: self.readings.temperature,
            humidity: self.readings.humidity,
            climate_sampled: self.sampled,
        };
        let actions = self.alarm.step(&inputs, &self.thresholds);
        self.apply(actions, out)?;

        self.ticks = self.ticks.wrapping_add(1);
        if self.ticks % TELEMETRY_INTERVAL == 0 {
            report::telemetry(out, &self.readings)?;
        }
        Ok(())
    }

    /// The mode key was pressed
    pub fn handle_key_press<W: Write>(&mut self, out: &mut W) -> Result<(), Error> {
        let actions = self.alarm.cycle_mode();
        self.apply(actions, out)
    }

    /// Parse and execute one console line
    ///
    /// Malformed lines and refused values are reported on `out` and
    /// returned as an [`Outcome`], not as an error. Errors mean the
    /// flash or the output sink failed.
    pub fn run_command<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Outcome, Error> {
        report::received(out, line)?;

        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                log_debug!("app: rejected command ({:?})", e);
                report::error(out, e.message())?;
                return Ok(Outcome::Rejected(e));
            }
        };

        match command {
            Command::Help => report::help(out)?,
            Command::Mode(mode) => {
                let actions = self.alarm.set_mode(mode);
                self.apply(actions, out)?;
                report::mode_switched(out, mode)?;
            }
            Command::Status => report::status(
                out,
                self.alarm.mode(),
                &self.readings,
                self.alarm.alarm_active(),
                &self.thresholds,
            )?,
            Command::Reset => {
                report::info(out, "System resetting...")?;
                return Ok(Outcome::ResetRequested);
            }
            Command::Threshold { kind, low, high } => {
                let mut updated = self.thresholds;
                if let Err(e) = updated.set(kind, low, high) {
                    report::threshold_rejected(out, kind)?;
                    return Ok(Outcome::InvalidThresholds(e));
                }
                self.storage.config().save(&updated)?;
                self.thresholds = updated;

                let (low, high) = updated.get(kind);
                report::threshold_set(out, kind, low, high)?;
            }
            Command::History { count } => self.print_history(count, out)?,
            Command::Export => self.export(out)?,
            Command::ClearHistory => {
                self.storage.log().clear_all()?;
                report::info(out, "All historical data cleared")?;
            }
        }
        Ok(Outcome::Done)
    }

    /// Drain queued buzzer commands, oldest first
    pub fn take_buzzer_actions(&mut self) -> BuzzerActions {
        core::mem::take(&mut self.buzzer)
    }

    fn apply<W: Write>(&mut self, actions: Actions, out: &mut W) -> Result<(), Error> {
        // Keep going after a failed append so notices still reach the console
        let mut result = Ok(());

        for action in actions {
            match action {
                Action::Beep { .. } | Action::Silence => {
                    if self.buzzer.push(action).is_err() {
                        log_warn!("app: buzzer queue full, dropping {:?}", action);
                    }
                }
                Action::RecordEvent => {
                    let record = Record {
                        timestamp: self.now,
                        temperature: self.readings.temperature,
                        humidity: self.readings.humidity,
                        mode: self.alarm.mode().to_byte(),
                        ir_status: self.readings.ir_status,
                    };
                    if let Err(e) = self.storage.log().append(&record) {
                        log_warn!("app: failed to log event ({:?})", e);
                        result = Err(e.into());
                    }
                }
                Action::Notify(notice) => report::notice(out, &notice)?,
            }
        }
        result
    }

    fn print_history<W: Write>(&mut self, count: u32, out: &mut W) -> Result<(), Error> {
        let mut log = self.storage.log();
        let slots = log.recent_slots(count);
        report::history_header(out, log.total_count(), slots.len() as u32)?;

        for slot in slots {
            let record = read_or_skip(log.read(slot))?;
            report::history_row(out, slot, record.as_ref())?;
        }
        Ok(())
    }

    fn export<W: Write>(&mut self, out: &mut W) -> Result<(), Error> {
        let mut log = self.storage.log();
        let total = log.total_count();
        report::export_header(out, total)?;

        for slot in 0..total {
            let record = read_or_skip(log.read(slot))?;
            report::export_row(out, slot, record.as_ref())?;
        }
        report::export_footer(out)?;
        Ok(())
    }
}

/// Turn a checksum failure into a placeholder row; anything else aborts
fn read_or_skip(result: Result<Record, StorageError>) -> Result<Option<Record>, StorageError> {
    match result {
        Ok(record) => Ok(Some(record)),
        Err(e) if e.is_checksum_mismatch() => Ok(None),
        Err(e) => Err(e),
    }
}
