//! Serial command console
//!
//! Line-oriented text protocol on the UART:
//!
//! ```text
//! help                               list commands
//! mode <0-2>                         0 ARMED, 1 HOME, 2 DEBUG
//! status                             mode, readings, alarm, thresholds
//! reset                              reboot the controller
//! threshold temp|humi <low> <high>   0 <= low < high <= 100
//! history [count]                    last records, default 10
//! export                             every record as CSV
//! clear_history                      erase the event log
//! ```
//!
//! Replies are single lines tagged `[INFO]`, `[ERROR]`, `[STATUS]`,
//! `[HISTORY]` or `[EXPORT]`. Execution lives in
//! [`App::run_command`](crate::App::run_command).

mod command;
mod line;
pub(crate) mod report;

pub use command::{Command, ParseError, DEFAULT_HISTORY_COUNT};
pub use line::{Line, LineBuffer, LineEvent, LINE_CAPACITY};

use vigil_protocol::ThresholdError;

/// Result of executing one command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Outcome {
    /// Command executed
    Done,
    /// Line rejected; the error was reported on the console
    Rejected(ParseError),
    /// Threshold values refused; stored thresholds unchanged
    InvalidThresholds(ThresholdError),
    /// The caller must reset the MCU
    ResetRequested,
}
