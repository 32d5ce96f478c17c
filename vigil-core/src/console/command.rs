//! Command parsing

use vigil_protocol::{SystemMode, ThresholdKind};

/// Records shown by `history` without a count
pub const DEFAULT_HISTORY_COUNT: u32 = 10;

/// A parsed console command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// List commands
    Help,
    /// Switch mode
    Mode(SystemMode),
    /// Print mode, readings and thresholds
    Status,
    /// Reboot
    Reset,
    /// Replace a threshold pair; range checks happen on execution
    Threshold {
        kind: ThresholdKind,
        low: i32,
        high: i32,
    },
    /// Print the most recent records
    History { count: u32 },
    /// Dump the log as CSV
    Export,
    /// Erase the log
    ClearHistory,
}

/// Rejected command line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// First word is not a command
    UnknownCommand,
    /// `mode` without a value in 0..=2
    InvalidMode,
    /// `threshold` followed by something other than `temp`/`humi`
    InvalidThresholdKind,
    /// `threshold <kind>` without two integers
    InvalidThresholdFormat(ThresholdKind),
    /// `history` with a non-numeric count
    InvalidHistory,
}

impl ParseError {
    /// Text printed after `[ERROR] `
    pub fn message(&self) -> &'static str {
        match self {
            ParseError::UnknownCommand => "Unknown command. Type 'help' for available commands",
            ParseError::InvalidMode => "Invalid mode. Use 0-2",
            ParseError::InvalidThresholdKind => "Invalid threshold type. Use 'temp' or 'humi'",
            ParseError::InvalidThresholdFormat(ThresholdKind::Temperature) => {
                "Invalid format. Use: threshold temp <low> <high>"
            }
            ParseError::InvalidThresholdFormat(ThresholdKind::Humidity) => {
                "Invalid format. Use: threshold humi <low> <high>"
            }
            ParseError::InvalidHistory => "Invalid history command. Use: history [count]",
        }
    }
}

impl Command {
    /// Parse one line
    ///
    /// Words are separated by whitespace. Trailing words a command does
    /// not take make the line invalid.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let mut words = line.split_whitespace();
        let name = words.next().ok_or(ParseError::UnknownCommand)?;

        let command = match name {
            "help" => Command::Help,
            "status" => Command::Status,
            "reset" => Command::Reset,
            "export" => Command::Export,
            "clear_history" => Command::ClearHistory,
            "mode" => {
                let mode = words
                    .next()
                    .and_then(|w| w.parse::<u8>().ok())
                    .and_then(SystemMode::from_byte)
                    .ok_or(ParseError::InvalidMode)?;
                if words.next().is_some() {
                    return Err(ParseError::InvalidMode);
                }
                Command::Mode(mode)
            }
            "threshold" => {
                let kind = match words.next() {
                    Some("temp") => ThresholdKind::Temperature,
                    Some("humi") => ThresholdKind::Humidity,
                    _ => return Err(ParseError::InvalidThresholdKind),
                };
                let format_error = ParseError::InvalidThresholdFormat(kind);
                let low = parse_int(words.next()).ok_or(format_error)?;
                let high = parse_int(words.next()).ok_or(format_error)?;
                if words.next().is_some() {
                    return Err(format_error);
                }
                Command::Threshold { kind, low, high }
            }
            "history" => {
                let count = match words.next() {
                    None => DEFAULT_HISTORY_COUNT,
                    Some(word) => match word.parse::<u32>() {
                        Ok(0) => DEFAULT_HISTORY_COUNT,
                        Ok(count) => count,
                        Err(_) => return Err(ParseError::InvalidHistory),
                    },
                };
                if words.next().is_some() {
                    return Err(ParseError::InvalidHistory);
                }
                Command::History { count }
            }
            _ => return Err(ParseError::UnknownCommand),
        };

        if matches!(
            command,
            Command::Help | Command::Status | Command::Reset | Command::Export | Command::ClearHistory
        ) && words.next().is_some()
        {
            return Err(ParseError::UnknownCommand);
        }
        Ok(command)
    }
}

fn parse_int(word: Option<&str>) -> Option<i32> {
    word?.parse().ok()
}
