//! Console output formatting
//!
//! Every function writes whole lines. Callers decide where they go.

use core::fmt::{self, Write};

use vigil_protocol::{Record, SystemMode, ThresholdConfig, ThresholdKind, IR_DETECTED};

use crate::alarm::Notice;
use crate::app::Readings;

const HELP: &[&str] = &[
    "Available commands:",
    "help - Show this help message",
    "mode <0-2> - Switch system mode (0:ARMED, 1:HOME, 2:DEBUG)",
    "status - Show system status",
    "reset - Reset the system",
    "threshold temp <low> <high> - Set temperature thresholds",
    "threshold humi <low> <high> - Set humidity thresholds",
    "history [count] - Show historical data records",
    "export - Export data records in CSV format",
    "clear_history - Clear all historical data",
];

fn unit(kind: ThresholdKind) -> &'static str {
    match kind {
        ThresholdKind::Temperature => "°C",
        ThresholdKind::Humidity => "%",
    }
}

pub(crate) fn help<W: Write>(out: &mut W) -> fmt::Result {
    for line in HELP {
        writeln!(out, "[HELP] {}", line)?;
    }
    Ok(())
}

pub(crate) fn received<W: Write>(out: &mut W, line: &str) -> fmt::Result {
    writeln!(out, "[INFO] Received command: {}", line)
}

pub(crate) fn info<W: Write>(out: &mut W, message: &str) -> fmt::Result {
    writeln!(out, "[INFO] {}", message)
}

pub(crate) fn error<W: Write>(out: &mut W, message: &str) -> fmt::Result {
    writeln!(out, "[ERROR] {}", message)
}

pub(crate) fn mode_switched<W: Write>(out: &mut W, mode: SystemMode) -> fmt::Result {
    writeln!(out, "[INFO] Mode switched to {}", mode.to_byte())
}

pub(crate) fn threshold_set<W: Write>(
    out: &mut W,
    kind: ThresholdKind,
    low: u8,
    high: u8,
) -> fmt::Result {
    let name = match kind {
        ThresholdKind::Temperature => "Temperature",
        ThresholdKind::Humidity => "Humidity",
    };
    writeln!(
        out,
        "[INFO] {} thresholds set to {}-{}{}",
        name,
        low,
        high,
        unit(kind)
    )
}

pub(crate) fn threshold_rejected<W: Write>(out: &mut W, kind: ThresholdKind) -> fmt::Result {
    let name = match kind {
        ThresholdKind::Temperature => "temperature",
        ThresholdKind::Humidity => "humidity",
    };
    writeln!(
        out,
        "[ERROR] Invalid {} thresholds. Use 0-100, low < high",
        name
    )
}

pub(crate) fn status<W: Write>(
    out: &mut W,
    mode: SystemMode,
    readings: &Readings,
    alarm_active: bool,
    thresholds: &ThresholdConfig,
) -> fmt::Result {
    writeln!(out, "[STATUS] Mode: {}", mode.label())?;
    writeln!(out, "[STATUS] Temperature: {}°C", readings.temperature)?;
    writeln!(out, "[STATUS] Humidity: {}%", readings.humidity)?;
    writeln!(
        out,
        "[STATUS] IR Status: {}",
        if readings.ir_status == IR_DETECTED {
            "DETECTED"
        } else {
            "CLEAR"
        }
    )?;
    writeln!(
        out,
        "[STATUS] Alarm Status: {}",
        if alarm_active { "ON" } else { "OFF" }
    )?;
    writeln!(
        out,
        "[STATUS] Temp Threshold: {}-{}°C",
        thresholds.temp_low, thresholds.temp_high
    )?;
    writeln!(
        out,
        "[STATUS] Humi Threshold: {}-{}%",
        thresholds.humidity_low, thresholds.humidity_high
    )
}

pub(crate) fn notice<W: Write>(out: &mut W, notice: &Notice) -> fmt::Result {
    match *notice {
        Notice::Intrusion => writeln!(out, "[ALARM]INTRUSION!"),
        Notice::MotionDetected => writeln!(out, "[INFO]Motion Detected"),
        Notice::AlarmStopped => writeln!(out, "[INFO]Alarm Stopped"),
        Notice::TemperatureOutOfRange { value, low, high } => writeln!(
            out,
            "[ALARM] Temperature out of range! Current: {}°C (Threshold: {}-{}°C)",
            value, low, high
        ),
        Notice::HumidityOutOfRange { value, low, high } => writeln!(
            out,
            "[ALARM] Humidity out of range! Current: {}% (Threshold: {}-{}%)",
            value, low, high
        ),
        Notice::ModeChanged(mode) => writeln!(out, "[MODE]{}", mode.label()),
    }
}

pub(crate) fn telemetry<W: Write>(out: &mut W, readings: &Readings) -> fmt::Result {
    writeln!(
        out,
        "[DATA]Temp:{},Humi:{},IR:{}",
        readings.temperature, readings.humidity, readings.ir_status
    )
}

pub(crate) fn history_header<W: Write>(out: &mut W, total: u32, showing: u32) -> fmt::Result {
    writeln!(
        out,
        "[HISTORY] Total records: {}, Showing: {}",
        total, showing
    )?;
    writeln!(out, "[HISTORY] Time | Temp | Humi | Mode | IR")?;
    writeln!(out, "[HISTORY] ---- | ---- | ---- | ---- | --")
}

/// One history row; `None` marks a slot that failed its checksum
pub(crate) fn history_row<W: Write>(
    out: &mut W,
    slot: u32,
    record: Option<&Record>,
) -> fmt::Result {
    match record {
        Some(r) => writeln!(
            out,
            "[HISTORY] {} | {:4} | {:4} | {:4} | {:2}",
            r.timestamp, r.temperature, r.humidity, r.mode, r.ir_status
        ),
        None => writeln!(out, "[HISTORY] {:4} | INVALID DATA", slot),
    }
}

pub(crate) fn export_header<W: Write>(out: &mut W, total: u32) -> fmt::Result {
    writeln!(out, "[EXPORT] CSV format data (Records: {})", total)?;
    writeln!(out, "Timestamp,Temperature,Humidity,Mode,IR_Status")
}

pub(crate) fn export_row<W: Write>(
    out: &mut W,
    slot: u32,
    record: Option<&Record>,
) -> fmt::Result {
    match record {
        Some(r) => writeln!(
            out,
            "{},{},{},{},{}",
            r.timestamp, r.temperature, r.humidity, r.mode, r.ir_status
        ),
        None => writeln!(out, "{},INVALID,INVALID,INVALID,INVALID", slot),
    }
}

pub(crate) fn export_footer<W: Write>(out: &mut W) -> fmt::Result {
    writeln!(out, "[EXPORT] Data export completed")
}

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::String;

    fn render(f: impl FnOnce(&mut String<256>) -> fmt::Result) -> String<256> {
        let mut out = String::new();
        f(&mut out).unwrap();
        out
    }

    #[test]
    fn test_history_rows() {
        let record = Record {
            timestamp: 1_700_000_000,
            temperature: 25,
            humidity: 60,
            mode: 0,
            ir_status: 0,
        };
        assert_eq!(
            render(|o| history_row(o, 3, Some(&record))).as_str(),
            "[HISTORY] 1700000000 |   25 |   60 |    0 |  0\n"
        );
        assert_eq!(
            render(|o| history_row(o, 3, None)).as_str(),
            "[HISTORY]    3 | INVALID DATA\n"
        );
    }

    #[test]
    fn test_export_rows() {
        let record = Record {
            timestamp: 42,
            temperature: 21,
            humidity: 55,
            mode: 1,
            ir_status: 1,
        };
        assert_eq!(
            render(|o| export_row(o, 0, Some(&record))).as_str(),
            "42,21,55,1,1\n"
        );
        assert_eq!(
            render(|o| export_row(o, 7, None)).as_str(),
            "7,INVALID,INVALID,INVALID,INVALID\n"
        );
    }

    #[test]
    fn test_notices() {
        assert_eq!(
            render(|o| notice(o, &Notice::Intrusion)).as_str(),
            "[ALARM]INTRUSION!\n"
        );
        assert_eq!(
            render(|o| notice(
                o,
                &Notice::HumidityOutOfRange {
                    value: 90,
                    low: 30,
                    high: 80
                }
            ))
            .as_str(),
            "[ALARM] Humidity out of range! Current: 90% (Threshold: 30-80%)\n"
        );
        assert_eq!(
            render(|o| notice(o, &Notice::ModeChanged(SystemMode::Debug))).as_str(),
            "[MODE]DEBUG\n"
        );
    }

    #[test]
    fn test_threshold_messages() {
        assert_eq!(
            render(|o| threshold_set(o, ThresholdKind::Temperature, 10, 50)).as_str(),
            "[INFO] Temperature thresholds set to 10-50°C\n"
        );
        assert_eq!(
            render(|o| threshold_rejected(o, ThresholdKind::Humidity)).as_str(),
            "[ERROR] Invalid humidity thresholds. Use 0-100, low < high\n"
        );
    }

    #[test]
    fn test_telemetry() {
        let readings = Readings {
            temperature: 23,
            humidity: 45,
            ir_status: 1,
        };
        assert_eq!(
            render(|o| telemetry(o, &readings)).as_str(),
            "[DATA]Temp:23,Humi:45,IR:1\n"
        );
    }
}
