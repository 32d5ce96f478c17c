//! Event record layout
//!
//! One sample of the sensors and alarm state, written to one slot of the
//! history log.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crc::{seal, verify, ChecksumMismatch};

/// Encoded record size in bytes
pub const RECORD_SIZE: usize = 10;

/// `ir_status` value when the PIR sensor sees motion
pub const IR_DETECTED: u8 = 0;

/// `ir_status` value when nothing is detected
pub const IR_CLEAR: u8 = 1;

/// Sensor/event record
///
/// Fields are stored opaquely: the log does not interpret the timestamp
/// or validate that `mode` is a known [`SystemMode`](crate::SystemMode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Record {
    /// Device-relative seconds from the RTC
    pub timestamp: u32,
    /// Temperature in °C
    pub temperature: u8,
    /// Relative humidity in %
    pub humidity: u8,
    /// System mode byte at the time of the sample
    pub mode: u8,
    /// [`IR_DETECTED`] or [`IR_CLEAR`]
    pub ir_status: u8,
}

impl Record {
    /// Encode into the on-flash layout with a trailing CRC
    pub fn encode(&self) -> [u8; RECORD_SIZE] {
        let mut buf = [0u8; RECORD_SIZE];
        buf[0..4].copy_from_slice(&self.timestamp.to_le_bytes());
        buf[4] = self.temperature;
        buf[5] = self.humidity;
        buf[6] = self.mode;
        buf[7] = self.ir_status;
        seal(&mut buf);
        buf
    }

    /// Decode a stored block
    ///
    /// Always unpacks the fields; the flag reports whether the stored
    /// checksum matched.
    pub fn decode(buf: &[u8; RECORD_SIZE]) -> (Self, bool) {
        let record = Self {
            timestamp: u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]),
            temperature: buf[4],
            humidity: buf[5],
            mode: buf[6],
            ir_status: buf[7],
        };
        (record, verify(buf).is_ok())
    }

    /// Decode a stored block, rejecting it on checksum mismatch
    pub fn decode_verified(buf: &[u8; RECORD_SIZE]) -> Result<Self, ChecksumMismatch> {
        verify(buf)?;
        Ok(Self::decode(buf).0)
    }

    /// Whether the IR sensor reported motion
    pub fn intrusion(&self) -> bool {
        self.ir_status == IR_DETECTED
    }
}
