//! Alarm threshold configuration
//!
//! The only runtime-tunable settings: the temperature and humidity
//! window outside of which an armed system raises the alarm.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::crc::{seal, verify, ChecksumMismatch};

/// Encoded configuration size in bytes
pub const CONFIG_SIZE: usize = 6;

/// Largest accepted threshold value
pub const THRESHOLD_MAX: i32 = 100;

/// Which sensor a threshold pair applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ThresholdKind {
    /// Temperature in °C
    Temperature,
    /// Relative humidity in %
    Humidity,
}

impl ThresholdKind {
    /// Short name used by the console (`temp` / `humi`)
    pub fn keyword(self) -> &'static str {
        match self {
            ThresholdKind::Temperature => "temp",
            ThresholdKind::Humidity => "humi",
        }
    }
}

/// Rejected threshold update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ThresholdError {
    /// A value is below 0 or above 100
    OutOfRange,
    /// `low` is not strictly below `high`
    NotAscending,
}

/// Alarm window for temperature and humidity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ThresholdConfig {
    /// Minimum temperature (°C)
    pub temp_low: u8,
    /// Maximum temperature (°C)
    pub temp_high: u8,
    /// Minimum relative humidity (%)
    pub humidity_low: u8,
    /// Maximum relative humidity (%)
    pub humidity_high: u8,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            temp_low: 10,
            temp_high: 30,
            humidity_low: 30,
            humidity_high: 80,
        }
    }
}

impl ThresholdConfig {
    /// Encode into the on-flash layout with a trailing CRC
    pub fn encode(&self) -> [u8; CONFIG_SIZE] {
        let mut buf = [
            self.temp_low,
            self.temp_high,
            self.humidity_low,
            self.humidity_high,
            0,
            0,
        ];
        seal(&mut buf);
        buf
    }

    /// Decode a stored block; the flag reports whether the checksum matched
    pub fn decode(buf: &[u8; CONFIG_SIZE]) -> (Self, bool) {
        let config = Self {
            temp_low: buf[0],
            temp_high: buf[1],
            humidity_low: buf[2],
            humidity_high: buf[3],
        };
        (config, verify(buf).is_ok())
    }

    /// Decode a stored block, rejecting it on checksum mismatch
    pub fn decode_verified(buf: &[u8; CONFIG_SIZE]) -> Result<Self, ChecksumMismatch> {
        verify(buf)?;
        Ok(Self::decode(buf).0)
    }

    /// Current `(low, high)` pair for `kind`
    pub fn get(&self, kind: ThresholdKind) -> (u8, u8) {
        match kind {
            ThresholdKind::Temperature => (self.temp_low, self.temp_high),
            ThresholdKind::Humidity => (self.humidity_low, self.humidity_high),
        }
    }

    /// Replace the pair for `kind`
    ///
    /// Requires `0 <= low < high <= 100`. Leaves `self` untouched on error.
    pub fn set(&mut self, kind: ThresholdKind, low: i32, high: i32) -> Result<(), ThresholdError> {
        if !(0..=THRESHOLD_MAX).contains(&low) || !(0..=THRESHOLD_MAX).contains(&high) {
            return Err(ThresholdError::OutOfRange);
        }
        if low >= high {
            return Err(ThresholdError::NotAscending);
        }

        // Range-checked above
        let (low, high) = (low as u8, high as u8);
        match kind {
            ThresholdKind::Temperature => {
                self.temp_low = low;
                self.temp_high = high;
            }
            ThresholdKind::Humidity => {
                self.humidity_low = low;
                self.humidity_high = high;
            }
        }
        Ok(())
    }

    /// Whether `temperature` lies inside the inclusive window
    pub fn temperature_ok(&self, temperature: u8) -> bool {
        (self.temp_low..=self.temp_high).contains(&temperature)
    }

    /// Whether `humidity` lies inside the inclusive window
    pub fn humidity_ok(&self, humidity: u8) -> bool {
        (self.humidity_low..=self.humidity_high).contains(&humidity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_encoding() {
        assert_eq!(
            ThresholdConfig::default().encode(),
            [10, 30, 30, 80, 0x6A, 0x66]
        );
    }

    #[test]
    fn test_erased_block_is_invalid() {
        let (_, valid) = ThresholdConfig::decode(&[0xFF; CONFIG_SIZE]);
        assert!(!valid);
    }

    #[test]
    fn test_set_valid() {
        let mut config = ThresholdConfig::default();
        config.set(ThresholdKind::Temperature, 10, 50).unwrap();
        assert_eq!(config.get(ThresholdKind::Temperature), (10, 50));
        // Other pair untouched
        assert_eq!(config.get(ThresholdKind::Humidity), (30, 80));
    }

    #[test]
    fn test_set_rejects_descending() {
        let mut config = ThresholdConfig::default();
        assert_eq!(
            config.set(ThresholdKind::Temperature, 50, 10),
            Err(ThresholdError::NotAscending)
        );
        assert_eq!(
            config.set(ThresholdKind::Humidity, 40, 40),
            Err(ThresholdError::NotAscending)
        );
        assert_eq!(config, ThresholdConfig::default());
    }

    #[test]
    fn test_set_rejects_out_of_range() {
        let mut config = ThresholdConfig::default();
        assert_eq!(
            config.set(ThresholdKind::Humidity, -1, 50),
            Err(ThresholdError::OutOfRange)
        );
        assert_eq!(
            config.set(ThresholdKind::Humidity, 0, 101),
            Err(ThresholdError::OutOfRange)
        );
        config.set(ThresholdKind::Humidity, 0, 100).unwrap();
    }

    #[test]
    fn test_window_is_inclusive() {
        let config = ThresholdConfig::default();
        assert!(config.temperature_ok(10));
        assert!(config.temperature_ok(30));
        assert!(!config.temperature_ok(31));
        assert!(!config.humidity_ok(29));
    }

    proptest! {
        #[test]
        fn test_roundtrip(a in any::<u8>(), b in any::<u8>(), c in any::<u8>(), d in any::<u8>()) {
            let config = ThresholdConfig {
                temp_low: a,
                temp_high: b,
                humidity_low: c,
                humidity_high: d,
            };
            let (decoded, valid) = ThresholdConfig::decode(&config.encode());
            prop_assert!(valid);
            prop_assert_eq!(decoded, config);
        }

        #[test]
        fn test_single_bit_flip_detected(bit in 0usize..CONFIG_SIZE * 8) {
            let mut buf = ThresholdConfig::default().encode();
            buf[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(ThresholdConfig::decode_verified(&buf).is_err());
        }
    }
}
