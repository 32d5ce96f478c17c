//! PIR presence sensor
//!
//! HC-SR501 style module with a digital output. On the stock board the
//! input has a pull-up and the module pulls it LOW on motion.

use embedded_hal::digital::InputPin;
use vigil_protocol::{IR_CLEAR, IR_DETECTED};

/// Digital PIR sensor
pub struct IrSensor<P> {
    pin: P,
    /// If true, motion = pin LOW
    active_low: bool,
}

impl<P: InputPin> IrSensor<P> {
    /// Create a sensor with the given polarity
    pub fn new(pin: P, active_low: bool) -> Self {
        Self { pin, active_low }
    }

    /// Create a sensor that reports motion by pulling the line low
    pub fn new_active_low(pin: P) -> Self {
        Self::new(pin, true)
    }

    /// Whether motion is currently reported
    pub fn detected(&mut self) -> Result<bool, P::Error> {
        let low = self.pin.is_low()?;
        Ok(low == self.active_low)
    }

    /// Current state as a record `ir_status` byte
    pub fn status(&mut self) -> Result<u8, P::Error> {
        Ok(if self.detected()? {
            IR_DETECTED
        } else {
            IR_CLEAR
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::convert::Infallible;

    struct MockPin {
        high: bool,
    }

    impl embedded_hal::digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl InputPin for MockPin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.high)
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.high)
        }
    }

    #[test]
    fn test_active_low_sensor() {
        let mut sensor = IrSensor::new_active_low(MockPin { high: true });
        assert!(!sensor.detected().unwrap());
        assert_eq!(sensor.status().unwrap(), IR_CLEAR);

        sensor.pin.high = false;
        assert!(sensor.detected().unwrap());
        assert_eq!(sensor.status().unwrap(), IR_DETECTED);
    }

    #[test]
    fn test_active_high_sensor() {
        let mut sensor = IrSensor::new(MockPin { high: true }, false);
        assert_eq!(sensor.status().unwrap(), IR_DETECTED);
    }
}
