//! Buzzer output
//!
//! Piezo buzzer driven through a transistor stage on a GPIO pin. The
//! stock board switches the buzzer on when the pin is pulled LOW.

use embedded_hal::digital::OutputPin;

/// GPIO buzzer
pub struct Buzzer<P> {
    pin: P,
    /// If true, buzzer ON = pin LOW
    inverted: bool,
    /// Current logical state (true = sounding)
    on: bool,
}

impl<P: OutputPin> Buzzer<P> {
    /// Create a buzzer and silence it
    ///
    /// # Arguments
    /// - `pin`: The GPIO pin to control
    /// - `inverted`: If true, the buzzer sounds when the pin is LOW
    pub fn new(pin: P, inverted: bool) -> Result<Self, P::Error> {
        let mut buzzer = Self {
            pin,
            inverted,
            on: false,
        };
        buzzer.set_on(false)?;
        Ok(buzzer)
    }

    /// Create a buzzer on an active-low stage
    pub fn new_active_low(pin: P) -> Result<Self, P::Error> {
        Self::new(pin, true)
    }

    /// Switch the buzzer on or off
    pub fn set_on(&mut self, on: bool) -> Result<(), P::Error> {
        if on != self.inverted {
            self.pin.set_high()?;
        } else {
            self.pin.set_low()?;
        }
        self.on = on;
        Ok(())
    }

    /// Whether the buzzer is sounding
    pub fn is_on(&self) -> bool {
        self.on
    }
}
