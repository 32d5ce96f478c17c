//! Interrupt-to-main-loop event flag

use portable_atomic::{AtomicBool, Ordering};

/// One-bit mailbox between an interrupt (or task) and the main loop
///
/// Raising an already raised flag is idempotent: events that arrive
/// before the consumer takes the flag collapse into one.
///
/// ```
/// use vigil_core::signal::EventFlag;
///
/// static KEY_PRESSED: EventFlag = EventFlag::new();
///
/// KEY_PRESSED.raise();
/// assert!(KEY_PRESSED.take());
/// assert!(!KEY_PRESSED.take());
/// ```
#[derive(Debug, Default)]
pub struct EventFlag {
    raised: AtomicBool,
}

impl EventFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Set the flag; safe from interrupt context
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Clear the flag, returning whether it was set
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_consumes() {
        let flag = EventFlag::new();
        assert!(!flag.take());

        flag.raise();
        assert!(flag.is_raised());
        assert!(flag.take());
        assert!(!flag.is_raised());
        assert!(!flag.take());
    }

    #[test]
    fn test_raises_coalesce() {
        let flag = EventFlag::new();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_raise_from_other_thread() {
        static FLAG: EventFlag = EventFlag::new();
        std::thread::spawn(|| FLAG.raise()).join().unwrap();
        assert!(FLAG.take());
    }
}
