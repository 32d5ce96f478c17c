//! Encoder key task
//!
//! Debounces the key and raises [`KEY_PRESSED`]. The controller picks
//! the flag up on its next iteration.

use defmt::*;
use embassy_stm32::exti::ExtiInput;
use embassy_time::Timer;

use crate::board::KEY_DEBOUNCE_MS;
use crate::channels::KEY_PRESSED;

/// Keypad task - one flag per debounced press
#[embassy_executor::task]
pub async fn keypad_task(mut key: ExtiInput<'static>) {
    info!("Keypad task started");

    loop {
        key.wait_for_falling_edge().await;
        Timer::after_millis(KEY_DEBOUNCE_MS).await;

        if key.is_low() {
            debug!("Key pressed");
            KEY_PRESSED.raise();
        }

        // Ignore bounce on release
        key.wait_for_high().await;
    }
}
