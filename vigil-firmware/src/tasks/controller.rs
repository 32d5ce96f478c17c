//! Main controller task
//!
//! The only task that touches the flash. Every [`LOOP_PERIOD_MS`] it
//! handles a pending key press, runs queued console commands, steps the
//! alarm machine and plays the resulting buzzer actions.

use defmt::*;
use embassy_stm32::gpio::{Input, Output};
use embassy_time::{Duration, Instant, Ticker, Timer};

use vigil_core::alarm::Action;
use vigil_core::console::Outcome;
use vigil_core::App;
use vigil_drivers::buzzer::Buzzer;
use vigil_drivers::sensor::IrSensor;
use vigil_protocol::IR_CLEAR;

use crate::board::LOOP_PERIOD_MS;
use crate::channels::{COMMAND_CHANNEL, KEY_PRESSED};
use crate::console::ConsoleWriter;
use crate::Flash;

/// Delay before reset so the reply leaves the UART
const RESET_DELAY_MS: u64 = 100;

/// Controller task - main coordination loop
#[embassy_executor::task]
pub async fn controller_task(
    mut app: App<Flash>,
    mut out: ConsoleWriter,
    mut ir: IrSensor<Input<'static>>,
    mut buzzer: Buzzer<Output<'static>>,
) {
    info!("Controller task started");

    let mut ticker = Ticker::every(Duration::from_millis(LOOP_PERIOD_MS));

    loop {
        ticker.next().await;

        if KEY_PRESSED.take() {
            if let Err(e) = app.handle_key_press(&mut out) {
                warn!("Mode change failed: {:?}", e);
            }
        }

        while let Ok(line) = COMMAND_CHANNEL.try_receive() {
            match app.run_command(line.as_str(), &mut out) {
                Ok(Outcome::ResetRequested) => {
                    info!("Reset requested");
                    Timer::after_millis(RESET_DELAY_MS).await;
                    cortex_m::peripheral::SCB::sys_reset();
                }
                Ok(outcome) => debug!("Command outcome: {:?}", outcome),
                Err(e) => warn!("Command failed: {:?}", e),
            }
        }

        let ir_status = ir.status().unwrap_or(IR_CLEAR);
        let now = Instant::now().as_secs() as u32;
        if let Err(e) = app.step(ir_status, now, &mut out) {
            warn!("Alarm step failed: {:?}", e);
        }

        play(&mut buzzer, app.take_buzzer_actions()).await;
    }
}

/// Drive the buzzer through queued actions in order
async fn play(buzzer: &mut Buzzer<Output<'static>>, actions: impl IntoIterator<Item = Action>) {
    for action in actions {
        match action {
            Action::Beep { ms } => {
                let _ = buzzer.set_on(true);
                Timer::after_millis(ms as u64).await;
                let _ = buzzer.set_on(false);
            }
            Action::Silence => {
                let _ = buzzer.set_on(false);
            }
            _ => {}
        }
    }
}
