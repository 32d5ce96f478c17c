//! Console UART receive task
//!
//! Assembles bytes into lines and queues them for the controller.

use defmt::*;
use embassy_stm32::usart::BufferedUartRx;
use embedded_io_async::Read;

use vigil_core::console::{LineBuffer, LineEvent};

use crate::channels::COMMAND_CHANNEL;

/// Buffer size for UART receive
const RX_BUF_SIZE: usize = 32;

/// Console RX task - bytes in, complete lines out
#[embassy_executor::task]
pub async fn console_rx_task(mut rx: BufferedUartRx<'static>) {
    info!("Console RX task started");

    let mut lines = LineBuffer::new();
    let mut buf = [0u8; RX_BUF_SIZE];

    loop {
        match rx.read(&mut buf).await {
            Ok(n) => {
                for &byte in &buf[..n] {
                    match lines.push(byte) {
                        Some(LineEvent::Line(line)) => {
                            trace!("Line: {}", line.as_str());
                            // Drop rather than stall the receiver
                            if COMMAND_CHANNEL.try_send(line).is_err() {
                                warn!("Command channel full, dropping line");
                            }
                        }
                        Some(LineEvent::Discarded) => {
                            warn!("Console line too long or not ASCII, discarded");
                        }
                        None => {}
                    }
                }
            }
            Err(e) => {
                warn!("UART read error: {:?}", e);
            }
        }
    }
}
