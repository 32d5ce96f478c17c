//! Console output over the buffered UART

use core::fmt;

use embassy_stm32::usart::BufferedUartTx;
use embedded_io::Write;

/// `fmt::Write` sink for console replies
///
/// Writes block only while the transmit buffer is full; the UART
/// interrupt keeps draining it.
pub struct ConsoleWriter {
    tx: BufferedUartTx<'static>,
}

impl ConsoleWriter {
    pub fn new(tx: BufferedUartTx<'static>) -> Self {
        Self { tx }
    }
}

impl fmt::Write for ConsoleWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.tx.write_all(s.as_bytes()).map_err(|_| fmt::Error)
    }
}
