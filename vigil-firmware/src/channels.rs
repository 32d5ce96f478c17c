//! Inter-task communication
//!
//! Producers never touch the flash: they only raise flags or queue
//! lines for the controller task.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use vigil_core::console::Line;
use vigil_core::signal::EventFlag;

/// Complete console lines waiting for execution
const COMMAND_CHANNEL_SIZE: usize = 4;

/// Encoder key pressed since the controller last looked
pub static KEY_PRESSED: EventFlag = EventFlag::new();

/// Console lines from the UART receive task
pub static COMMAND_CHANNEL: Channel<CriticalSectionRawMutex, Line, COMMAND_CHANNEL_SIZE> =
    Channel::new();
