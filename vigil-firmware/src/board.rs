//! Board definition
//!
//! STM32F103C8 wiring:
//!
//! | Signal      | Pin       | Notes                         |
//! |-------------|-----------|-------------------------------|
//! | Flash SCK   | PA5       | SPI1, mode 0                  |
//! | Flash MISO  | PA6       |                               |
//! | Flash MOSI  | PA7       |                               |
//! | Flash CS    | PA4       | active low                    |
//! | PIR out     | PA1       | pull-up, low = motion         |
//! | Buzzer      | PA8       | active low                    |
//! | Encoder key | PB10      | pull-up, falling edge = press |
//! | Console TX  | PA9       | USART1                        |
//! | Console RX  | PA10      |                               |

use embassy_stm32::time::Hertz;

use vigil_core::storage::StorageLayout;
use vigil_drivers::flash::W25Q64_CAPACITY;

/// Records kept in the circular log
pub const MAX_RECORDS: u32 = 10_000;

/// Address map of the external flash
pub const LAYOUT: StorageLayout = match StorageLayout::new(W25Q64_CAPACITY, MAX_RECORDS) {
    Ok(layout) => layout,
    Err(_) => panic!("record region does not fit the flash"),
};

/// SPI clock for the W25Q64
pub const FLASH_SPI_FREQ: Hertz = Hertz(4_500_000);

/// Console baud rate
pub const CONSOLE_BAUD: u32 = 115_200;

/// Main loop period
pub const LOOP_PERIOD_MS: u64 = 500;

/// Key must stay low this long to count as a press
pub const KEY_DEBOUNCE_MS: u64 = 20;
