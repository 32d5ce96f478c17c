//! Vigil - Security Controller Firmware
//!
//! Main firmware binary for STM32F103-based alarm controllers: a PIR
//! sensor, a buzzer, a mode key, a serial console and a W25Q64 flash
//! that keeps the event log and alarm thresholds across power cycles.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_stm32::exti::ExtiInput;
use embassy_stm32::gpio::{Input, Level, Output, Pull, Speed};
use embassy_stm32::mode::Blocking;
use embassy_stm32::spi::{self, Spi};
use embassy_stm32::time::Hertz;
use embassy_stm32::usart::{self, BufferedUart};
use embassy_stm32::{bind_interrupts, peripherals, Config};
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use vigil_core::App;
use vigil_drivers::buzzer::Buzzer;
use vigil_drivers::flash::W25q64;
use vigil_drivers::sensor::IrSensor;

use crate::console::ConsoleWriter;

mod board;
mod channels;
mod console;
mod tasks;

/// The external flash as wired on this board
pub type Flash = W25q64<Spi<'static, Blocking>, Output<'static>>;

bind_interrupts!(struct Irqs {
    USART1 => usart::BufferedInterruptHandler<peripherals::USART1>;
});

// Static cells for UART buffers (must live forever)
static TX_BUF: StaticCell<[u8; 256]> = StaticCell::new();
static RX_BUF: StaticCell<[u8; 64]> = StaticCell::new();

/// 8 MHz HSE, PLL to 72 MHz
fn clock_config() -> Config {
    use embassy_stm32::rcc::*;

    let mut config = Config::default();
    config.rcc.hse = Some(Hse {
        freq: Hertz(8_000_000),
        mode: HseMode::Oscillator,
    });
    config.rcc.pll = Some(Pll {
        src: PllSource::HSE,
        prediv: PllPreDiv::DIV1,
        mul: PllMul::MUL9,
    });
    config.rcc.sys = Sysclk::PLL1_P;
    config.rcc.ahb_pre = AHBPrescaler::DIV1;
    config.rcc.apb1_pre = APBPrescaler::DIV2;
    config.rcc.apb2_pre = APBPrescaler::DIV1;
    config
}

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Vigil firmware starting...");

    let p = embassy_stm32::init(clock_config());
    info!("Peripherals initialized");

    // Console on USART1
    let mut uart_config = usart::Config::default();
    uart_config.baudrate = board::CONSOLE_BAUD;

    let tx_buf = TX_BUF.init([0u8; 256]);
    let rx_buf = RX_BUF.init([0u8; 64]);

    let uart = unwrap!(BufferedUart::new(
        p.USART1,
        p.PA10,
        p.PA9,
        tx_buf,
        rx_buf,
        Irqs,
        uart_config,
    ));
    let (tx, rx) = uart.split();
    let mut out = ConsoleWriter::new(tx);

    // External flash on SPI1
    let mut spi_config = spi::Config::default();
    spi_config.frequency = board::FLASH_SPI_FREQ;
    let spi = Spi::new_blocking(p.SPI1, p.PA5, p.PA7, p.PA6, spi_config);
    let cs = Output::new(p.PA4, Level::High, Speed::VeryHigh);

    let mut flash = unwrap!(W25q64::new(spi, cs));
    match flash.read_jedec_id() {
        Ok(id) if id.is_winbond() => info!("Flash JEDEC ID: {:?}", id),
        Ok(id) => warn!("Unexpected flash JEDEC ID: {:?}, continuing", id),
        Err(e) => warn!("Flash ID read failed: {:?}", e),
    }

    let (app, report) = match App::boot(flash, board::LAYOUT, &mut out) {
        Ok(booted) => booted,
        Err(e) => defmt::panic!("Boot failed: {:?}", e),
    };
    info!("Boot complete: {:?}", report);

    // Sensors and outputs
    let ir = IrSensor::new_active_low(Input::new(p.PA1, Pull::Up));
    let buzzer = match Buzzer::new_active_low(Output::new(p.PA8, Level::High, Speed::Low)) {
        Ok(buzzer) => buzzer,
        Err(e) => match e {},
    };
    let key = ExtiInput::new(p.PB10, p.EXTI10, Pull::Up);

    spawner.spawn(tasks::keypad_task(key)).unwrap();
    spawner.spawn(tasks::console_rx_task(rx)).unwrap();
    spawner
        .spawn(tasks::controller_task(app, out, ir, buzzer))
        .unwrap();

    info!("All tasks spawned");
}
