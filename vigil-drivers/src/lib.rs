//! Hardware driver implementations
//!
//! Concrete drivers for the peripherals of the security controller,
//! written against `embedded-hal` 1.0 traits:
//!
//! - SPI NOR flash (W25Q64), implementing [`vigil_hal::FlashDevice`]
//! - Buzzer output (active-low transistor stage)
//! - PIR presence sensor input

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod buzzer;
pub mod flash;
pub mod sensor;
