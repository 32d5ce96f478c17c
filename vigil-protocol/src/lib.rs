//! Vigil persisted data layouts
//!
//! This crate defines the byte layouts the controller writes to its SPI
//! NOR flash. Layouts are explicit (field order, width, endianness) so
//! that any implementation can read a chip written by any other.
//!
//! # Layout Overview
//!
//! Event record, 10 bytes:
//! ```text
//! ┌───────────┬──────┬──────┬──────┬────┬───────┐
//! │ TIMESTAMP │ TEMP │ HUMI │ MODE │ IR │ CRC16 │
//! │ 4B LE     │ 1B   │ 1B   │ 1B   │ 1B │ 2B LE │
//! └───────────┴──────┴──────┴──────┴────┴───────┘
//! ```
//!
//! Threshold configuration, 6 bytes:
//! ```text
//! ┌──────────┬───────────┬──────────┬───────────┬───────┐
//! │ TEMP_LOW │ TEMP_HIGH │ HUMI_LOW │ HUMI_HIGH │ CRC16 │
//! │ 1B       │ 1B        │ 1B       │ 1B        │ 2B LE │
//! └──────────┴───────────┴──────────┴───────────┴───────┘
//! ```
//!
//! The CRC covers every preceding byte of the block. A block whose stored
//! CRC does not match is discarded as a whole.

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod crc;
pub mod mode;
pub mod record;

pub use config::{ThresholdConfig, ThresholdError, ThresholdKind, CONFIG_SIZE};
pub use crc::{crc16, ChecksumMismatch};
pub use mode::SystemMode;
pub use record::{Record, IR_CLEAR, IR_DETECTED, RECORD_SIZE};
