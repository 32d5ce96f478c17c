//! Board-agnostic core logic for the security controller firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Persistent storage: the circular event log and the threshold block
//!   on external NOR flash
//! - Alarm state machine
//! - Serial console parsing and command execution
//! - Application context tying the above together
//! - Interrupt-to-main-loop event flags

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod logging;

pub mod alarm;
pub mod app;
pub mod console;
pub mod error;
pub mod signal;
pub mod storage;

pub use app::{App, BootReport, Readings};
pub use error::{Error, StorageError};
