//! Vigil Hardware Abstraction Layer
//!
//! This crate defines the hardware abstraction traits shared by the
//! drivers and the application logic. The application only ever talks to
//! persistent storage through [`FlashDevice`], so the same store code runs
//! against the W25Q64 driver on the board and against `mock::MemFlash`
//! on the host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application (vigil-core, firmware)     │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  vigil-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ vigil-drivers │       │  mock (host)  │
//! │    W25Q64     │       │   MemFlash    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`flash::FlashDevice`] - Byte-addressed NOR flash block device
//!
//! # Features
//!
//! - `mock` - RAM-backed [`FlashDevice`] for host tests
//! - `defmt` - Enable debug formatting support

#![no_std]
#![deny(unsafe_code)]

pub mod flash;
#[cfg(any(test, feature = "mock"))]
pub mod mock;

// Re-export key traits at crate root for convenience
pub use flash::{EraseRegion, FlashDevice, FlashError};
