//! Embassy async tasks
//!
//! Each task runs independently and communicates via the statics in
//! [`crate::channels`].

pub mod console_rx;
pub mod controller;
pub mod keypad;

pub use console_rx::console_rx_task;
pub use controller::controller_task;
pub use keypad::keypad_task;
