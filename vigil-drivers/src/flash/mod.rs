//! External flash drivers

pub mod w25q64;

pub use w25q64::{JedecId, ReadyPolicy, Status, W25q64, W25Q64_CAPACITY};
