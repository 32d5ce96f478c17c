//! Sensor inputs

pub mod ir;

pub use ir::IrSensor;
