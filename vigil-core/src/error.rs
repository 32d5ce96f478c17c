//! Error types
//!
//! Each layer keeps its own small `Copy` error; the conversions below let
//! `?` lift flash and codec failures into the storage and application
//! errors.

use core::fmt;

use vigil_hal::FlashError;
use vigil_protocol::ChecksumMismatch;

/// Errors from the record log and the config store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// The block read back does not match its stored checksum
    ChecksumMismatch(ChecksumMismatch),
    /// Slot index out of range or layout does not fit the device
    InvalidArgument,
    /// The flash device failed
    Device(FlashError),
}

impl StorageError {
    /// Whether this is a value-level failure the caller may skip over
    pub fn is_checksum_mismatch(&self) -> bool {
        matches!(self, StorageError::ChecksumMismatch(_))
    }
}

impl From<FlashError> for StorageError {
    fn from(e: FlashError) -> Self {
        StorageError::Device(e)
    }
}

impl From<ChecksumMismatch> for StorageError {
    fn from(e: ChecksumMismatch) -> Self {
        StorageError::ChecksumMismatch(e)
    }
}

/// Errors surfaced by the application context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Storage operation failed
    Storage(StorageError),
    /// The console sink rejected output
    Output,
}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Error::Storage(e)
    }
}

impl From<FlashError> for Error {
    fn from(e: FlashError) -> Self {
        Error::Storage(StorageError::Device(e))
    }
}

impl From<fmt::Error> for Error {
    fn from(_: fmt::Error) -> Self {
        Error::Output
    }
}
