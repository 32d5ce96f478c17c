//! Threshold configuration slot

use vigil_hal::FlashDevice;
use vigil_protocol::{ThresholdConfig, CONFIG_SIZE};

use super::layout::StorageLayout;
use super::tail;
use crate::error::StorageError;

/// View of the config block, borrowed from [`Storage`](super::Storage)
pub struct ConfigStore<'a, F> {
    pub(crate) flash: &'a mut F,
    pub(crate) layout: StorageLayout,
}

impl<'a, F: FlashDevice> ConfigStore<'a, F> {
    /// Read and verify the stored thresholds
    ///
    /// A blank or damaged block yields
    /// [`StorageError::ChecksumMismatch`]; choosing a fallback is up to
    /// the caller.
    pub fn load(&mut self) -> Result<ThresholdConfig, StorageError> {
        let mut buf = [0u8; CONFIG_SIZE];
        self.flash.read(self.layout.config_offset(), &mut buf)?;
        Ok(ThresholdConfig::decode_verified(&buf)?)
    }

    /// Replace the stored thresholds as a whole
    pub fn save(&mut self, config: &ThresholdConfig) -> Result<(), StorageError> {
        tail::write_config(&mut *self.flash, &self.layout, &config.encode())?;
        log_info!("storage: thresholds saved");
        Ok(())
    }
}
