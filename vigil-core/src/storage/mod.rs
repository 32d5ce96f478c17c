//! Persistent storage on external NOR flash
//!
//! [`Storage`] owns the flash device and hands out short-lived views:
//!
//! - [`RecordLog`]: the circular event log
//! - [`ConfigStore`]: the threshold configuration block
//!
//! Only one view can exist at a time, so every bus transaction goes
//! through a single owner.

mod config;
mod layout;
mod log;
mod tail;

pub use config::ConfigStore;
pub use layout::{LayoutError, StorageLayout, INDEX_SIZE, TAIL_SIZE};
pub use log::{RecentSlots, RecordLog};

use vigil_hal::FlashDevice;

use crate::error::StorageError;
use self::log::LogCursor;

/// Flash device plus the log write position
pub struct Storage<F> {
    flash: F,
    layout: StorageLayout,
    cursor: LogCursor,
}

impl<F: FlashDevice> Storage<F> {
    /// Take ownership of `flash` and recover the log position
    ///
    /// The layout must describe the whole device: the index lives in the
    /// last four bytes of the address space.
    pub fn open(mut flash: F, layout: StorageLayout) -> Result<Self, StorageError> {
        if flash.capacity() != layout.device_size() {
            log_warn!(
                "storage: layout for {} bytes, device has {}",
                layout.device_size(),
                flash.capacity()
            );
            return Err(StorageError::InvalidArgument);
        }

        let cursor = LogCursor::load(&mut flash, &layout)?;
        log_info!(
            "storage: {} slots, next {}, wrapped {}",
            layout.record_slots(),
            cursor.next_index,
            cursor.wrapped
        );

        Ok(Self {
            flash,
            layout,
            cursor,
        })
    }

    /// The circular event log
    pub fn log(&mut self) -> RecordLog<'_, F> {
        RecordLog {
            flash: &mut self.flash,
            layout: self.layout,
            cursor: &mut self.cursor,
        }
    }

    /// The threshold configuration block
    pub fn config(&mut self) -> ConfigStore<'_, F> {
        ConfigStore {
            flash: &mut self.flash,
            layout: self.layout,
        }
    }

    /// Address map in use
    pub fn layout(&self) -> StorageLayout {
        self.layout
    }

    /// Raw device access for tests that inspect or damage the medium
    #[cfg(test)]
    pub(crate) fn flash(&mut self) -> &mut F {
        &mut self.flash
    }

    /// Give the device back
    pub fn into_flash(self) -> F {
        self.flash
    }
}
