//! Flash address map
//!
//! ```text
//! 0                                   tail sector         device_size
//! ├─────────────────────────────┬──────┼────────────┬────────┬───────┤
//! │ record slots 0..N (10B each)│ free │   free     │ CONFIG │ INDEX │
//! │                             │      │            │ 6B     │ 4B BE │
//! └─────────────────────────────┴──────┴────────────┴────────┴───────┘
//! ```
//!
//! The config block and the write index share the last sector and are
//! always rewritten together. The record region must end at or before
//! the start of that sector so an erase there never touches a slot.

use vigil_hal::flash::SECTOR_SIZE;
use vigil_protocol::{CONFIG_SIZE, RECORD_SIZE};

/// Size of the persisted write index
pub const INDEX_SIZE: usize = 4;

/// Config block plus index
pub const TAIL_SIZE: usize = CONFIG_SIZE + INDEX_SIZE;

/// Rejected layout parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Device size is zero or not a whole number of sectors
    DeviceNotSectorAligned,
    /// A log needs at least one slot
    NoSlots,
    /// Record region reaches into the tail sector
    RecordRegionTooLarge,
}

/// Placement of the record region, config block and write index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StorageLayout {
    device_size: u32,
    record_slots: u32,
}

impl StorageLayout {
    /// Validate a layout for a device of `device_size` bytes holding
    /// `record_slots` records
    ///
    /// Usable in `const` context so a bad build-time capacity fails
    /// compilation.
    pub const fn new(device_size: u32, record_slots: u32) -> Result<Self, LayoutError> {
        if device_size == 0 || device_size % SECTOR_SIZE != 0 {
            return Err(LayoutError::DeviceNotSectorAligned);
        }
        if record_slots == 0 {
            return Err(LayoutError::NoSlots);
        }
        let region_end = record_slots as u64 * RECORD_SIZE as u64;
        if region_end > (device_size - SECTOR_SIZE) as u64 {
            return Err(LayoutError::RecordRegionTooLarge);
        }

        Ok(Self {
            device_size,
            record_slots,
        })
    }

    /// Total device size in bytes
    pub const fn device_size(&self) -> u32 {
        self.device_size
    }

    /// Number of record slots (N)
    pub const fn record_slots(&self) -> u32 {
        self.record_slots
    }

    /// Flash address of slot `slot`
    pub const fn slot_offset(&self, slot: u32) -> u32 {
        slot * RECORD_SIZE as u32
    }

    /// First address past the last slot
    pub const fn record_region_end(&self) -> u32 {
        self.slot_offset(self.record_slots)
    }

    /// Start of the sector holding config and index
    pub const fn tail_sector(&self) -> u32 {
        self.device_size - SECTOR_SIZE
    }

    /// Address of the config block
    pub const fn config_offset(&self) -> u32 {
        self.device_size - TAIL_SIZE as u32
    }

    /// Address of the big-endian write index
    pub const fn index_offset(&self) -> u32 {
        self.device_size - INDEX_SIZE as u32
    }
}
