//! Tail sector rewrite
//!
//! Config and index sit in the same erase sector, so updating either one
//! means: read both, erase the sector, program both back.

use vigil_hal::{EraseRegion, FlashDevice, FlashError};
use vigil_protocol::CONFIG_SIZE;

use super::layout::{StorageLayout, TAIL_SIZE};

/// Read the raw config + index bytes
pub(crate) fn read<F: FlashDevice>(
    flash: &mut F,
    layout: &StorageLayout,
) -> Result<[u8; TAIL_SIZE], FlashError> {
    let mut tail = [0u8; TAIL_SIZE];
    flash.read(layout.config_offset(), &mut tail)?;
    Ok(tail)
}

/// Read the persisted write index
pub(crate) fn read_index<F: FlashDevice>(
    flash: &mut F,
    layout: &StorageLayout,
) -> Result<u32, FlashError> {
    let tail = read(flash, layout)?;
    Ok(u32::from_be_bytes([
        tail[CONFIG_SIZE],
        tail[CONFIG_SIZE + 1],
        tail[CONFIG_SIZE + 2],
        tail[CONFIG_SIZE + 3],
    ]))
}

/// Replace the index, keeping the config bytes as they are
pub(crate) fn write_index<F: FlashDevice>(
    flash: &mut F,
    layout: &StorageLayout,
    index: u32,
) -> Result<(), FlashError> {
    let mut tail = read(flash, layout)?;
    tail[CONFIG_SIZE..].copy_from_slice(&index.to_be_bytes());
    rewrite(flash, layout, &tail)
}

/// Replace the config block, keeping the index as it is
pub(crate) fn write_config<F: FlashDevice>(
    flash: &mut F,
    layout: &StorageLayout,
    config: &[u8; CONFIG_SIZE],
) -> Result<(), FlashError> {
    let mut tail = read(flash, layout)?;
    tail[..CONFIG_SIZE].copy_from_slice(config);
    rewrite(flash, layout, &tail)
}

fn rewrite<F: FlashDevice>(
    flash: &mut F,
    layout: &StorageLayout,
    tail: &[u8; TAIL_SIZE],
) -> Result<(), FlashError> {
    flash.erase(layout.tail_sector(), EraseRegion::Sector)?;
    flash.write(layout.config_offset(), tail)
}
