//! In-memory NOR flash for host tests
//!
//! [`MemFlash`] behaves like a real NOR part as far as the stores can
//! observe: programming ANDs into the existing contents, erasing sets the
//! containing region to 0xFF, and out-of-range access fails. It also
//! counts operations so tests can check erase discipline.

use crate::flash::{EraseRegion, FlashDevice, FlashError, PageChunks, ERASED_BYTE};

/// Operation counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlashStats {
    /// 4 KiB sector erases
    pub sector_erases: u32,
    /// 32 KiB block erases
    pub block32_erases: u32,
    /// 64 KiB block erases
    pub block64_erases: u32,
    /// Full chip erases
    pub chip_erases: u32,
    /// Page-program commands issued
    pub page_programs: u32,
}

impl FlashStats {
    /// Erases of any granularity
    pub fn total_erases(&self) -> u32 {
        self.sector_erases + self.block32_erases + self.block64_erases + self.chip_erases
    }
}

/// RAM-backed NOR flash of `SIZE` bytes, initially erased
#[derive(Debug, Clone)]
pub struct MemFlash<const SIZE: usize> {
    memory: [u8; SIZE],
    stats: FlashStats,
    unresponsive: bool,
}

impl<const SIZE: usize> Default for MemFlash<SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const SIZE: usize> MemFlash<SIZE> {
    /// Create an erased device
    pub fn new() -> Self {
        Self {
            memory: [ERASED_BYTE; SIZE],
            stats: FlashStats::default(),
            unresponsive: false,
        }
    }

    /// Create a device filled with `byte`, as found on a chip with
    /// leftover data
    pub fn filled(byte: u8) -> Self {
        Self {
            memory: [byte; SIZE],
            ..Self::new()
        }
    }

    /// Raw contents
    pub fn contents(&self) -> &[u8] {
        &self.memory
    }

    /// Operation counters since creation or the last [`reset_stats`]
    ///
    /// [`reset_stats`]: MemFlash::reset_stats
    pub fn stats(&self) -> FlashStats {
        self.stats
    }

    /// Clear the operation counters
    pub fn reset_stats(&mut self) {
        self.stats = FlashStats::default();
    }

    /// Flip bits at `addr` behind the store's back
    pub fn corrupt(&mut self, addr: u32, xor_mask: u8) {
        self.memory[addr as usize] ^= xor_mask;
    }

    /// Make every subsequent operation fail as if the busy bit never
    /// cleared
    pub fn set_unresponsive(&mut self, unresponsive: bool) {
        self.unresponsive = unresponsive;
    }

    fn ready(&self) -> Result<(), FlashError> {
        if self.unresponsive {
            return Err(FlashError::DeviceUnresponsive);
        }
        Ok(())
    }
}

impl<const SIZE: usize> FlashDevice for MemFlash<SIZE> {
    fn capacity(&self) -> u32 {
        SIZE as u32
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.check_bounds(addr, buf.len())?;
        let start = addr as usize;
        buf.copy_from_slice(&self.memory[start..start + buf.len()]);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError> {
        self.check_bounds(addr, data.len())?;

        for chunk in PageChunks::new(addr, data) {
            self.ready()?;
            let start = chunk.addr as usize;
            for (cell, byte) in self.memory[start..start + chunk.data.len()]
                .iter_mut()
                .zip(chunk.data)
            {
                *cell &= *byte;
            }
            self.stats.page_programs += 1;
        }

        Ok(())
    }

    fn erase(&mut self, addr: u32, region: EraseRegion) -> Result<(), FlashError> {
        self.check_bounds(addr, 1)?;
        self.ready()?;

        let start = region.align_down(addr) as usize;
        let end = (start + region.size(SIZE as u32) as usize).min(SIZE);
        self.memory[start..end].fill(ERASED_BYTE);

        match region {
            EraseRegion::Sector => self.stats.sector_erases += 1,
            EraseRegion::Block32K => self.stats.block32_erases += 1,
            EraseRegion::Block64K => self.stats.block64_erases += 1,
            EraseRegion::Chip => self.stats.chip_erases += 1,
        }

        Ok(())
    }
}
