//! NOR flash block-device abstraction
//!
//! Provides the byte-addressed flash trait used by the record and config
//! stores. Implementations must respect the NOR program model: a write can
//! only clear bits (1→0); returning a bit to 1 requires erasing the
//! region that contains it.

/// Program page size in bytes
pub const PAGE_SIZE: u32 = 256;

/// Smallest erasable unit (4 KiB sector)
pub const SECTOR_SIZE: u32 = 4096;

/// 32 KiB block size
pub const BLOCK_32K_SIZE: u32 = 32 * 1024;

/// 64 KiB block size
pub const BLOCK_64K_SIZE: u32 = 64 * 1024;

/// Value of every byte after an erase
pub const ERASED_BYTE: u8 = 0xFF;

/// Erase granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EraseRegion {
    /// 4 KiB sector
    Sector,
    /// 32 KiB block
    Block32K,
    /// 64 KiB block
    Block64K,
    /// Entire device (may take several seconds)
    Chip,
}

impl EraseRegion {
    /// Size of the region in bytes for a device of `capacity` bytes
    pub const fn size(self, capacity: u32) -> u32 {
        match self {
            EraseRegion::Sector => SECTOR_SIZE,
            EraseRegion::Block32K => BLOCK_32K_SIZE,
            EraseRegion::Block64K => BLOCK_64K_SIZE,
            EraseRegion::Chip => capacity,
        }
    }

    /// First address of the region of this granularity containing `addr`
    pub const fn align_down(self, addr: u32) -> u32 {
        match self {
            EraseRegion::Chip => 0,
            _ => addr - addr % self.size(0),
        }
    }

    /// Pick the largest granularity that starts at `addr` and fits in
    /// `remaining` bytes. Falls back to a sector.
    pub const fn largest_fitting(addr: u32, remaining: u32) -> Self {
        if addr % BLOCK_64K_SIZE == 0 && remaining >= BLOCK_64K_SIZE {
            EraseRegion::Block64K
        } else if addr % BLOCK_32K_SIZE == 0 && remaining >= BLOCK_32K_SIZE {
            EraseRegion::Block32K
        } else {
            EraseRegion::Sector
        }
    }
}

/// Errors from flash device operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// The device never reported ready within the poll budget
    DeviceUnresponsive,
    /// Address range extends past the end of the device
    OutOfBounds,
    /// SPI bus or chip-select failure
    Bus,
}

/// Byte-addressed NOR flash device
///
/// Every call is a blocking bus transaction; there is no cache. Callers
/// own the erase discipline: [`FlashDevice::write`] never erases.
pub trait FlashDevice {
    /// Total addressable size in bytes
    fn capacity(&self) -> u32;

    /// Read `buf.len()` bytes starting at `addr`
    ///
    /// No alignment constraint.
    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError>;

    /// Program `data` starting at `addr`
    ///
    /// The data may span any number of pages; implementations split it at
    /// page boundaries. Only clears bits, the destination should have been
    /// erased first.
    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError>;

    /// Erase the region of the given granularity that contains `addr`
    fn erase(&mut self, addr: u32, region: EraseRegion) -> Result<(), FlashError>;

    /// Check that `[addr, addr + len)` lies inside the device
    fn check_bounds(&self, addr: u32, len: usize) -> Result<(), FlashError> {
        let end = (addr as u64) + (len as u64);
        if end > self.capacity() as u64 {
            return Err(FlashError::OutOfBounds);
        }
        Ok(())
    }
}

impl<T: FlashDevice + ?Sized> FlashDevice for &mut T {
    fn capacity(&self) -> u32 {
        T::capacity(self)
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        T::read(self, addr, buf)
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError> {
        T::write(self, addr, data)
    }

    fn erase(&mut self, addr: u32, region: EraseRegion) -> Result<(), FlashError> {
        T::erase(self, addr, region)
    }
}

/// One page-program command worth of a larger write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageChunk<'a> {
    /// Device address of the first byte
    pub addr: u32,
    /// Bytes to program, never crossing a page boundary
    pub data: &'a [u8],
}

/// Splits a write into chunks that each stay inside one program page
///
/// Each chunk ends at `min(remaining, next_page_start - addr)`.
#[derive(Debug, Clone)]
pub struct PageChunks<'a> {
    addr: u32,
    data: &'a [u8],
}

impl<'a> PageChunks<'a> {
    /// Split `data` destined for `addr`
    pub fn new(addr: u32, data: &'a [u8]) -> Self {
        Self { addr, data }
    }
}

impl<'a> Iterator for PageChunks<'a> {
    type Item = PageChunk<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.data.is_empty() {
            return None;
        }

        let page_end = (self.addr / PAGE_SIZE + 1) * PAGE_SIZE;
        let len = ((page_end - self.addr) as usize).min(self.data.len());
        let (head, tail) = self.data.split_at(len);

        let chunk = PageChunk {
            addr: self.addr,
            data: head,
        };
        self.addr += len as u32;
        self.data = tail;
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_page_write_is_one_chunk() {
        let data = [0u8; 10];
        let mut chunks = PageChunks::new(0x100, &data);

        let chunk = chunks.next().unwrap();
        assert_eq!(chunk.addr, 0x100);
        assert_eq!(chunk.data.len(), 10);
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_write_crossing_page_boundary() {
        // 10 bytes starting 4 bytes before a page boundary
        let data = [0xA5u8; 10];
        let chunks: [Option<PageChunk>; 3] = {
            let mut it = PageChunks::new(PAGE_SIZE - 4, &data);
            [it.next(), it.next(), it.next()]
        };

        let first = chunks[0].unwrap();
        assert_eq!(first.addr, PAGE_SIZE - 4);
        assert_eq!(first.data.len(), 4);

        let second = chunks[1].unwrap();
        assert_eq!(second.addr, PAGE_SIZE);
        assert_eq!(second.data.len(), 6);

        assert!(chunks[2].is_none());
    }

    #[test]
    fn test_multi_page_write() {
        let data = [0u8; 600];
        let mut total = 0;
        let mut count = 0;
        for chunk in PageChunks::new(10, &data) {
            // No chunk may cross a page boundary
            assert_eq!(chunk.addr / PAGE_SIZE, (chunk.addr + chunk.data.len() as u32 - 1) / PAGE_SIZE);
            total += chunk.data.len();
            count += 1;
        }
        assert_eq!(total, 600);
        // 246 + 256 + 98
        assert_eq!(count, 3);
    }

    #[test]
    fn test_empty_write_has_no_chunks() {
        assert!(PageChunks::new(0, &[]).next().is_none());
    }

    #[test]
    fn test_align_down() {
        assert_eq!(EraseRegion::Sector.align_down(4097), 4096);
        assert_eq!(EraseRegion::Block32K.align_down(40_000), 32_768);
        assert_eq!(EraseRegion::Block64K.align_down(70_000), 65_536);
        assert_eq!(EraseRegion::Chip.align_down(123_456), 0);
    }

    #[test]
    fn test_largest_fitting() {
        assert_eq!(EraseRegion::largest_fitting(0, 100_000), EraseRegion::Block64K);
        assert_eq!(EraseRegion::largest_fitting(65_536, 34_464), EraseRegion::Block32K);
        assert_eq!(EraseRegion::largest_fitting(98_304, 1_696), EraseRegion::Sector);
        // Aligned but not enough room left
        assert_eq!(EraseRegion::largest_fitting(0, 8_192), EraseRegion::Sector);
    }
}
