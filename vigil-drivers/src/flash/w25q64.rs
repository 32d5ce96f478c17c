//! Winbond W25Q64 SPI NOR flash driver
//!
//! 64 Mbit (8 MiB) serial flash on a plain SPI bus with a GPIO chip
//! select. Every command is one chip-select window:
//!
//! ```text
//!  CS ‾‾\______________________________________/‾‾
//!  MOSI    │ OPCODE │ ADDR[23:16] ADDR[15:8] ADDR[7:0] │ DATA... │
//!  MISO                                               │ DATA... │
//! ```
//!
//! Program and erase commands must be preceded by Write Enable (0x06) in
//! their own window; the chip clears the latch when the operation
//! completes. Completion is observed by polling the BUSY bit of status
//! register 1.

use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;
use vigil_hal::flash::PageChunks;
use vigil_hal::{EraseRegion, FlashDevice, FlashError};

/// W25Q64 command opcodes
pub mod cmd {
    /// Set the write-enable latch
    pub const WRITE_ENABLE: u8 = 0x06;
    /// Clear the write-enable latch
    pub const WRITE_DISABLE: u8 = 0x04;
    /// Read status register 1
    pub const READ_STATUS_1: u8 = 0x05;
    /// Program up to one page
    pub const PAGE_PROGRAM: u8 = 0x02;
    /// Erase a 4 KiB sector
    pub const SECTOR_ERASE: u8 = 0x20;
    /// Erase a 32 KiB block
    pub const BLOCK_ERASE_32K: u8 = 0x52;
    /// Erase a 64 KiB block
    pub const BLOCK_ERASE_64K: u8 = 0xD8;
    /// Erase the whole array
    pub const CHIP_ERASE: u8 = 0xC7;
    /// Streaming read
    pub const READ_DATA: u8 = 0x03;
    /// JEDEC manufacturer / memory type / capacity
    pub const JEDEC_ID: u8 = 0x9F;
    /// Legacy manufacturer / device ID
    pub const MANUFACTURER_DEVICE_ID: u8 = 0x90;
}

/// W25Q64 capacity in bytes (8 MiB)
pub const W25Q64_CAPACITY: u32 = 8 * 1024 * 1024;

/// Winbond JEDEC manufacturer ID
pub const WINBOND_MANUFACTURER_ID: u8 = 0xEF;

/// Expected JEDEC ID of a W25Q64
pub const W25Q64_JEDEC_ID: JedecId = JedecId {
    manufacturer: WINBOND_MANUFACTURER_ID,
    memory_type: 0x40,
    capacity: 0x17,
};

/// Status register 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Status(pub u8);

impl Status {
    /// Erase or program in progress
    pub const BUSY: u8 = 0x01;
    /// Write-enable latch set
    pub const WEL: u8 = 0x02;

    /// Whether the device is still executing an operation
    pub fn busy(self) -> bool {
        self.0 & Self::BUSY != 0
    }

    /// Whether the write-enable latch is set
    pub fn write_enabled(self) -> bool {
        self.0 & Self::WEL != 0
    }
}

/// Result of the JEDEC ID command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JedecId {
    /// Manufacturer (0xEF for Winbond)
    pub manufacturer: u8,
    /// Memory type
    pub memory_type: u8,
    /// Capacity code (2^n bytes)
    pub capacity: u8,
}

impl JedecId {
    /// Whether the part reports as a Winbond device
    pub fn is_winbond(&self) -> bool {
        self.manufacturer == WINBOND_MANUFACTURER_ID
    }
}

/// How long to wait for the BUSY bit to clear
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadyPolicy {
    /// Poll until the chip reports ready, hanging on a dead chip
    #[default]
    Forever,
    /// Give up after this many status reads with
    /// [`FlashError::DeviceUnresponsive`]
    MaxPolls(u32),
}

/// W25Q64 driver
///
/// Owns the bus and the chip-select line exclusively. Blocking: every
/// method returns after the device reports ready.
pub struct W25q64<SPI, CS> {
    spi: SPI,
    cs: CS,
    policy: ReadyPolicy,
}

impl<SPI, CS> W25q64<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    /// Create a driver that polls forever
    ///
    /// Deselects the chip before returning.
    pub fn new(spi: SPI, cs: CS) -> Result<Self, FlashError> {
        let mut flash = Self {
            spi,
            cs,
            policy: ReadyPolicy::default(),
        };
        flash.cs.set_high().map_err(|_| FlashError::Bus)?;
        Ok(flash)
    }

    /// Replace the readiness policy
    pub fn with_ready_policy(mut self, policy: ReadyPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Release the bus and chip-select pin
    pub fn release(self) -> (SPI, CS) {
        (self.spi, self.cs)
    }

    /// Read status register 1
    pub fn read_status(&mut self) -> Result<Status, FlashError> {
        let mut frame = [cmd::READ_STATUS_1, 0];
        self.transaction(|spi| spi.transfer_in_place(&mut frame))?;
        Ok(Status(frame[1]))
    }

    /// Read the JEDEC manufacturer and device ID
    pub fn read_jedec_id(&mut self) -> Result<JedecId, FlashError> {
        let mut frame = [cmd::JEDEC_ID, 0, 0, 0];
        self.transaction(|spi| spi.transfer_in_place(&mut frame))?;
        Ok(JedecId {
            manufacturer: frame[1],
            memory_type: frame[2],
            capacity: frame[3],
        })
    }

    /// Read the legacy `(manufacturer, device)` ID pair
    pub fn read_manufacturer_device_id(&mut self) -> Result<(u8, u8), FlashError> {
        let header = [cmd::MANUFACTURER_DEVICE_ID, 0, 0, 0];
        let mut id = [0u8; 2];
        self.transaction(|spi| {
            spi.write(&header)?;
            spi.read(&mut id)
        })?;
        Ok((id[0], id[1]))
    }

    /// Poll the BUSY bit until it clears
    pub fn wait_ready(&mut self) -> Result<(), FlashError> {
        let mut polls: u32 = 0;
        loop {
            if !self.read_status()?.busy() {
                return Ok(());
            }
            polls = polls.saturating_add(1);
            if let ReadyPolicy::MaxPolls(max) = self.policy {
                if polls >= max {
                    return Err(FlashError::DeviceUnresponsive);
                }
            }
        }
    }

    fn write_enable(&mut self) -> Result<(), FlashError> {
        self.transaction(|spi| spi.write(&[cmd::WRITE_ENABLE]))
    }

    fn write_disable(&mut self) -> Result<(), FlashError> {
        self.transaction(|spi| spi.write(&[cmd::WRITE_DISABLE]))
    }

    fn program_page(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError> {
        self.wait_ready()?;
        self.write_enable()?;
        let header = command_with_address(cmd::PAGE_PROGRAM, addr);
        self.transaction(|spi| {
            spi.write(&header)?;
            spi.write(data)
        })?;
        self.wait_ready()
    }

    /// Run `f` with the chip selected
    ///
    /// The bus is flushed before CS is released, and CS is released even
    /// when the transfer fails.
    fn transaction<F>(&mut self, f: F) -> Result<(), FlashError>
    where
        F: FnOnce(&mut SPI) -> Result<(), SPI::Error>,
    {
        self.cs.set_low().map_err(|_| FlashError::Bus)?;
        let result = f(&mut self.spi).and_then(|()| self.spi.flush());
        let deselect = self.cs.set_high();
        result.map_err(|_| FlashError::Bus)?;
        deselect.map_err(|_| FlashError::Bus)
    }
}

/// Opcode followed by a 24-bit big-endian address
fn command_with_address(opcode: u8, addr: u32) -> [u8; 4] {
    [opcode, (addr >> 16) as u8, (addr >> 8) as u8, addr as u8]
}

impl<SPI, CS> FlashDevice for W25q64<SPI, CS>
where
    SPI: SpiBus<u8>,
    CS: OutputPin,
{
    fn capacity(&self) -> u32 {
        W25Q64_CAPACITY
    }

    fn read(&mut self, addr: u32, buf: &mut [u8]) -> Result<(), FlashError> {
        self.check_bounds(addr, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }

        let header = command_with_address(cmd::READ_DATA, addr);
        self.transaction(|spi| {
            spi.write(&header)?;
            spi.read(buf)
        })
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), FlashError> {
        self.check_bounds(addr, data.len())?;

        for chunk in PageChunks::new(addr, data) {
            if let Err(e) = self.program_page(chunk.addr, chunk.data) {
                // Best effort: drop a latch left set by the failed chunk
                let _ = self.write_disable();
                return Err(e);
            }
        }
        Ok(())
    }

    fn erase(&mut self, addr: u32, region: EraseRegion) -> Result<(), FlashError> {
        self.check_bounds(addr, 1)?;

        self.wait_ready()?;
        self.write_enable()?;
        match region {
            EraseRegion::Chip => self.transaction(|spi| spi.write(&[cmd::CHIP_ERASE]))?,
            _ => {
                let opcode = match region {
                    EraseRegion::Sector => cmd::SECTOR_ERASE,
                    EraseRegion::Block32K => cmd::BLOCK_ERASE_32K,
                    _ => cmd::BLOCK_ERASE_64K,
                };
                let frame = command_with_address(opcode, region.align_down(addr));
                self.transaction(|spi| spi.write(&frame))?;
            }
        }
        self.wait_ready()
    }
}
