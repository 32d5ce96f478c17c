//! CRC-16 block checksums
//!
//! CRC-16/MODBUS: initial value 0xFFFF, reflected input, polynomial
//! 0xA001 (0x8005 reversed), no final XOR. The same checksum guards
//! records and the threshold configuration.

/// Reversed CRC-16 polynomial
const POLY: u16 = 0xA001;

/// Initial register value
const INIT: u16 = 0xFFFF;

/// Size of the trailing checksum field
pub const CRC_SIZE: usize = 2;

/// Stored checksum does not match the block contents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChecksumMismatch {
    /// Checksum read from the block
    pub stored: u16,
    /// Checksum computed over the block body
    pub computed: u16,
}

/// Calculate the CRC-16 of `data`
pub fn crc16(data: &[u8]) -> u16 {
    let mut crc = INIT;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }
    crc
}

/// Compute the checksum over `block[..len - 2]` and store it little-endian
/// in the last two bytes
pub(crate) fn seal(block: &mut [u8]) {
    let body_len = block.len() - CRC_SIZE;
    let crc = crc16(&block[..body_len]);
    block[body_len..].copy_from_slice(&crc.to_le_bytes());
}

/// Check the trailing little-endian checksum of `block`
pub(crate) fn verify(block: &[u8]) -> Result<(), ChecksumMismatch> {
    let body_len = block.len() - CRC_SIZE;
    let stored = u16::from_le_bytes([block[body_len], block[body_len + 1]]);
    let computed = crc16(&block[..body_len]);

    if stored != computed {
        return Err(ChecksumMismatch { stored, computed });
    }
    Ok(())
}
