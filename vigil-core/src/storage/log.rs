//! Circular event log
//!
//! N fixed-size slots from address 0. The persisted index names the next
//! slot to write; it advances `0..N-1` and wraps.
//!
//! # Erase discipline
//!
//! Programming can only clear bits, so a slot must be blank before it is
//! written. On the first pass (and after [`RecordLog::clear_all`]) every
//! slot already is. Once the log has wrapped, the sector holding the slot
//! is read into RAM, erased and programmed back without the slot's bytes,
//! so every other record in the sector survives. A slot straddling two
//! sectors gets this treatment in each sector it touches. Steady-state
//! cost after the wrap is one extra sector erase per append, on top of
//! the tail rewrite.
//!
//! # Counting
//!
//! Before the first wrap, slots `0..next_index` are the written ones.
//! Afterwards every slot holds a record and [`RecordLog::total_count`]
//! reports N.

use vigil_hal::flash::{ERASED_BYTE, PAGE_SIZE, SECTOR_SIZE};
use vigil_hal::{EraseRegion, FlashDevice, FlashError};
use vigil_protocol::{Record, RECORD_SIZE};

use super::layout::StorageLayout;
use super::tail;
use crate::error::StorageError;

/// In-memory write position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct LogCursor {
    /// Next slot to write, always `< N`
    pub(crate) next_index: u32,
    /// Slot N-1 has been written since the last clear
    pub(crate) wrapped: bool,
}

impl LogCursor {
    /// Recover the cursor from flash
    ///
    /// The index comes from the tail; an out-of-range value (an erased
    /// chip reads 0xFFFFFFFF) restarts at slot 0. Slots at or past the
    /// index only hold records if an earlier pass reached them, so the
    /// log counts as wrapped iff one of them passes its checksum. The
    /// scan runs from the last slot down and usually stops there.
    pub(crate) fn load<F: FlashDevice>(
        flash: &mut F,
        layout: &StorageLayout,
    ) -> Result<Self, FlashError> {
        let stored = tail::read_index(flash, layout)?;
        let next_index = if stored < layout.record_slots() {
            stored
        } else {
            log_warn!("storage: persisted index {} out of range, restarting at 0", stored);
            0
        };

        let mut wrapped = false;
        let mut buf = [0u8; RECORD_SIZE];
        for slot in (next_index..layout.record_slots()).rev() {
            flash.read(layout.slot_offset(slot), &mut buf)?;
            if Record::decode_verified(&buf).is_ok() {
                wrapped = true;
                break;
            }
        }

        Ok(Self {
            next_index,
            wrapped,
        })
    }
}

/// View of the record region, borrowed from [`Storage`](super::Storage)
pub struct RecordLog<'a, F> {
    pub(crate) flash: &'a mut F,
    pub(crate) layout: StorageLayout,
    pub(crate) cursor: &'a mut LogCursor,
}

impl<'a, F: FlashDevice> RecordLog<'a, F> {
    /// Number of slots (N)
    pub fn capacity(&self) -> u32 {
        self.layout.record_slots()
    }

    /// Slot the next append will write
    pub fn next_index(&self) -> u32 {
        self.cursor.next_index
    }

    /// Whether the log has wrapped since the last clear
    pub fn is_wrapped(&self) -> bool {
        self.cursor.wrapped
    }

    /// Number of slots presumed to hold records
    ///
    /// `next_index` before the first wrap, N afterwards. This is a
    /// policy, not an exact count of intact records.
    pub fn total_count(&self) -> u32 {
        if self.cursor.wrapped {
            self.capacity()
        } else {
            self.cursor.next_index
        }
    }

    /// Store `record` in the next slot and persist the advanced index
    ///
    /// Returns the slot written. Costs one record program plus one
    /// erase and program of the tail sector, and once the log has
    /// wrapped a rewrite of the sector holding the slot.
    pub fn append(&mut self, record: &Record) -> Result<u32, StorageError> {
        let slot = self.cursor.next_index;
        let addr = self.layout.slot_offset(slot);

        self.blank_slot(addr)?;
        self.flash.write(addr, &record.encode())?;

        let capacity = self.capacity();
        self.cursor.next_index = (slot + 1) % capacity;
        if slot == capacity - 1 {
            self.cursor.wrapped = true;
        }
        tail::write_index(&mut *self.flash, &self.layout, self.cursor.next_index)?;

        log_debug!("storage: record stored in slot {}", slot);
        Ok(slot)
    }

    /// Read and verify slot `slot`
    ///
    /// A blank or damaged slot yields [`StorageError::ChecksumMismatch`];
    /// `slot >= N` yields [`StorageError::InvalidArgument`].
    pub fn read(&mut self, slot: u32) -> Result<Record, StorageError> {
        if slot >= self.capacity() {
            return Err(StorageError::InvalidArgument);
        }

        let mut buf = [0u8; RECORD_SIZE];
        self.flash.read(self.layout.slot_offset(slot), &mut buf)?;
        Ok(Record::decode_verified(&buf)?)
    }

    /// Erase the whole record region and reset the index to 0
    ///
    /// Uses the largest erase granularity that fits at each step. The
    /// tail sector is not part of the region.
    pub fn clear_all(&mut self) -> Result<(), StorageError> {
        let end = self.layout.record_region_end().div_ceil(SECTOR_SIZE) * SECTOR_SIZE;
        let capacity = self.flash.capacity();

        let mut addr = 0;
        while addr < end {
            let region = EraseRegion::largest_fitting(addr, end - addr);
            self.flash.erase(addr, region)?;
            addr += region.size(capacity);
        }

        *self.cursor = LogCursor::default();
        tail::write_index(&mut *self.flash, &self.layout, 0)?;

        log_info!("storage: record region cleared ({} bytes)", end);
        Ok(())
    }

    /// Slots of the last `min(count, total_count())` records, oldest first
    pub fn recent_slots(&self, count: u32) -> RecentSlots {
        let capacity = self.capacity();
        let remaining = count.min(self.total_count());
        RecentSlots {
            next: (self.cursor.next_index + capacity - remaining) % capacity,
            remaining,
            capacity,
        }
    }

    /// Make the slot at `addr` read as erased, keeping its neighbours
    fn blank_slot(&mut self, addr: u32) -> Result<(), FlashError> {
        let end = addr + RECORD_SIZE as u32;
        let mut sector = EraseRegion::Sector.align_down(addr);
        while sector < end {
            let start = addr.max(sector);
            let stop = end.min(sector + SECTOR_SIZE);
            if !self.is_blank(start, stop)? {
                self.rewrite_sector_without(sector, start, stop)?;
            }
            sector += SECTOR_SIZE;
        }
        Ok(())
    }

    fn is_blank(&mut self, start: u32, stop: u32) -> Result<bool, FlashError> {
        let mut buf = [0u8; RECORD_SIZE];
        let buf = &mut buf[..(stop - start) as usize];
        self.flash.read(start, buf)?;
        Ok(buf.iter().all(|&b| b == ERASED_BYTE))
    }

    /// Erase `sector` and program back everything outside `start..stop`
    ///
    /// Holds a whole sector on the stack. Pages left blank are skipped.
    fn rewrite_sector_without(
        &mut self,
        sector: u32,
        start: u32,
        stop: u32,
    ) -> Result<(), FlashError> {
        let mut buf = [ERASED_BYTE; SECTOR_SIZE as usize];
        self.flash.read(sector, &mut buf)?;
        buf[(start - sector) as usize..(stop - sector) as usize].fill(ERASED_BYTE);

        log_debug!("storage: rewriting sector at {}", sector);
        self.flash.erase(sector, EraseRegion::Sector)?;

        let mut page_addr = sector;
        for page in buf.chunks(PAGE_SIZE as usize) {
            if page.iter().any(|&b| b != ERASED_BYTE) {
                self.flash.write(page_addr, page)?;
            }
            page_addr += PAGE_SIZE;
        }
        Ok(())
    }
}

/// Iterator over slot numbers in append order, following the wrap
#[derive(Debug, Clone)]
pub struct RecentSlots {
    next: u32,
    remaining: u32,
    capacity: u32,
}

impl Iterator for RecentSlots {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let slot = self.next;
        self.next = (self.next + 1) % self.capacity;
        self.remaining -= 1;
        Some(slot)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining as usize, Some(self.remaining as usize))
    }
}

impl ExactSizeIterator for RecentSlots {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;
    use proptest::prelude::*;
    use std::vec::Vec;
    use vigil_hal::mock::MemFlash;

    const SIZE: usize = 16384;

    fn record(temperature: u8) -> Record {
        Record {
            timestamp: temperature as u32 * 100,
            temperature,
            humidity: 50,
            mode: 0,
            ir_status: 0,
        }
    }

    fn stamped(timestamp: u32) -> Record {
        Record {
            timestamp,
            ..record(20)
        }
    }

    fn open(slots: u32) -> Storage<MemFlash<SIZE>> {
        let layout = StorageLayout::new(SIZE as u32, slots).unwrap();
        Storage::open(MemFlash::new(), layout).unwrap()
    }

    fn reopen(storage: Storage<MemFlash<SIZE>>) -> Storage<MemFlash<SIZE>> {
        let layout = storage.layout();
        Storage::open(storage.into_flash(), layout).unwrap()
    }

    #[test]
    fn test_fresh_log_is_empty() {
        let mut storage = open(4);
        let log = storage.log();
        assert_eq!(log.next_index(), 0);
        assert_eq!(log.total_count(), 0);
        assert!(!log.is_wrapped());
    }

    #[test]
    fn test_four_slot_example() {
        let mut storage = open(4);
        let mut log = storage.log();

        for t in [10, 20, 30, 40] {
            log.append(&record(t)).unwrap();
        }
        for (slot, t) in [10, 20, 30, 40].into_iter().enumerate() {
            assert_eq!(log.read(slot as u32).unwrap(), record(t));
        }
        assert_eq!(log.total_count(), 4);

        log.append(&record(50)).unwrap();
        assert_eq!(log.next_index(), 1);
        assert_eq!(log.read(0).unwrap(), record(50));
        assert_eq!(log.total_count(), 4);
        // Slots sharing the sector with slot 0 keep the first pass
        for (slot, t) in [(1, 20), (2, 30), (3, 40)] {
            assert_eq!(log.read(slot).unwrap(), record(t));
        }
    }

    #[test]
    fn test_wraparound_reuses_slots() {
        // 1000 slots span three sectors
        const N: u32 = 1000;
        const K: u32 = 300;
        let mut storage = open(N);
        let mut log = storage.log();

        for i in 0..N + K {
            log.append(&stamped(i)).unwrap();
        }

        for i in 0..K {
            assert_eq!(log.read(i).unwrap(), stamped(N + i));
        }
        assert_eq!(log.total_count(), N);
        assert_eq!(log.next_index(), K);
        // Everything past the write position still holds the first pass
        for i in K..N {
            assert_eq!(log.read(i).unwrap(), stamped(i));
        }
    }

    #[test]
    fn test_wrapped_straddling_slot_keeps_neighbours() {
        // Slot 409 covers bytes 4090..4100, across sectors 0 and 1
        const N: u32 = 1000;
        let mut storage = open(N);
        let mut log = storage.log();
        for i in 0..N + 410 {
            log.append(&stamped(i)).unwrap();
        }

        assert_eq!(log.read(408).unwrap(), stamped(N + 408));
        assert_eq!(log.read(409).unwrap(), stamped(N + 409));
        assert_eq!(log.read(410).unwrap(), stamped(410));
        assert_eq!(log.read(818).unwrap(), stamped(818));
    }

    #[test]
    fn test_first_pass_erases_only_the_tail() {
        let mut storage = open(4);
        storage.flash().reset_stats();
        storage.log().append(&record(10)).unwrap();
        assert_eq!(storage.flash().stats().sector_erases, 1);
    }

    #[test]
    fn test_wrapped_append_rewrites_one_sector() {
        let mut storage = open(4);
        for t in [10, 20, 30, 40] {
            storage.log().append(&record(t)).unwrap();
        }

        storage.flash().reset_stats();
        storage.log().append(&record(50)).unwrap();
        // Slot sector plus the tail
        assert_eq!(storage.flash().stats().sector_erases, 2);
    }

    #[test]
    fn test_wrapped_slot_is_erased_before_reprogramming() {
        let mut storage = open(4);
        let mut log = storage.log();

        for _ in 0..4 {
            log.append(&stamped(0)).unwrap();
        }
        // All-ones timestamp only reads back if the slot was erased first
        log.append(&stamped(u32::MAX)).unwrap();
        assert_eq!(log.read(0).unwrap(), stamped(u32::MAX));
    }

    #[test]
    fn test_record_straddling_sector_boundary() {
        // Slot 409 covers bytes 4090..4100
        let mut storage = open(1000);
        let mut log = storage.log();
        for i in 0..410 {
            log.append(&stamped(i)).unwrap();
        }
        assert_eq!(log.read(409).unwrap(), stamped(409));
        assert_eq!(log.read(408).unwrap(), stamped(408));
    }

    #[test]
    fn test_index_survives_power_cycle() {
        let mut storage = open(4);
        storage.log().append(&record(10)).unwrap();
        storage.log().append(&record(20)).unwrap();
        let before = storage.log().next_index();

        let mut storage = reopen(storage);
        let mut log = storage.log();
        assert_eq!(log.next_index(), before);
        assert_eq!(log.total_count(), 2);
        assert_eq!(log.read(1).unwrap(), record(20));
    }

    #[test]
    fn test_wrap_state_survives_power_cycle() {
        const N: u32 = 1000;
        let mut storage = open(N);
        for i in 0..N + 5 {
            storage.log().append(&stamped(i)).unwrap();
        }

        let mut storage = reopen(storage);
        let log = storage.log();
        assert!(log.is_wrapped());
        assert_eq!(log.next_index(), 5);
        assert_eq!(log.total_count(), N);
    }

    #[test]
    fn test_small_log_stays_wrapped_after_power_cycle() {
        let mut storage = open(4);
        for t in [10, 20, 30, 40, 50] {
            storage.log().append(&record(t)).unwrap();
        }

        let mut storage = reopen(storage);
        let mut log = storage.log();
        assert!(log.is_wrapped());
        assert_eq!(log.next_index(), 1);
        assert_eq!(log.total_count(), 4);
        assert_eq!(log.read(3).unwrap(), record(40));
    }

    #[test]
    fn test_power_cycle_with_write_position_in_last_sector() {
        // Slots 819..1000 share the last record sector with slot N-1
        const N: u32 = 1000;
        let mut storage = open(N);
        for i in 0..N + 900 {
            storage.log().append(&stamped(i)).unwrap();
        }

        let mut storage = reopen(storage);
        let mut log = storage.log();
        assert!(log.is_wrapped());
        assert_eq!(log.next_index(), 900);
        assert_eq!(log.total_count(), N);
        assert_eq!(log.read(899).unwrap(), stamped(N + 899));
        assert_eq!(log.read(N - 1).unwrap(), stamped(N - 1));
    }

    #[test]
    fn test_wrap_probe_survives_damaged_last_slot() {
        let mut storage = open(4);
        for t in [10, 20, 30, 40, 50] {
            storage.log().append(&record(t)).unwrap();
        }
        storage.flash().corrupt(30, 0x01);

        let mut storage = reopen(storage);
        assert!(storage.log().is_wrapped());
        assert_eq!(storage.log().total_count(), 4);
    }

    #[test]
    fn test_leftover_data_is_not_a_wrapped_log() {
        let layout = StorageLayout::new(SIZE as u32, 4).unwrap();
        let mut storage = Storage::open(MemFlash::<SIZE>::filled(0x00), layout).unwrap();
        let log = storage.log();
        assert!(!log.is_wrapped());
        assert_eq!(log.next_index(), 0);
        assert_eq!(log.total_count(), 0);
    }

    #[test]
    fn test_out_of_range_index_restarts_at_zero() {
        let layout = StorageLayout::new(SIZE as u32, 4).unwrap();
        let mut flash = MemFlash::<SIZE>::new();
        tail::write_index(&mut flash, &layout, 4).unwrap();

        let mut storage = Storage::open(flash, layout).unwrap();
        assert_eq!(storage.log().next_index(), 0);
    }

    #[test]
    fn test_read_rejects_slot_past_capacity() {
        let mut storage = open(4);
        assert_eq!(storage.log().read(4), Err(StorageError::InvalidArgument));
    }

    #[test]
    fn test_blank_and_corrupt_slots_report_mismatch() {
        let mut storage = open(4);
        storage.log().append(&record(10)).unwrap();
        storage.log().append(&record(20)).unwrap();
        storage.flash().corrupt(12, 0x01);

        let mut log = storage.log();
        assert_eq!(log.read(0).unwrap(), record(10));
        assert!(log.read(1).unwrap_err().is_checksum_mismatch());
        assert!(log.read(2).unwrap_err().is_checksum_mismatch());
    }

    #[test]
    fn test_clear_all() {
        let mut storage = open(4);
        for t in [10, 20, 30, 40, 50] {
            storage.log().append(&record(t)).unwrap();
        }
        storage.log().clear_all().unwrap();

        let mut log = storage.log();
        assert_eq!(log.next_index(), 0);
        assert_eq!(log.total_count(), 0);
        assert!(!log.is_wrapped());
        assert!(log.read(0).unwrap_err().is_checksum_mismatch());

        let mut storage = reopen(storage);
        assert_eq!(storage.log().next_index(), 0);
        assert!(!storage.log().is_wrapped());
    }

    #[test]
    fn test_clear_all_uses_largest_erases() {
        const BIG: usize = 128 * 1024;
        let layout = StorageLayout::new(BIG as u32, 10_000).unwrap();
        let mut storage = Storage::open(MemFlash::<BIG>::new(), layout).unwrap();

        storage.flash().reset_stats();
        storage.log().clear_all().unwrap();

        // 100_000 bytes rounds up to 102_400: 64K + 32K + 4K
        let stats = storage.flash().stats();
        assert_eq!(stats.block64_erases, 1);
        assert_eq!(stats.block32_erases, 1);
        // One region sector plus the tail rewrite
        assert_eq!(stats.sector_erases, 2);
        assert_eq!(stats.chip_erases, 0);
    }

    #[test]
    fn test_clear_all_keeps_config() {
        let mut storage = open(4);
        let config = vigil_protocol::ThresholdConfig {
            temp_low: 5,
            ..Default::default()
        };
        storage.config().save(&config).unwrap();
        storage.log().clear_all().unwrap();
        assert_eq!(storage.config().load().unwrap(), config);
    }

    #[test]
    fn test_recent_slots_before_wrap() {
        let mut storage = open(4);
        storage.log().append(&record(10)).unwrap();
        storage.log().append(&record(20)).unwrap();
        storage.log().append(&record(30)).unwrap();

        let log = storage.log();
        assert_eq!(log.recent_slots(10).collect::<Vec<_>>(), [0, 1, 2]);
        assert_eq!(log.recent_slots(2).collect::<Vec<_>>(), [1, 2]);
        assert_eq!(log.recent_slots(0).len(), 0);
    }

    #[test]
    fn test_recent_slots_follow_wrap() {
        let mut storage = open(4);
        for t in [10, 20, 30, 40, 50, 60] {
            storage.log().append(&record(t)).unwrap();
        }

        let log = storage.log();
        assert_eq!(log.recent_slots(10).collect::<Vec<_>>(), [2, 3, 0, 1]);
        assert_eq!(log.recent_slots(3).collect::<Vec<_>>(), [3, 0, 1]);
    }

    #[test]
    fn test_device_failure_propagates() {
        let mut storage = open(4);
        storage.flash().set_unresponsive(true);
        assert_eq!(
            storage.log().append(&record(10)),
            Err(StorageError::Device(FlashError::DeviceUnresponsive))
        );
    }

    proptest! {
        #[test]
        fn test_counted_slots_are_readable(slots in 1u32..=24, appends in 1u32..=80) {
            let mut storage = open(slots);
            for i in 0..appends {
                storage.log().append(&stamped(i)).unwrap();
            }

            let mut log = storage.log();
            let last = (appends - 1) % slots;
            prop_assert_eq!(log.next_index(), appends % slots);
            prop_assert_eq!(log.total_count(), appends.min(slots));
            prop_assert_eq!(log.recent_slots(1).next(), Some(last));

            // Every counted slot holds the newest record written to it
            for slot in 0..log.total_count() {
                let newest = slot + (appends - 1 - slot) / slots * slots;
                prop_assert_eq!(log.read(slot).unwrap(), stamped(newest));
            }

            let mut storage = reopen(storage);
            prop_assert_eq!(storage.log().next_index(), appends % slots);
            prop_assert_eq!(storage.log().total_count(), appends.min(slots));
        }
    }
}
