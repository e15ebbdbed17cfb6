// Primary partition table management
// Reads the four legacy MBR slots and appends single FAT32 entries in place,
// leaving the rest of the sector (boot code, disk signature, other slots)
// untouched.

pub mod chs;
pub mod entry;


pub use chs::Chs;
pub use entry::PartitionEntry;

use overlay_core::{DiskError, RawDevice};
use std::io::SeekFrom;
use log::{debug, info};

use crate::constants::{MAX_PARTITIONS, PARTITION_ENTRY_SIZE, PARTITION_TABLE_OFFSET};

/// In-memory view of the primary table
#[derive(Debug, Clone, Default)]
pub struct PartitionTable {
    slots: [Option<PartitionEntry>; MAX_PARTITIONS],
}

impl PartitionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load all four slots; all-zero slots are kept as empty
    pub fn read<D: RawDevice + ?Sized>(device: &mut D) -> Result<Self, DiskError> {
        let mut table = Self::new();

        seek_entry(device, 0)?;
        for (index, slot) in table.slots.iter_mut().enumerate() {
            let mut bytes = [0u8; PARTITION_ENTRY_SIZE];
            let read = device
                .read(&mut bytes)
                .map_err(|e| DiskError::ReadFailure(format!(
                    "Failed to read partition table slot {}: {}",
                    index, e
                )))?;
            if read != PARTITION_ENTRY_SIZE {
                return Err(DiskError::ReadFailure(format!(
                    "Short read of partition table slot {}: {} of {} bytes",
                    index, read, PARTITION_ENTRY_SIZE
                )));
            }

            let entry = PartitionEntry::from_bytes(bytes);
            if entry.is_empty() {
                continue;
            }
            debug!(
                "Slot {}: {} at LBA {} ({} sectors)",
                index, entry.type_name(), entry.start_lba(), entry.sector_count()
            );
            *slot = Some(entry);
        }

        info!("Read partition table: {} of {} slots in use", table.len(), MAX_PARTITIONS);
        Ok(table)
    }

    /// Entries in on-disk order
    pub fn entries(&self) -> Vec<PartitionEntry> {
        self.slots.iter().flatten().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= MAX_PARTITIONS
    }

    pub fn slot(&self, index: usize) -> Option<&PartitionEntry> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }

    /// Add a FAT32 entry for `size` bytes at `offset` and persist only its slot.
    ///
    /// Returns the 1-based partition number (slot index + 1). The slot must be
    /// written in a single call; the in-memory table only changes once it is.
    pub fn append<D: RawDevice + ?Sized>(
        &mut self,
        device: &mut D,
        offset: u64,
        size: u64,
    ) -> Result<usize, DiskError> {
        let index = self
            .slots
            .iter()
            .position(|s| s.is_none())
            .ok_or(DiskError::TableFull)?;

        let entry = PartitionEntry::fat32(offset, size);
        seek_entry(device, index)?;
        let written = device
            .write(entry.as_bytes())
            .map_err(|e| DiskError::WriteFailure(format!(
                "Failed to add partition in slot {}: {}",
                index, e
            )))?;
        if written != PARTITION_ENTRY_SIZE {
            return Err(DiskError::WriteFailure(format!(
                "Short write of partition table slot {}: {} of {} bytes",
                index, written, PARTITION_ENTRY_SIZE
            )));
        }
        device
            .flush()
            .map_err(|e| DiskError::WriteFailure(format!("Failed to flush partition table: {}", e)))?;
        self.slots[index] = Some(entry);

        info!(
            "Added partition {}: {} at LBA {} ({} sectors)",
            index + 1, entry.type_name(), entry.start_lba(), entry.sector_count()
        );
        Ok(index + 1)
    }
}

fn seek_entry<D: RawDevice + ?Sized>(device: &mut D, index: usize) -> Result<(), DiskError> {
    let position = PARTITION_TABLE_OFFSET + (PARTITION_ENTRY_SIZE * index) as u64;
    device
        .seek(SeekFrom::Start(position))
        .map_err(|e| DiskError::SeekFailure(format!("Failed to seek to partition table: {}", e)))?;
    Ok(())
}
