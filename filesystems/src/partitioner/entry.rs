// 16-byte primary partition entry
use byteorder::{ByteOrder, LittleEndian};
use static_assertions::const_assert_eq;

use super::chs::Chs;
use crate::constants::{PARTITION_ENTRY_SIZE, PARTITION_TYPE_FAT32, SECTOR_SIZE};

// Entry field offsets
const PE_BOOT_INDICATOR: usize = 0;
const PE_CHS_START: usize = 1;
const PE_TYPE: usize = 4;
const PE_CHS_END: usize = 5;
const PE_LBA_START: usize = 8;
const PE_SECTOR_COUNT: usize = 12;

const_assert_eq!(PE_SECTOR_COUNT + 4, PARTITION_ENTRY_SIZE);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartitionEntry([u8; PARTITION_ENTRY_SIZE]);

impl PartitionEntry {
    pub fn from_bytes(bytes: [u8; PARTITION_ENTRY_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build a non-bootable FAT32 entry covering `size` bytes at `offset`.
    ///
    /// Both values are truncated to whole sectors.
    pub fn fat32(offset: u64, size: u64) -> Self {
        let lba = (offset / SECTOR_SIZE) as u32;
        let count = (size / SECTOR_SIZE) as u32;

        let mut bytes = [0u8; PARTITION_ENTRY_SIZE];
        bytes[PE_BOOT_INDICATOR] = 0x00;
        bytes[PE_CHS_START..PE_CHS_START + 3].copy_from_slice(&Chs::from_byte_offset(offset).encode());
        bytes[PE_TYPE] = PARTITION_TYPE_FAT32;
        bytes[PE_CHS_END..PE_CHS_END + 3].copy_from_slice(&Chs::from_byte_offset(offset + size).encode());
        LittleEndian::write_u32(&mut bytes[PE_LBA_START..PE_LBA_START + 4], lba);
        LittleEndian::write_u32(&mut bytes[PE_SECTOR_COUNT..PE_SECTOR_COUNT + 4], count);

        Self(bytes)
    }

    /// An all-zero slot is unused
    pub fn is_empty(&self) -> bool {
        self.0.iter().all(|&b| b == 0)
    }

    pub fn as_bytes(&self) -> &[u8; PARTITION_ENTRY_SIZE] {
        &self.0
    }

    pub fn bootable(&self) -> bool {
        self.0[PE_BOOT_INDICATOR] == 0x80
    }

    pub fn partition_type(&self) -> u8 {
        self.0[PE_TYPE]
    }

    pub fn start_chs(&self) -> Chs {
        Chs::decode([self.0[PE_CHS_START], self.0[PE_CHS_START + 1], self.0[PE_CHS_START + 2]])
    }

    pub fn end_chs(&self) -> Chs {
        Chs::decode([self.0[PE_CHS_END], self.0[PE_CHS_END + 1], self.0[PE_CHS_END + 2]])
    }

    pub fn start_lba(&self) -> u32 {
        LittleEndian::read_u32(&self.0[PE_LBA_START..PE_LBA_START + 4])
    }

    pub fn sector_count(&self) -> u32 {
        LittleEndian::read_u32(&self.0[PE_SECTOR_COUNT..PE_SECTOR_COUNT + 4])
    }

    pub fn byte_offset(&self) -> u64 {
        self.start_lba() as u64 * SECTOR_SIZE
    }

    pub fn byte_size(&self) -> u64 {
        self.sector_count() as u64 * SECTOR_SIZE
    }

    pub fn type_name(&self) -> &'static str {
        match self.partition_type() {
            0x00 => "Empty",
            0x01 => "FAT12",
            0x04 => "FAT16 (<32MB)",
            0x05 => "Extended",
            0x06 => "FAT16",
            0x07 => "NTFS/exFAT",
            0x0B => "FAT32 (CHS)",
            0x0C => "FAT32 (LBA)",
            0x0E => "FAT16 (LBA)",
            0x0F => "Extended (LBA)",
            0x17 => "Hidden NTFS/exFAT",
            0x82 => "Linux swap",
            0x83 => "Linux",
            0xEE => "GPT Protective",
            0xEF => "EFI System",
            _ => "Unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fat32_entry_layout() {
        let entry = PartitionEntry::fat32(1024 * 1024, 256 * 1024 * 1024);
        let bytes = entry.as_bytes();

        assert_eq!(bytes[0], 0x00);
        assert_eq!(&bytes[1..4], &[0x20, 0x21, 0x00]);
        assert_eq!(bytes[4], 0x0B);
        assert_eq!(&bytes[8..12], &2048u32.to_le_bytes());
        assert_eq!(&bytes[12..16], &524288u32.to_le_bytes());

        assert!(!entry.bootable());
        assert_eq!(entry.type_name(), "FAT32 (CHS)");
        assert_eq!(entry.start_lba(), 2048);
        assert_eq!(entry.sector_count(), 524288);
        assert_eq!(entry.byte_offset(), 1024 * 1024);
        assert_eq!(entry.byte_size(), 256 * 1024 * 1024);
    }

    #[test]
    fn test_end_chs_uses_end_offset() {
        let entry = PartitionEntry::fat32(1024 * 1024, 256 * 1024 * 1024);
        assert_eq!(entry.start_chs().to_lba(), 2048);
        assert_eq!(entry.end_chs().to_lba(), 2048 + 524288);
    }

    #[test]
    fn test_unaligned_values_truncate() {
        let entry = PartitionEntry::fat32(1024 * 1024 + 100, 4096 + 511);
        assert_eq!(entry.start_lba(), 2048);
        assert_eq!(entry.sector_count(), 8);
    }

    #[test]
    fn test_empty_slot() {
        assert!(PartitionEntry::from_bytes([0u8; 16]).is_empty());

        let mut bytes = [0u8; 16];
        bytes[15] = 1;
        assert!(!PartitionEntry::from_bytes(bytes).is_empty());
    }
}
