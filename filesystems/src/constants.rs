// Disk-level constants shared by the partitioner, the sector writer and the
// overlay formatter. Geometry here is synthetic: it only exists to fill the
// legacy CHS fields and has nothing to do with the real medium.

/// Logical sector size used for every LBA and layout calculation
pub const SECTOR_SIZE: u64 = 512;

/// Byte offset of the primary partition table inside the MBR
pub const PARTITION_TABLE_OFFSET: u64 = 446;

/// Size of one primary partition entry
pub const PARTITION_ENTRY_SIZE: usize = 16;

/// Legacy primary table limit
pub const MAX_PARTITIONS: usize = 4;

/// Synthetic heads per cylinder used for CHS encoding
pub const CHS_HEADS_PER_CYLINDER: u64 = 255;

/// Synthetic sectors per track used for CHS encoding
pub const CHS_SECTORS_PER_TRACK: u64 = 63;

/// Highest cylinder the 10-bit CHS cylinder field can hold
pub const CHS_MAX_CYLINDER: u64 = 1023;

/// Partition type written for the overlay entry (FAT32 with CHS addressing)
pub const PARTITION_TYPE_FAT32: u8 = 0x0B;

/// Chunk size for zero fills; bounds the gap between progress reports
pub const ZERO_CHUNK_SIZE: usize = 512;
