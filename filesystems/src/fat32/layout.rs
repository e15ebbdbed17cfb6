// On-disk layout of a FAT32 overlay volume
// Everything is derived from the partition size alone. Nothing is cached;
// the formatter recomputes the layout on every call.

use overlay_core::DiskError;

use crate::constants::SECTOR_SIZE;
use crate::fat_common::{
    fat32_used_bytes, FAT32_FIRST_FILE_CLUSTER, FAT32_NUM_FATS, FAT32_RESERVED_SECTORS,
};

/// Upper bounds (in MiB) for each cluster size step, mirroring mkfs.fat
const CLUSTER_SIZE_THRESHOLDS_MB: [(u64, u64); 3] = [(260, 1), (8 * 1024, 8), (16 * 1024, 16)];
const LARGEST_SECTORS_PER_CLUSTER: u64 = 32;

/// Default number of file bytes explicitly zeroed
pub const DEFAULT_ZERO_FILL_LIMIT: u64 = 64 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayLayout {
    pub partition_size: u64,
    pub total_sectors: u64,
    pub sectors_per_cluster: u64,
    pub cluster_size: u64,
    /// Cluster estimate used to size the FAT
    pub cluster_count: u64,
    /// Sectors per FAT copy
    pub fat_length: u64,
    /// Reserved area, both FATs and the root directory cluster, in bytes
    pub header_size: u64,
    pub max_file_size: u64,
    pub zero_fill_length: u64,
    pub next_free_cluster: u64,
    pub free_cluster_count: u64,
}

/// Sectors per cluster for a partition of `size` bytes
pub fn sectors_per_cluster_for(size: u64) -> u64 {
    let size_mb = size / (1024 * 1024);
    CLUSTER_SIZE_THRESHOLDS_MB
        .iter()
        .find(|(limit, _)| size_mb <= *limit)
        .map(|&(_, sectors)| sectors)
        .unwrap_or(LARGEST_SECTORS_PER_CLUSTER)
}

fn align_up(number: u64, alignment: u64) -> u64 {
    (number + alignment - 1) & !(alignment - 1)
}

impl OverlayLayout {
    pub fn compute(size: u64) -> Result<Self, DiskError> {
        Self::compute_with_zero_fill(size, DEFAULT_ZERO_FILL_LIMIT)
    }

    pub fn compute_with_zero_fill(size: u64, zero_fill_limit: u64) -> Result<Self, DiskError> {
        let reserved = FAT32_RESERVED_SECTORS as u64;
        let num_fats = FAT32_NUM_FATS as u64;

        let total_sectors = size / SECTOR_SIZE;
        if total_sectors > u32::MAX as u64 {
            return Err(DiskError::InvalidInput(format!(
                "Partition of {} bytes exceeds the FAT32 sector count limit",
                size
            )));
        }

        let sectors_per_cluster = sectors_per_cluster_for(size);
        let cluster_size = sectors_per_cluster * SECTOR_SIZE;

        // Cluster count accounting for the space the FATs themselves take
        let fat_data = total_sectors.checked_sub(reserved).ok_or_else(|| too_small(size))?;
        let cluster_count = (fat_data * SECTOR_SIZE + num_fats * 8) / (cluster_size + num_fats * 4);
        let fat_length = align_up(
            ((cluster_count + 2) * 4 + SECTOR_SIZE - 1) / SECTOR_SIZE,
            sectors_per_cluster,
        );

        let header_size = (reserved + fat_length * num_fats + sectors_per_cluster) * SECTOR_SIZE;
        let available = size.checked_sub(header_size).ok_or_else(|| too_small(size))?;
        if available < 2 * SECTOR_SIZE {
            return Err(too_small(size));
        }

        // One sector short of the space left, never past the 32-bit size field
        let max_file_size = align_up(available.min(u32::MAX as u64) - SECTOR_SIZE - 1, SECTOR_SIZE);
        let zero_fill_length = max_file_size.min(zero_fill_limit);
        let next_free_cluster = FAT32_FIRST_FILE_CLUSTER as u64 + max_file_size / cluster_size + 1;
        let free_cluster_count = available / cluster_size + 1;

        if fat32_used_bytes(next_free_cluster) > fat_length * SECTOR_SIZE {
            return Err(DiskError::InvalidInput(format!(
                "Cluster chain of {} entries does not fit a FAT of {} sectors",
                next_free_cluster, fat_length
            )));
        }

        Ok(Self {
            partition_size: size,
            total_sectors,
            sectors_per_cluster,
            cluster_size,
            cluster_count,
            fat_length,
            header_size,
            max_file_size,
            zero_fill_length,
            next_free_cluster,
            free_cluster_count,
        })
    }

    /// Bytes the formatter writes: header plus the zeroed file prefix
    pub fn total_bytes(&self) -> u64 {
        self.header_size + self.zero_fill_length
    }

    /// Offset of FAT copy `index` relative to the partition start
    pub fn fat_offset(&self, index: u64) -> u64 {
        (FAT32_RESERVED_SECTORS as u64 + index * self.fat_length) * SECTOR_SIZE
    }

    /// Offset of the root directory cluster relative to the partition start
    pub fn root_dir_offset(&self) -> u64 {
        self.fat_offset(FAT32_NUM_FATS as u64)
    }

    /// Offset of the overlay file's first cluster relative to the partition start
    pub fn file_offset(&self) -> u64 {
        self.root_dir_offset() + self.cluster_size
    }
}

fn too_small(size: u64) -> DiskError {
    DiskError::InvalidInput(format!("Partition of {} bytes is too small for a FAT32 overlay", size))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_cluster_size_thresholds() {
        assert_eq!(sectors_per_cluster_for(256 * MIB), 1);
        assert_eq!(sectors_per_cluster_for(260 * MIB), 1);
        assert_eq!(sectors_per_cluster_for(261 * MIB), 8);
        assert_eq!(sectors_per_cluster_for(8192 * MIB), 8);
        assert_eq!(sectors_per_cluster_for(8193 * MIB), 16);
        assert_eq!(sectors_per_cluster_for(16384 * MIB), 16);
        assert_eq!(sectors_per_cluster_for(16385 * MIB), 32);
        assert_eq!(sectors_per_cluster_for(64 * 1024 * MIB), 32);
    }

    #[test]
    fn test_256_mib_layout() {
        let layout = OverlayLayout::compute(256 * MIB).unwrap();

        assert_eq!(layout.total_sectors, 524288);
        assert_eq!(layout.sectors_per_cluster, 1);
        assert_eq!(layout.cluster_size, 512);
        assert_eq!(layout.cluster_count, 516190);
        assert_eq!(layout.fat_length, 4033);
        assert_eq!(layout.header_size, 8099 * 512);
        assert_eq!(layout.max_file_size, 264288256);
        assert_eq!(layout.zero_fill_length, 65536);
        assert_eq!(layout.next_free_cluster, 516192);
        assert_eq!(layout.free_cluster_count, 516190);
        assert_eq!(layout.total_bytes(), 8099 * 512 + 65536);
        assert_eq!(layout.root_dir_offset(), (32 + 2 * 4033) * 512);
    }

    #[test]
    fn test_large_file_is_capped_at_32_bits() {
        let layout = OverlayLayout::compute(8 * 1024 * MIB).unwrap();
        assert_eq!(layout.sectors_per_cluster, 8);
        assert_eq!(layout.max_file_size, 0xFFFF_FE00);
        assert!(layout.max_file_size <= u32::MAX as u64);
    }

    #[test]
    fn test_invariants_over_size_range() {
        let mut size = 4 * MIB;
        while size <= 2 * 1024 * 1024 * MIB {
            let layout = OverlayLayout::compute(size).unwrap();
            assert!(layout.total_bytes() <= size, "size {}", size);
            assert_eq!(layout.fat_length % layout.sectors_per_cluster, 0, "size {}", size);
            assert_eq!(layout.max_file_size % SECTOR_SIZE, 0);
            assert!(layout.max_file_size < size - layout.header_size);
            assert!(fat32_used_bytes(layout.next_free_cluster) <= layout.fat_length * SECTOR_SIZE);
            size = size * 3 / 2 / SECTOR_SIZE * SECTOR_SIZE;
        }
    }

    #[test]
    fn test_custom_zero_fill_limit() {
        let layout = OverlayLayout::compute_with_zero_fill(256 * MIB, 1024 * 1024).unwrap();
        assert_eq!(layout.zero_fill_length, 1024 * 1024);
    }

    #[test]
    fn test_rejects_unsupported_sizes() {
        assert!(matches!(OverlayLayout::compute(8 * 512), Err(DiskError::InvalidInput(_))));
        assert!(matches!(OverlayLayout::compute(36 * 512), Err(DiskError::InvalidInput(_))));
        assert!(matches!(
            OverlayLayout::compute((u32::MAX as u64 + 1) * SECTOR_SIZE),
            Err(DiskError::InvalidInput(_))
        ));
    }
}
