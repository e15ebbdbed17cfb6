// FAT32 table contents for a volume holding one contiguous file
//
// Entry layout:
// - FAT[0] = media entry, FAT[1] = reserved end-of-chain
// - FAT[2] = root directory (single cluster, end of chain)
// - FAT[3..next_free-1] link each file cluster to the next one
// - FAT[next_free-1] = end of file
// - everything after is free

use byteorder::{ByteOrder, LittleEndian};

use super::constants::*;
use crate::constants::SECTOR_SIZE;

const ENTRIES_PER_SECTOR: u64 = SECTOR_SIZE / FAT32_ENTRY_SIZE;

/// Value of FAT entry `index` for a file chain that ends right before
/// `next_free_cluster`
pub fn fat32_entry(index: u64, next_free_cluster: u64) -> u32 {
    let first = FAT32_FIRST_FILE_CLUSTER as u64;
    match index {
        0 => FAT32_MEDIA_ENTRY,
        1 => FAT32_RESERVED_ENTRY,
        i if i == FAT32_ROOT_CLUSTER as u64 => FAT32_EOC,
        i if i + 1 == next_free_cluster => FAT32_EOF,
        i if i >= first && i + 1 < next_free_cluster => (i + 1) as u32,
        _ => 0,
    }
}

/// Bytes at the start of each FAT that hold non-zero entries
pub fn fat32_used_bytes(next_free_cluster: u64) -> u64 {
    next_free_cluster * FAT32_ENTRY_SIZE
}

/// Number of leading FAT sectors containing used entries
pub fn fat32_used_sectors(next_free_cluster: u64) -> u64 {
    (fat32_used_bytes(next_free_cluster) + SECTOR_SIZE - 1) / SECTOR_SIZE
}

/// Build one FAT sector
pub fn build_fat32_sector(sector_index: u64, next_free_cluster: u64) -> [u8; 512] {
    let mut sector = [0u8; 512];
    let first_entry = sector_index * ENTRIES_PER_SECTOR;

    for (slot, chunk) in sector.chunks_exact_mut(FAT32_ENTRY_SIZE as usize).enumerate() {
        let value = fat32_entry(first_entry + slot as u64, next_free_cluster);
        LittleEndian::write_u32(chunk, value);
    }

    sector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reserved_header_matches_reference() {
        let sector = build_fat32_sector(0, 200);
        assert_eq!(
            &sector[0..12],
            &[0xf8, 0xff, 0xff, 0x0f, 0xff, 0xff, 0xff, 0x0f, 0xf8, 0xff, 0xff, 0x0f]
        );
    }

    #[test]
    fn test_chain_links_and_terminator() {
        let next_free = 200;
        let sector = build_fat32_sector(0, next_free);

        for cluster in 3..next_free - 1 {
            let offset = (cluster * 4) as usize;
            assert_eq!(LittleEndian::read_u32(&sector[offset..offset + 4]), cluster as u32 + 1);
        }
        let eof = ((next_free - 1) * 4) as usize;
        assert_eq!(&sector[eof..eof + 4], &[0xff, 0xff, 0xff, 0x0f]);
        assert!(sector[eof + 4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_chain_crosses_sector_boundary() {
        let next_free = 300;
        assert_eq!(fat32_used_sectors(next_free), 3);

        let second = build_fat32_sector(1, next_free);
        // Entry 128 is the first entry of sector 1
        assert_eq!(LittleEndian::read_u32(&second[0..4]), 129);

        let third = build_fat32_sector(2, next_free);
        let eof = ((299 - 256) * 4) as usize;
        assert_eq!(LittleEndian::read_u32(&third[eof..eof + 4]), FAT32_EOF);
        assert!(third[eof + 4..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_shortest_chain() {
        assert_eq!(fat32_entry(3, 4), FAT32_EOF);
        assert_eq!(fat32_entry(4, 4), 0);
    }
}
