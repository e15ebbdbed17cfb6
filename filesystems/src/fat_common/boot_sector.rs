// FAT32 boot sector and FSInfo sector builders
// The field values follow what mkfs.fat writes for a fixed disk, so the
// resulting volume matches a reference-formatted one byte for byte.

use static_assertions::const_assert_eq;

use super::constants::*;
use crate::constants::SECTOR_SIZE;

/// Real-mode stub that prints a message and waits for a key, then reboots.
/// It loads the message from 0x7C77, i.e. right behind the 29 code bytes.
pub const NON_BOOTABLE_STUB: [u8; 129] = *b"\x0e\x1f\xbe\x77\x7c\xac\x22\xc0\x74\x0b\x56\xb4\x0e\xbb\x07\x00\
\xcd\x10\x5e\xeb\xf0\x32\xe4\xcd\x16\xcd\x19\xeb\xfe\
This is not a bootable disk.  Please insert a bootable floppy and\r\n\
press any key to try again ... \r\n";

const_assert_eq!(BS32_BOOT_CODE, 90);
const_assert_eq!(BS32_BOOT_CODE + BOOT_CODE_REGION_SIZE, BOOT_SIGNATURE_OFFSET);
const_assert_eq!(BOOT_SIGNATURE_OFFSET + 2, SECTOR_SIZE as usize);
const_assert_eq!(FSI_NXT_FREE + 4 + 14, BOOT_SIGNATURE_OFFSET);

/// Variable fields of the FAT32 boot sector
#[derive(Debug, Clone)]
pub struct Fat32BootParams {
    pub sectors_per_cluster: u8,
    pub total_sectors: u32,
    pub sectors_per_fat: u32,
    pub volume_serial: u32,
    pub volume_label: [u8; 11],
}

/// Build a FAT32 boot sector (BPB, boot stub and signature)
pub fn build_fat32_boot_sector(params: &Fat32BootParams) -> [u8; 512] {
    let mut boot_sector = [0u8; 512];

    // Jump instruction
    boot_sector[BS_JMP_BOOT] = 0xEB;
    boot_sector[BS_JMP_BOOT + 1] = 0x58;
    boot_sector[BS_JMP_BOOT + 2] = 0x90;

    // OEM Name
    boot_sector[BS_OEM_NAME..BS_OEM_NAME + 8].copy_from_slice(b"mkfs.fat");

    // BPB Common fields
    boot_sector[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2]
        .copy_from_slice(&(SECTOR_SIZE as u16).to_le_bytes());
    boot_sector[BPB_SEC_PER_CLUS] = params.sectors_per_cluster;
    boot_sector[BPB_RSVD_SEC_CNT..BPB_RSVD_SEC_CNT + 2]
        .copy_from_slice(&FAT32_RESERVED_SECTORS.to_le_bytes());
    boot_sector[BPB_NUM_FATS] = FAT32_NUM_FATS;
    boot_sector[BPB_ROOT_ENT_CNT..BPB_ROOT_ENT_CNT + 2]
        .copy_from_slice(&0u16.to_le_bytes());  // Always 0 for FAT32
    boot_sector[BPB_TOT_SEC16..BPB_TOT_SEC16 + 2]
        .copy_from_slice(&0u16.to_le_bytes());
    boot_sector[BPB_MEDIA] = MEDIA_FIXED;
    boot_sector[BPB_FAT_SZ16..BPB_FAT_SZ16 + 2]
        .copy_from_slice(&0u16.to_le_bytes());  // Always 0 for FAT32
    boot_sector[BPB_SEC_PER_TRK..BPB_SEC_PER_TRK + 2]
        .copy_from_slice(&BPB_GEOMETRY_SECTORS_PER_TRACK.to_le_bytes());
    boot_sector[BPB_NUM_HEADS..BPB_NUM_HEADS + 2]
        .copy_from_slice(&BPB_GEOMETRY_HEADS.to_le_bytes());
    boot_sector[BPB_HIDD_SEC..BPB_HIDD_SEC + 4]
        .copy_from_slice(&0u32.to_le_bytes());
    boot_sector[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4]
        .copy_from_slice(&params.total_sectors.to_le_bytes());

    // FAT32 Extended BPB
    boot_sector[BPB_FAT_SZ32..BPB_FAT_SZ32 + 4]
        .copy_from_slice(&params.sectors_per_fat.to_le_bytes());
    boot_sector[BPB_EXT_FLAGS..BPB_EXT_FLAGS + 2]
        .copy_from_slice(&0u16.to_le_bytes());  // Mirroring enabled
    boot_sector[BPB_FS_VER..BPB_FS_VER + 2]
        .copy_from_slice(&0u16.to_le_bytes());
    boot_sector[BPB_ROOT_CLUS..BPB_ROOT_CLUS + 4]
        .copy_from_slice(&FAT32_ROOT_CLUSTER.to_le_bytes());
    boot_sector[BPB_FS_INFO..BPB_FS_INFO + 2]
        .copy_from_slice(&FAT32_FS_INFO_SECTOR.to_le_bytes());
    boot_sector[BPB_BK_BOOT_SEC..BPB_BK_BOOT_SEC + 2]
        .copy_from_slice(&FAT32_BACKUP_BOOT_SECTOR.to_le_bytes());
    // BPB_RESERVED (12 bytes) stays zero

    boot_sector[BS32_DRV_NUM] = 0x80;  // Hard disk
    boot_sector[BS32_RESERVED1] = 0;
    boot_sector[BS32_BOOT_SIG] = 0x29;  // Extended boot signature
    boot_sector[BS32_VOL_ID..BS32_VOL_ID + 4]
        .copy_from_slice(&params.volume_serial.to_le_bytes());
    boot_sector[BS32_VOL_LAB..BS32_VOL_LAB + 11]
        .copy_from_slice(&params.volume_label);
    boot_sector[BS32_FIL_SYS_TYPE..BS32_FIL_SYS_TYPE + 8]
        .copy_from_slice(b"FAT32   ");

    // Boot code, zero padded to the end of the region
    boot_sector[BS32_BOOT_CODE..BS32_BOOT_CODE + NON_BOOTABLE_STUB.len()]
        .copy_from_slice(&NON_BOOTABLE_STUB);

    // Boot signature
    boot_sector[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2]
        .copy_from_slice(&BOOT_SIGNATURE);

    boot_sector
}

/// Build the FSInfo sector with free cluster count and next free hint
pub fn build_fsinfo_sector(free_clusters: u32, next_free: u32) -> [u8; 512] {
    let mut fsinfo = [0u8; 512];

    fsinfo[FSI_LEAD_SIG_OFFSET..FSI_LEAD_SIG_OFFSET + 4].copy_from_slice(&FSI_LEAD_SIG);
    fsinfo[FSI_STRUC_SIG_OFFSET..FSI_STRUC_SIG_OFFSET + 4].copy_from_slice(&FSI_STRUC_SIG);
    fsinfo[FSI_FREE_COUNT..FSI_FREE_COUNT + 4].copy_from_slice(&free_clusters.to_le_bytes());
    fsinfo[FSI_NXT_FREE..FSI_NXT_FREE + 4].copy_from_slice(&next_free.to_le_bytes());
    fsinfo[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2].copy_from_slice(&BOOT_SIGNATURE);

    fsinfo
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> Fat32BootParams {
        Fat32BootParams {
            sectors_per_cluster: 8,
            total_sectors: 0x0040_0000,
            sectors_per_fat: 0x0000_0FF8,
            volume_serial: 0xDEADBEEF,
            volume_label: *b"OVERLAY    ",
        }
    }

    #[test]
    fn test_bpb_matches_reference_template() {
        let bs = build_fat32_boot_sector(&params());

        let expected_head: [u8; 90] = [
            0xeb, 0x58, 0x90, 0x6d, 0x6b, 0x66, 0x73, 0x2e, 0x66, 0x61, 0x74, 0x00,
            0x02, 0x08, 0x20, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, 0xf8, 0x00, 0x00,
            0x3e, 0x00, 0xf7, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x40, 0x00,
            0xf8, 0x0f, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00,
            0x01, 0x00, 0x06, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00, 0x80, 0x00, 0x29, 0xef, 0xbe, 0xad, 0xde, 0x4f,
            0x56, 0x45, 0x52, 0x4c, 0x41, 0x59, 0x20, 0x20, 0x20, 0x20, 0x46, 0x41,
            0x54, 0x33, 0x32, 0x20, 0x20, 0x20,
        ];
        assert_eq!(&bs[..90], &expected_head[..]);
    }

    #[test]
    fn test_boot_code_and_signature() {
        let bs = build_fat32_boot_sector(&params());

        assert_eq!(&bs[90..219], &NON_BOOTABLE_STUB[..]);
        assert!(bs[219..510].iter().all(|&b| b == 0));
        assert_eq!(&bs[510..512], &[0x55, 0xAA]);
        // The stub's message pointer lands on the text
        assert_eq!(&bs[0x77..0x77 + 4], b"This");
    }

    #[test]
    fn test_fsinfo_layout() {
        let fsinfo = build_fsinfo_sector(516190, 516192);

        assert_eq!(&fsinfo[0..4], &[0x52, 0x52, 0x61, 0x41]);
        assert!(fsinfo[4..484].iter().all(|&b| b == 0));
        assert_eq!(&fsinfo[484..488], &[0x72, 0x72, 0x41, 0x61]);
        assert_eq!(&fsinfo[488..492], &516190u32.to_le_bytes());
        assert_eq!(&fsinfo[492..496], &516192u32.to_le_bytes());
        assert!(fsinfo[496..510].iter().all(|&b| b == 0));
        assert_eq!(&fsinfo[510..512], &[0x55, 0xAA]);
    }
}
