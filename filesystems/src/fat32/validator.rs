// Read-back verification of a written FAT32 overlay volume
use byteorder::{ByteOrder, LittleEndian};
use overlay_core::{DiskError, RawDevice};
use std::io::SeekFrom;
use log::info;

use crate::constants::SECTOR_SIZE;
use crate::fat_common::{
    parse_83_name, ShortDirEntry, BOOT_SIGNATURE, BOOT_SIGNATURE_OFFSET, BPB_BK_BOOT_SEC,
    BPB_BYTES_PER_SEC, BPB_FAT_SZ32, BPB_FS_INFO, BPB_NUM_FATS, BPB_RSVD_SEC_CNT, BPB_ROOT_CLUS,
    BPB_SEC_PER_CLUS, BPB_TOT_SEC32, BS32_FIL_SYS_TYPE, BS32_VOL_ID, BS32_VOL_LAB,
    DIR_ENTRY_SIZE, FAT32_FIRST_FILE_CLUSTER, FAT32_MEDIA_ENTRY, FAT32_RESERVED_ENTRY,
    FSI_FREE_COUNT, FSI_LEAD_SIG, FSI_LEAD_SIG_OFFSET, FSI_NXT_FREE, FSI_STRUC_SIG,
    FSI_STRUC_SIG_OFFSET,
};

#[derive(Debug, Default)]
pub struct OverlayVerification {
    pub is_valid: bool,
    pub sectors_per_cluster: u8,
    pub total_sectors: u32,
    pub fat_length: u32,
    pub volume_serial: u32,
    pub volume_label: String,
    pub free_clusters: u32,
    pub next_free_cluster: u32,
    pub file_name: Option<String>,
    pub file_size: Option<u32>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

pub struct OverlayVerifier;

impl OverlayVerifier {
    /// Verify the overlay volume whose boot sector sits at `offset`
    pub fn verify<D: RawDevice + ?Sized>(device: &mut D, offset: u64) -> Result<OverlayVerification, DiskError> {
        let mut result = OverlayVerification { is_valid: true, ..Default::default() };

        let boot = read_sector(device, offset, 0)?;
        Self::check_boot_sector(&boot, &mut result);
        if !result.is_valid {
            return Ok(result);
        }

        let fs_info_sector = LittleEndian::read_u16(&boot[BPB_FS_INFO..BPB_FS_INFO + 2]) as u64;
        let fsinfo = read_sector(device, offset, fs_info_sector)?;
        Self::check_fsinfo(&fsinfo, &mut result);

        let backup_sector = LittleEndian::read_u16(&boot[BPB_BK_BOOT_SEC..BPB_BK_BOOT_SEC + 2]) as u64;
        if read_sector(device, offset, backup_sector)? != boot {
            result.errors.push(format!("Backup boot sector {} differs from primary", backup_sector));
            result.is_valid = false;
        }

        let reserved = LittleEndian::read_u16(&boot[BPB_RSVD_SEC_CNT..BPB_RSVD_SEC_CNT + 2]) as u64;
        let num_fats = boot[BPB_NUM_FATS] as u64;
        let fat_length = result.fat_length as u64;

        let first_fat = read_sector(device, offset, reserved)?;
        Self::check_fat(&first_fat, &mut result);
        for copy in 1..num_fats {
            if read_sector(device, offset, reserved + copy * fat_length)? != first_fat {
                result.errors.push(format!("FAT copy {} differs from FAT 0", copy));
                result.is_valid = false;
            }
        }

        let root = read_sector(device, offset, reserved + num_fats * fat_length)?;
        Self::check_root_directory(&root, &mut result);

        info!(
            "Verified overlay at offset {}: {} ({} errors, {} warnings)",
            offset,
            if result.is_valid { "valid" } else { "invalid" },
            result.errors.len(),
            result.warnings.len()
        );
        Ok(result)
    }

    fn check_boot_sector(boot: &[u8; 512], result: &mut OverlayVerification) {
        if boot[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2] != BOOT_SIGNATURE {
            result.errors.push(format!(
                "Invalid boot signature: {:02X}{:02X} (should be 55AA)",
                boot[BOOT_SIGNATURE_OFFSET],
                boot[BOOT_SIGNATURE_OFFSET + 1]
            ));
            result.is_valid = false;
        }
        if &boot[BS32_FIL_SYS_TYPE..BS32_FIL_SYS_TYPE + 8] != b"FAT32   " {
            result.errors.push("Filesystem type is not FAT32".to_string());
            result.is_valid = false;
        }
        let bytes_per_sector = LittleEndian::read_u16(&boot[BPB_BYTES_PER_SEC..BPB_BYTES_PER_SEC + 2]);
        if bytes_per_sector as u64 != SECTOR_SIZE {
            result.errors.push(format!("Unsupported sector size {}", bytes_per_sector));
            result.is_valid = false;
        }
        if LittleEndian::read_u32(&boot[BPB_ROOT_CLUS..BPB_ROOT_CLUS + 4]) != 2 {
            result.warnings.push("Root directory does not start at cluster 2".to_string());
        }

        result.sectors_per_cluster = boot[BPB_SEC_PER_CLUS];
        result.total_sectors = LittleEndian::read_u32(&boot[BPB_TOT_SEC32..BPB_TOT_SEC32 + 4]);
        result.fat_length = LittleEndian::read_u32(&boot[BPB_FAT_SZ32..BPB_FAT_SZ32 + 4]);
        result.volume_serial = LittleEndian::read_u32(&boot[BS32_VOL_ID..BS32_VOL_ID + 4]);
        result.volume_label = String::from_utf8_lossy(&boot[BS32_VOL_LAB..BS32_VOL_LAB + 11])
            .trim_end()
            .to_string();

        if result.sectors_per_cluster == 0 || !result.sectors_per_cluster.is_power_of_two() {
            result.errors.push(format!("Invalid sectors per cluster: {}", result.sectors_per_cluster));
            result.is_valid = false;
        }
        if result.fat_length == 0 {
            result.errors.push("FAT length is zero".to_string());
            result.is_valid = false;
        }
    }

    fn check_fsinfo(fsinfo: &[u8; 512], result: &mut OverlayVerification) {
        if fsinfo[FSI_LEAD_SIG_OFFSET..FSI_LEAD_SIG_OFFSET + 4] != FSI_LEAD_SIG
            || fsinfo[FSI_STRUC_SIG_OFFSET..FSI_STRUC_SIG_OFFSET + 4] != FSI_STRUC_SIG
            || fsinfo[BOOT_SIGNATURE_OFFSET..BOOT_SIGNATURE_OFFSET + 2] != BOOT_SIGNATURE
        {
            result.errors.push("FSInfo signatures are missing".to_string());
            result.is_valid = false;
            return;
        }
        result.free_clusters = LittleEndian::read_u32(&fsinfo[FSI_FREE_COUNT..FSI_FREE_COUNT + 4]);
        result.next_free_cluster = LittleEndian::read_u32(&fsinfo[FSI_NXT_FREE..FSI_NXT_FREE + 4]);
    }

    fn check_fat(fat: &[u8; 512], result: &mut OverlayVerification) {
        if LittleEndian::read_u32(&fat[0..4]) != FAT32_MEDIA_ENTRY {
            result.errors.push("FAT[0] does not hold the fixed-disk media entry".to_string());
            result.is_valid = false;
        }
        if LittleEndian::read_u32(&fat[4..8]) != FAT32_RESERVED_ENTRY {
            result.warnings.push("FAT[1] is not an end-of-chain marker".to_string());
        }
    }

    fn check_root_directory(root: &[u8; 512], result: &mut OverlayVerification) {
        match ShortDirEntry::parse(&root[..DIR_ENTRY_SIZE]) {
            Some(entry) if entry.is_volume_label() => {
                let label = String::from_utf8_lossy(&entry.name).trim_end().to_string();
                if label != result.volume_label {
                    result.warnings.push(format!(
                        "Directory label {:?} differs from boot sector label {:?}",
                        label, result.volume_label
                    ));
                }
            }
            _ => {
                result.errors.push("Root directory has no volume label entry".to_string());
                result.is_valid = false;
            }
        }

        match ShortDirEntry::parse(&root[DIR_ENTRY_SIZE..2 * DIR_ENTRY_SIZE]) {
            Some(entry) if !entry.is_volume_label() => {
                if entry.first_cluster != FAT32_FIRST_FILE_CLUSTER {
                    result.errors.push(format!(
                        "Overlay file starts at cluster {} instead of {}",
                        entry.first_cluster, FAT32_FIRST_FILE_CLUSTER
                    ));
                    result.is_valid = false;
                }
                result.file_name = Some(parse_83_name(&entry.name));
                result.file_size = Some(entry.file_size);
            }
            _ => {
                result.errors.push("Root directory has no overlay file entry".to_string());
                result.is_valid = false;
            }
        }
    }
}

fn read_sector<D: RawDevice + ?Sized>(device: &mut D, offset: u64, sector: u64) -> Result<[u8; 512], DiskError> {
    let position = offset + sector * SECTOR_SIZE;
    device
        .seek(SeekFrom::Start(position))
        .map_err(|e| DiskError::SeekFailure(format!("Failed to seek to sector {}: {}", sector, e)))?;

    let mut buffer = [0u8; 512];
    device
        .read_exact(&mut buffer)
        .map_err(|e| DiskError::ReadFailure(format!("Failed to read sector {}: {}", sector, e)))?;
    Ok(buffer)
}
