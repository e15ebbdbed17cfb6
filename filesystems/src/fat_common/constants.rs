// FAT32 on-disk constants: boot sector offsets, FSInfo layout, FAT entry
// values and directory entry fields

// Boot sector offsets
pub const BS_JMP_BOOT: usize = 0x00;
pub const BS_OEM_NAME: usize = 0x03;
pub const BPB_BYTES_PER_SEC: usize = 0x0B;
pub const BPB_SEC_PER_CLUS: usize = 0x0D;
pub const BPB_RSVD_SEC_CNT: usize = 0x0E;
pub const BPB_NUM_FATS: usize = 0x10;
pub const BPB_ROOT_ENT_CNT: usize = 0x11;
pub const BPB_TOT_SEC16: usize = 0x13;
pub const BPB_MEDIA: usize = 0x15;
pub const BPB_FAT_SZ16: usize = 0x16;
pub const BPB_SEC_PER_TRK: usize = 0x18;
pub const BPB_NUM_HEADS: usize = 0x1A;
pub const BPB_HIDD_SEC: usize = 0x1C;
pub const BPB_TOT_SEC32: usize = 0x20;

// FAT32-specific offsets (start at 36)
pub const BPB_FAT_SZ32: usize = 0x24;
pub const BPB_EXT_FLAGS: usize = 0x28;
pub const BPB_FS_VER: usize = 0x2A;
pub const BPB_ROOT_CLUS: usize = 0x2C;
pub const BPB_FS_INFO: usize = 0x30;
pub const BPB_BK_BOOT_SEC: usize = 0x32;
pub const BPB_RESERVED: usize = 0x34;
pub const BS32_DRV_NUM: usize = 0x40;
pub const BS32_RESERVED1: usize = 0x41;
pub const BS32_BOOT_SIG: usize = 0x42;
pub const BS32_VOL_ID: usize = 0x43;
pub const BS32_VOL_LAB: usize = 0x47;
pub const BS32_FIL_SYS_TYPE: usize = 0x52;

/// End of the BPB; boot code starts here
pub const BS32_BOOT_CODE: usize = 0x5A;

/// Bytes reserved for boot code between the BPB and the signature
pub const BOOT_CODE_REGION_SIZE: usize = 420;

// Boot sector signature
pub const BOOT_SIGNATURE: [u8; 2] = [0x55, 0xAA];
pub const BOOT_SIGNATURE_OFFSET: usize = 0x1FE;

// FSInfo sector
pub const FSI_LEAD_SIG: [u8; 4] = *b"RRaA";
pub const FSI_LEAD_SIG_OFFSET: usize = 0x000;
pub const FSI_STRUC_SIG: [u8; 4] = *b"rrAa";
pub const FSI_STRUC_SIG_OFFSET: usize = 0x1E4;
pub const FSI_FREE_COUNT: usize = 0x1E8;
pub const FSI_NXT_FREE: usize = 0x1EC;

// FAT entry values
pub const FAT32_MEDIA_ENTRY: u32 = 0x0FFFFFF8;  // FAT[0] for fixed media
pub const FAT32_RESERVED_ENTRY: u32 = 0x0FFFFFFF;  // FAT[1]
pub const FAT32_EOC: u32 = 0x0FFFFFF8;  // End of chain marker (28 bits)
pub const FAT32_EOF: u32 = 0x0FFFFFFF;  // End of file marker written after a chain
pub const FAT32_ENTRY_SIZE: u64 = 4;

// Cluster count thresholds
pub const FAT32_MIN_CLUSTERS: u64 = 65525;

// Standard values
pub const FAT32_RESERVED_SECTORS: u16 = 32;
pub const FAT32_NUM_FATS: u8 = 2;
pub const FAT32_ROOT_CLUSTER: u32 = 2;  // Standard root directory cluster for FAT32
pub const FAT32_FIRST_FILE_CLUSTER: u32 = 3;  // First cluster of the overlay file
pub const FAT32_FS_INFO_SECTOR: u16 = 1;  // FSInfo sector location
pub const FAT32_BACKUP_BOOT_SECTOR: u16 = 6;  // Backup boot sector location

// Media descriptors
pub const MEDIA_FIXED: u8 = 0xF8;  // Fixed disk

// Geometry recorded in the BPB. These match the reference mkfs.fat output
// and are unrelated to the synthetic CHS geometry of the partition table.
pub const BPB_GEOMETRY_SECTORS_PER_TRACK: u16 = 0x3E;
pub const BPB_GEOMETRY_HEADS: u16 = 0xF7;

// Directory entries
pub const DIR_ENTRY_SIZE: usize = 32;
pub const DIR_NAME: usize = 0x00;
pub const DIR_ATTR: usize = 0x0B;
pub const DIR_NT_RES: usize = 0x0C;
pub const DIR_CRT_TIME_TENTH: usize = 0x0D;
pub const DIR_CRT_TIME: usize = 0x0E;
pub const DIR_CRT_DATE: usize = 0x10;
pub const DIR_LST_ACC_DATE: usize = 0x12;
pub const DIR_FST_CLUS_HI: usize = 0x14;
pub const DIR_WRT_TIME: usize = 0x16;
pub const DIR_WRT_DATE: usize = 0x18;
pub const DIR_FST_CLUS_LO: usize = 0x1A;
pub const DIR_FILE_SIZE: usize = 0x1C;
