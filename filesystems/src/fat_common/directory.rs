// Short (8.3) directory entries for the FAT32 root directory

use byteorder::{ByteOrder, LittleEndian};
use overlay_core::DiskError;

use super::constants::*;
use super::timestamps::DosTimestamp;

/// Directory entry attributes
pub mod attributes {
    pub const ATTR_VOLUME_ID: u8 = 0x08;
    pub const ATTR_ARCHIVE: u8 = 0x20;
}

/// One 32-byte short directory entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortDirEntry {
    pub name: [u8; 11],
    pub attributes: u8,
    pub created: DosTimestamp,
    pub accessed_date: u16,
    pub modified: DosTimestamp,
    pub first_cluster: u32,
    pub file_size: u32,
}

impl ShortDirEntry {
    /// Volume label entry; carries no data
    pub fn volume_label(label: [u8; 11], timestamp: DosTimestamp) -> Self {
        Self {
            name: label,
            attributes: attributes::ATTR_VOLUME_ID,
            created: timestamp,
            accessed_date: timestamp.date,
            modified: timestamp,
            first_cluster: 0,
            file_size: 0,
        }
    }

    /// Regular file entry with archive bit set
    pub fn file(name: [u8; 11], first_cluster: u32, file_size: u32, timestamp: DosTimestamp) -> Self {
        Self {
            name,
            attributes: attributes::ATTR_ARCHIVE,
            created: timestamp,
            accessed_date: timestamp.date,
            modified: timestamp,
            first_cluster,
            file_size,
        }
    }

    pub fn to_bytes(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut entry = [0u8; DIR_ENTRY_SIZE];

        entry[DIR_NAME..DIR_NAME + 11].copy_from_slice(&self.name);
        entry[DIR_ATTR] = self.attributes;
        entry[DIR_NT_RES] = 0;
        entry[DIR_CRT_TIME_TENTH] = 0;
        LittleEndian::write_u16(&mut entry[DIR_CRT_TIME..DIR_CRT_TIME + 2], self.created.time);
        LittleEndian::write_u16(&mut entry[DIR_CRT_DATE..DIR_CRT_DATE + 2], self.created.date);
        LittleEndian::write_u16(&mut entry[DIR_LST_ACC_DATE..DIR_LST_ACC_DATE + 2], self.accessed_date);
        LittleEndian::write_u16(&mut entry[DIR_FST_CLUS_HI..DIR_FST_CLUS_HI + 2], (self.first_cluster >> 16) as u16);
        LittleEndian::write_u16(&mut entry[DIR_WRT_TIME..DIR_WRT_TIME + 2], self.modified.time);
        LittleEndian::write_u16(&mut entry[DIR_WRT_DATE..DIR_WRT_DATE + 2], self.modified.date);
        LittleEndian::write_u16(&mut entry[DIR_FST_CLUS_LO..DIR_FST_CLUS_LO + 2], self.first_cluster as u16);
        LittleEndian::write_u32(&mut entry[DIR_FILE_SIZE..DIR_FILE_SIZE + 4], self.file_size);

        entry
    }

    pub fn parse(entry: &[u8]) -> Option<Self> {
        if entry.len() < DIR_ENTRY_SIZE || entry[DIR_NAME] == 0x00 {
            return None;
        }

        let mut name = [0u8; 11];
        name.copy_from_slice(&entry[DIR_NAME..DIR_NAME + 11]);
        let cluster_hi = LittleEndian::read_u16(&entry[DIR_FST_CLUS_HI..DIR_FST_CLUS_HI + 2]) as u32;
        let cluster_lo = LittleEndian::read_u16(&entry[DIR_FST_CLUS_LO..DIR_FST_CLUS_LO + 2]) as u32;

        Some(Self {
            name,
            attributes: entry[DIR_ATTR],
            created: DosTimestamp {
                time: LittleEndian::read_u16(&entry[DIR_CRT_TIME..DIR_CRT_TIME + 2]),
                date: LittleEndian::read_u16(&entry[DIR_CRT_DATE..DIR_CRT_DATE + 2]),
            },
            accessed_date: LittleEndian::read_u16(&entry[DIR_LST_ACC_DATE..DIR_LST_ACC_DATE + 2]),
            modified: DosTimestamp {
                time: LittleEndian::read_u16(&entry[DIR_WRT_TIME..DIR_WRT_TIME + 2]),
                date: LittleEndian::read_u16(&entry[DIR_WRT_DATE..DIR_WRT_DATE + 2]),
            },
            first_cluster: (cluster_hi << 16) | cluster_lo,
            file_size: LittleEndian::read_u32(&entry[DIR_FILE_SIZE..DIR_FILE_SIZE + 4]),
        })
    }

    pub fn is_volume_label(&self) -> bool {
        self.attributes & attributes::ATTR_VOLUME_ID != 0
    }
}

/// Convert a volume label to FAT format (11 bytes, upper-case, space-padded)
pub fn format_volume_label(label: &str) -> [u8; 11] {
    let mut result = [0x20u8; 11];
    let label = label.to_uppercase();
    let bytes = label.as_bytes();
    let len = bytes.len().min(11);
    result[..len].copy_from_slice(&bytes[..len]);
    result
}

/// Parse 8.3 filename format
pub fn parse_83_name(name: &[u8; 11]) -> String {
    let mut result = String::new();

    for &byte in &name[0..8] {
        if byte == 0x20 || byte == 0x00 {
            break;
        }
        result.push(byte as char);
    }

    let ext_start = result.len();
    for &byte in &name[8..11] {
        if byte != 0x20 && byte != 0x00 {
            if result.len() == ext_start {
                result.push('.');
            }
            result.push(byte as char);
        }
    }

    result
}

/// Format a filename to 8.3 format
pub fn format_83_name(filename: &str) -> Result<[u8; 11], DiskError> {
    let mut result = [0x20u8; 11];

    let upper = filename.to_uppercase();
    let parts: Vec<&str> = upper.splitn(2, '.').collect();

    // Base name (max 8 chars)
    let base = parts[0];
    if base.is_empty() || base.len() > 8 {
        return Err(DiskError::InvalidInput(format!("Invalid filename: {}", filename)));
    }

    for (i, byte) in base.bytes().enumerate() {
        if !is_valid_83_char(byte) {
            return Err(DiskError::InvalidInput(format!("Invalid character in filename: {}", filename)));
        }
        result[i] = byte;
    }

    // Extension (max 3 chars)
    if let Some(ext) = parts.get(1) {
        if ext.len() > 3 {
            return Err(DiskError::InvalidInput(format!("Extension too long: {}", ext)));
        }

        for (i, byte) in ext.bytes().enumerate() {
            if !is_valid_83_char(byte) {
                return Err(DiskError::InvalidInput(format!("Invalid character in extension: {}", ext)));
            }
            result[8 + i] = byte;
        }
    }

    Ok(result)
}

/// Check if a character is valid for 8.3 filenames
fn is_valid_83_char(c: u8) -> bool {
    matches!(
        c,
        b'A'..=b'Z' | b'0'..=b'9' | b'!' | b'#' | b'$' | b'%' | b'&' |
        b'\'' | b'(' | b')' | b'-' | b'@' | b'^' | b'_' | b'`' |
        b'{' | b'}' | b'~'
    )
}
