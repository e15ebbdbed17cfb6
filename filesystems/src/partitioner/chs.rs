// Legacy cylinder/head/sector addressing for MBR entries
//
// Firmware that still reads CHS fields expects the classic 3-byte packing:
//   byte 0: head
//   byte 1: cylinder bits 8-9 in bits 6-7, sector (1-based) in bits 0-5
//   byte 2: cylinder bits 0-7

use crate::constants::{CHS_HEADS_PER_CYLINDER, CHS_MAX_CYLINDER, CHS_SECTORS_PER_TRACK, SECTOR_SIZE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chs {
    pub cylinder: u32,
    pub head: u8,
    pub sector: u8,
}

impl Chs {
    /// Convert a linear sector index using the synthetic geometry.
    ///
    /// Cylinders above 1023 do not fit the on-disk field; `encode` keeps only
    /// their low 10 bits.
    pub fn from_lba(lba: u64) -> Self {
        let head = (lba / CHS_SECTORS_PER_TRACK) % CHS_HEADS_PER_CYLINDER;
        let sector = (lba % CHS_SECTORS_PER_TRACK) + 1;
        let cylinder = lba / (CHS_HEADS_PER_CYLINDER * CHS_SECTORS_PER_TRACK);

        Self {
            cylinder: cylinder as u32,
            head: head as u8,
            sector: sector as u8,
        }
    }

    /// CHS address of the sector containing `offset`
    pub fn from_byte_offset(offset: u64) -> Self {
        Self::from_lba(offset / SECTOR_SIZE)
    }

    pub fn encode(&self) -> [u8; 3] {
        [
            self.head,
            (((self.cylinder >> 2) & 0xC0) as u8) | (self.sector & 0x3F),
            (self.cylinder & 0xFF) as u8,
        ]
    }

    pub fn decode(bytes: [u8; 3]) -> Self {
        Self {
            cylinder: (((bytes[1] & 0xC0) as u32) << 2) | bytes[2] as u32,
            head: bytes[0],
            sector: bytes[1] & 0x3F,
        }
    }

    /// Linear sector index this address points at
    pub fn to_lba(&self) -> u64 {
        (self.cylinder as u64 * CHS_HEADS_PER_CYLINDER + self.head as u64) * CHS_SECTORS_PER_TRACK
            + (self.sector as u64).saturating_sub(1)
    }

    pub fn is_representable(&self) -> bool {
        self.cylinder as u64 <= CHS_MAX_CYLINDER
    }
}
