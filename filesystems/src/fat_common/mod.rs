// Common FAT32 building blocks used by the overlay formatter and verifier

pub mod constants;
pub mod boot_sector;
pub mod directory;
pub mod fat_init;
pub mod timestamps;

pub use constants::*;
pub use boot_sector::*;
pub use directory::*;
pub use fat_init::*;
pub use timestamps::*;

use chrono::{DateTime, Utc};

/// Volume serial number derived from the wall clock, the way mkfs.fat
/// does it: the low 32 bits of the millisecond timestamp
pub fn generate_volume_serial(now: &DateTime<Utc>) -> u32 {
    (now.timestamp_millis() as u64 & 0xFFFF_FFFF) as u32
}
