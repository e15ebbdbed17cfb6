// Partition table and FAT32 overlay engine operating on a raw device handle

pub mod constants;
pub mod device_writer;
pub mod partitioner;
pub mod fat_common;
pub mod fat32;
pub mod disk_manager;

pub use device_writer::SectorWriter;
pub use partitioner::{Chs, PartitionEntry, PartitionTable};
pub use fat32::{
    Fat32OverlayFormatter, FormatReport, OverlayLayout, OverlayVerification, OverlayVerifier,
};
pub use disk_manager::DiskSession;
