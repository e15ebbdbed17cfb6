// Native FAT32 overlay formatter
// Streams a complete FAT32 volume holding one pre-allocated file onto a
// partition range. Every structure is written sequentially from the
// partition start, so the whole header is a single contiguous run.

use chrono::{DateTime, Utc};
use overlay_core::{DiskError, OverlayOptions, RawDevice};
use log::{debug, info, warn};

use crate::constants::SECTOR_SIZE;
use crate::device_writer::SectorWriter;
use crate::fat_common::{
    build_fat32_boot_sector, build_fat32_sector, build_fsinfo_sector, fat32_used_sectors,
    format_83_name, format_volume_label, generate_volume_serial, DosTimestamp, Fat32BootParams,
    ShortDirEntry, DIR_ENTRY_SIZE, FAT32_BACKUP_BOOT_SECTOR, FAT32_FIRST_FILE_CLUSTER,
    FAT32_FS_INFO_SECTOR, FAT32_MIN_CLUSTERS, FAT32_NUM_FATS, FAT32_RESERVED_SECTORS,
};
use super::layout::OverlayLayout;

/// What a format call wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatReport {
    pub layout: OverlayLayout,
    pub volume_serial: u32,
    pub timestamp: DosTimestamp,
    pub bytes_written: u64,
}

pub struct Fat32OverlayFormatter;

impl Fat32OverlayFormatter {
    /// Write the overlay volume for the partition at `offset` spanning `size` bytes
    pub fn format<D: RawDevice + ?Sized>(
        writer: &mut SectorWriter<'_, D>,
        offset: u64,
        size: u64,
        options: &OverlayOptions,
        now: &DateTime<Utc>,
    ) -> Result<FormatReport, DiskError> {
        options.validate()?;
        let volume_label = format_volume_label(&options.volume_label);
        let file_name = format_83_name(&options.file_name)?;

        let layout = OverlayLayout::compute_with_zero_fill(size, options.zero_fill_limit)?;
        info!(
            "FAT32 overlay: {} sectors, {} sectors/cluster, {} sectors/FAT, file of {} bytes",
            layout.total_sectors, layout.sectors_per_cluster, layout.fat_length, layout.max_file_size
        );
        if layout.cluster_count < FAT32_MIN_CLUSTERS {
            warn!(
                "Only {} clusters; some FAT32 readers may treat this volume as FAT16",
                layout.cluster_count
            );
        }

        let volume_serial = generate_volume_serial(now);
        let timestamp = DosTimestamp::from_datetime(now);

        let boot_sector = build_fat32_boot_sector(&Fat32BootParams {
            sectors_per_cluster: layout.sectors_per_cluster as u8,
            total_sectors: layout.total_sectors as u32,
            sectors_per_fat: layout.fat_length as u32,
            volume_serial,
            volume_label,
        });
        let fsinfo = build_fsinfo_sector(
            layout.free_cluster_count as u32,
            layout.next_free_cluster as u32,
        );

        writer.seek_to(offset)?;
        writer.begin(layout.total_bytes());

        Self::write_reserved_area(writer, &boot_sector, &fsinfo)?;
        for fat_num in 0..FAT32_NUM_FATS {
            Self::write_fat(writer, &layout)?;
            debug!("Wrote FAT copy {}", fat_num);
        }
        Self::write_root_directory(writer, &layout, volume_label, file_name, timestamp)?;

        writer.write_zeros(layout.zero_fill_length)?;
        writer.flush()?;

        let bytes_written = writer.bytes_written();
        info!(
            "FAT32 overlay written at offset {} ({} bytes, serial {:08X})",
            offset, bytes_written, volume_serial
        );

        Ok(FormatReport {
            layout,
            volume_serial,
            timestamp,
            bytes_written,
        })
    }

    /// Boot sector, FSInfo, backup boot sector and the padding between them
    fn write_reserved_area<D: RawDevice + ?Sized>(
        writer: &mut SectorWriter<'_, D>,
        boot_sector: &[u8; 512],
        fsinfo: &[u8; 512],
    ) -> Result<(), DiskError> {
        let backup = FAT32_BACKUP_BOOT_SECTOR as u64;
        let reserved = FAT32_RESERVED_SECTORS as u64;

        writer.write_bytes(boot_sector)?;
        writer.write_bytes(fsinfo)?;
        writer.write_zeros((backup - FAT32_FS_INFO_SECTOR as u64 - 1) * SECTOR_SIZE)?;
        writer.write_bytes(boot_sector)?;
        writer.write_zeros((reserved - backup - 1) * SECTOR_SIZE)?;
        debug!("Wrote reserved area with backup boot sector at sector {}", backup);
        Ok(())
    }

    /// One FAT copy: chain sectors followed by free (zero) sectors
    fn write_fat<D: RawDevice + ?Sized>(
        writer: &mut SectorWriter<'_, D>,
        layout: &OverlayLayout,
    ) -> Result<(), DiskError> {
        let used_sectors = fat32_used_sectors(layout.next_free_cluster);
        for sector in 0..used_sectors {
            writer.write_bytes(&build_fat32_sector(sector, layout.next_free_cluster))?;
        }
        writer.write_zeros((layout.fat_length - used_sectors) * SECTOR_SIZE)
    }

    /// Root directory cluster: volume label entry, file entry, zero padding
    fn write_root_directory<D: RawDevice + ?Sized>(
        writer: &mut SectorWriter<'_, D>,
        layout: &OverlayLayout,
        volume_label: [u8; 11],
        file_name: [u8; 11],
        timestamp: DosTimestamp,
    ) -> Result<(), DiskError> {
        let label_entry = ShortDirEntry::volume_label(volume_label, timestamp);
        let file_entry = ShortDirEntry::file(
            file_name,
            FAT32_FIRST_FILE_CLUSTER,
            layout.max_file_size as u32,
            timestamp,
        );

        writer.write_bytes(&label_entry.to_bytes())?;
        writer.write_bytes(&file_entry.to_bytes())?;
        writer.write_zeros(layout.cluster_size - 2 * DIR_ENTRY_SIZE as u64)
    }
}
