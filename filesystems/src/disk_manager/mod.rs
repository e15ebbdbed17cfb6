// Disk session - the entry point tying the partition table and the
// overlay formatter to one borrowed device handle

use chrono::{DateTime, Utc};
use overlay_core::{DiskError, OverlayOptions, ProgressCallback, RawDevice};
use log::info;

use crate::device_writer::SectorWriter;
use crate::fat32::{Fat32OverlayFormatter, FormatReport, OverlayVerification, OverlayVerifier};
use crate::partitioner::{PartitionEntry, PartitionTable};

/// One caller-owned device plus the partition entries known for it.
///
/// The handle is only borrowed; dropping the session leaves it open.
pub struct DiskSession<'d, D: RawDevice + ?Sized> {
    device: &'d mut D,
    device_id: String,
    table: PartitionTable,
}

impl<'d, D: RawDevice + ?Sized> DiskSession<'d, D> {
    pub fn new(device: &'d mut D, device_id: impl Into<String>) -> Self {
        Self {
            device,
            device_id: device_id.into(),
            table: PartitionTable::new(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Replace the known entries with the ones on disk
    pub fn read_partition_table(&mut self) -> Result<Vec<PartitionEntry>, DiskError> {
        self.table = PartitionTable::read(&mut *self.device)?;
        info!("{}: {} partition(s) found", self.device_id, self.table.len());
        Ok(self.table.entries())
    }

    /// Known entries in on-disk order
    pub fn entries(&self) -> Vec<PartitionEntry> {
        self.table.entries()
    }

    pub fn partition_count(&self) -> usize {
        self.table.len()
    }

    /// Add a FAT32 entry and return its 1-based partition number
    pub fn add_partition(&mut self, offset: u64, size: u64) -> Result<usize, DiskError> {
        self.table.append(&mut *self.device, offset, size)
    }

    /// Format the overlay volume stamped with the current time
    pub fn format_overlay_partition(
        &mut self,
        offset: u64,
        size: u64,
        options: &OverlayOptions,
        progress: &dyn ProgressCallback,
    ) -> Result<FormatReport, DiskError> {
        self.format_overlay_partition_at(offset, size, options, progress, &Utc::now())
    }

    /// Format the overlay volume with an explicit timestamp
    pub fn format_overlay_partition_at(
        &mut self,
        offset: u64,
        size: u64,
        options: &OverlayOptions,
        progress: &dyn ProgressCallback,
        now: &DateTime<Utc>,
    ) -> Result<FormatReport, DiskError> {
        let mut writer = SectorWriter::new(&mut *self.device, &self.device_id, progress);
        Fat32OverlayFormatter::format(&mut writer, offset, size, options, now)
    }

    /// Read back an overlay volume written at `offset`
    pub fn verify_overlay_partition(&mut self, offset: u64) -> Result<OverlayVerification, DiskError> {
        OverlayVerifier::verify(&mut *self.device, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use overlay_core::NoOpProgress;
    use std::io::Cursor;

    const MIB: u64 = 1024 * 1024;

    #[test]
    fn test_session_partitions_and_formats() {
        let mut device = Cursor::new(vec![0u8; (9 * MIB) as usize]);
        let now = Utc.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap();

        let mut session = DiskSession::new(&mut device, "image");
        assert!(session.read_partition_table().unwrap().is_empty());
        assert_eq!(session.partition_count(), 0);

        assert_eq!(session.add_partition(MIB, 8 * MIB).unwrap(), 1);
        assert_eq!(session.entries()[0].start_lba(), 2048);

        let report = session
            .format_overlay_partition_at(MIB, 8 * MIB, &OverlayOptions::default(), &NoOpProgress, &now)
            .unwrap();
        assert_eq!(report.bytes_written, report.layout.total_bytes());

        let verification = session.verify_overlay_partition(MIB).unwrap();
        assert!(verification.is_valid, "errors: {:?}", verification.errors);
        assert_eq!(verification.volume_serial, report.volume_serial);

        // Formatting must leave the partition table alone
        session.read_partition_table().unwrap();
        assert_eq!(session.partition_count(), 1);
        assert_eq!(session.entries()[0].sector_count(), 16384);
    }

    #[test]
    fn test_append_without_read_uses_first_slot() {
        let mut device = Cursor::new(vec![0u8; 512]);
        let mut session = DiskSession::new(&mut device, "image");
        assert_eq!(session.add_partition(2048 * 512, 4096 * 512).unwrap(), 1);
        assert_eq!(session.add_partition(6144 * 512, 4096 * 512).unwrap(), 2);
        assert_eq!(session.partition_count(), 2);
        assert_eq!(session.device_id(), "image");
    }
}
