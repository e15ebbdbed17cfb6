// Raw sector writer - seek, write and zero-fill on a borrowed device handle
// Every byte the overlay formatter produces goes through here so progress
// accounting stays in one place.

use overlay_core::{DiskError, ProgressCallback, RawDevice, WriteProgress};
use std::io::SeekFrom;
use log::debug;

use crate::constants::ZERO_CHUNK_SIZE;

pub struct SectorWriter<'a, D: RawDevice + ?Sized> {
    device: &'a mut D,
    device_id: &'a str,
    progress: &'a dyn ProgressCallback,
    bytes_written: u64,
    total_bytes: u64,
}

impl<'a, D: RawDevice + ?Sized> SectorWriter<'a, D> {
    pub fn new(device: &'a mut D, device_id: &'a str, progress: &'a dyn ProgressCallback) -> Self {
        Self {
            device,
            device_id,
            progress,
            bytes_written: 0,
            total_bytes: 0,
        }
    }

    /// Reset the byte counters for a new bulk operation
    pub fn begin(&mut self, total_bytes: u64) {
        self.bytes_written = 0;
        self.total_bytes = total_bytes;
        debug!("{}: starting bulk write of {} bytes", self.device_id, total_bytes);
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Absolute seek from the start of the device
    pub fn seek_to(&mut self, position: u64) -> Result<(), DiskError> {
        self.device
            .seek(SeekFrom::Start(position))
            .map_err(|e| DiskError::SeekFailure(format!(
                "Failed to seek to offset {} on {}: {}",
                position, self.device_id, e
            )))?;
        Ok(())
    }

    /// Write `data` with a single device call, then report progress.
    ///
    /// A device that accepts fewer bytes than requested fails the write.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), DiskError> {
        let written = self
            .device
            .write(data)
            .map_err(|e| DiskError::WriteFailure(format!(
                "Failed to write {} bytes to {}: {}",
                data.len(), self.device_id, e
            )))?;
        if written != data.len() {
            return Err(DiskError::WriteFailure(format!(
                "Short write to {}: {} of {} bytes",
                self.device_id, written, data.len()
            )));
        }
        self.advance(written);
        Ok(())
    }

    /// Write `size` zero bytes in chunks of at most one sector
    pub fn write_zeros(&mut self, size: u64) -> Result<(), DiskError> {
        const ZEROS: [u8; ZERO_CHUNK_SIZE] = [0u8; ZERO_CHUNK_SIZE];

        let mut remaining = size;
        while remaining > 0 {
            let len = remaining.min(ZERO_CHUNK_SIZE as u64) as usize;
            self.write_bytes(&ZEROS[..len])?;
            remaining -= len as u64;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), DiskError> {
        self.device
            .flush()
            .map_err(|e| DiskError::WriteFailure(format!("Failed to flush {}: {}", self.device_id, e)))
    }

    fn advance(&mut self, len: usize) {
        self.bytes_written += len as u64;
        self.progress.on_progress(&WriteProgress {
            device: self.device_id,
            bytes_written: self.bytes_written,
            total_bytes: self.total_bytes,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overlay_core::{FnProgress, NoOpProgress};
    use std::cell::RefCell;
    use std::io::{self, Cursor, Read, Seek, Write};

    /// Device that accepts a fixed number of bytes, then refuses more
    struct FullDevice {
        inner: Cursor<Vec<u8>>,
        capacity: usize,
    }

    impl Read for FullDevice {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Write for FullDevice {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            let room = self.capacity.saturating_sub(self.inner.position() as usize);
            let len = buf.len().min(room);
            self.inner.write(&buf[..len])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for FullDevice {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_zero_fill_reports_per_chunk() {
        let mut device = Cursor::new(vec![0xFFu8; 2048]);
        let reports = RefCell::new(Vec::new());
        let progress = FnProgress::new(|p: &WriteProgress<'_>| {
            reports.borrow_mut().push((p.bytes_written, p.total_bytes));
        });

        let mut writer = SectorWriter::new(&mut device, "test", &progress);
        writer.begin(1300);
        writer.seek_to(0).unwrap();
        writer.write_zeros(1300).unwrap();

        assert_eq!(*reports.borrow(), vec![(512, 1300), (1024, 1300), (1300, 1300)]);
        assert!(device.get_ref()[..1300].iter().all(|&b| b == 0));
        assert!(device.get_ref()[1300..].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_begin_resets_counters() {
        let mut device = Cursor::new(Vec::new());
        let mut writer = SectorWriter::new(&mut device, "test", &NoOpProgress);

        writer.begin(4);
        writer.write_bytes(&[1, 2, 3, 4]).unwrap();
        assert_eq!(writer.bytes_written(), 4);

        writer.begin(8);
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(writer.total_bytes(), 8);
    }

    /// Device that takes only half of every buffer it is given
    struct HalfDevice {
        inner: Cursor<Vec<u8>>,
        write_calls: usize,
    }

    impl Read for HalfDevice {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.inner.read(buf)
        }
    }

    impl Write for HalfDevice {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.write_calls += 1;
            self.inner.write(&buf[..buf.len() / 2])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Seek for HalfDevice {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn test_partial_write_is_not_retried() {
        let mut device = HalfDevice { inner: Cursor::new(Vec::new()), write_calls: 0 };
        let reports = RefCell::new(0usize);
        let progress = FnProgress::new(|_: &WriteProgress<'_>| *reports.borrow_mut() += 1);

        let mut writer = SectorWriter::new(&mut device, "half", &progress);
        writer.begin(512);
        let result = writer.write_bytes(&[1u8; 512]);

        assert!(matches!(result, Err(DiskError::WriteFailure(_))));
        assert_eq!(writer.bytes_written(), 0);
        assert_eq!(*reports.borrow(), 0);
        assert_eq!(device.write_calls, 1);
    }

    #[test]
    fn test_partial_zero_fill_is_fatal() {
        let mut device = HalfDevice { inner: Cursor::new(Vec::new()), write_calls: 0 };
        let mut writer = SectorWriter::new(&mut device, "half", &NoOpProgress);
        writer.begin(2048);

        let result = writer.write_zeros(2048);
        assert!(matches!(result, Err(DiskError::WriteFailure(_))));
        assert_eq!(device.write_calls, 1);
    }

    #[test]
    fn test_short_write_is_fatal() {
        let mut device = FullDevice { inner: Cursor::new(Vec::new()), capacity: 100 };
        let mut writer = SectorWriter::new(&mut device, "full", &NoOpProgress);
        writer.begin(512);

        let result = writer.write_zeros(512);
        assert!(matches!(result, Err(DiskError::WriteFailure(_))));
    }
}
