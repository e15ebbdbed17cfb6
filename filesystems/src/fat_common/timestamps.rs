// MS-DOS date/time encoding used by FAT directory entries

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};

/// Packed FAT date and time
/// FAT date: bits 15-9: year (0=1980), bits 8-5: month, bits 4-0: day
/// FAT time: bits 15-11: hours, bits 10-5: minutes, bits 4-0: seconds/2
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosTimestamp {
    pub date: u16,
    pub time: u16,
}

impl DosTimestamp {
    /// Encode a UTC time. Seconds are rounded up to the next even value.
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        // Clamp year to FAT range (1980-2107)
        let fat_year = datetime.year().clamp(1980, 2107) - 1980;

        let time = ((datetime.second() + 1) >> 1) as u16
            | ((datetime.minute() as u16) << 5)
            | ((datetime.hour() as u16) << 11);
        let date = datetime.day() as u16
            | ((datetime.month() as u16) << 5)
            | ((fat_year as u16) << 9);

        Self { date, time }
    }

    pub fn year(&self) -> i32 {
        ((self.date >> 9) & 0x7F) as i32 + 1980
    }

    pub fn month(&self) -> u32 {
        ((self.date >> 5) & 0x0F) as u32
    }

    pub fn day(&self) -> u32 {
        (self.date & 0x1F) as u32
    }

    pub fn hour(&self) -> u32 {
        ((self.time >> 11) & 0x1F) as u32
    }

    pub fn minute(&self) -> u32 {
        ((self.time >> 5) & 0x3F) as u32
    }

    /// Stored seconds (always even)
    pub fn second(&self) -> u32 {
        ((self.time & 0x1F) * 2) as u32
    }

    /// Decode back to a UTC time, if the fields form a valid date
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        NaiveDate::from_ymd_opt(self.year(), self.month(), self.day())?
            .and_hms_opt(self.hour(), self.minute(), self.second())
            .map(|dt| dt.and_utc())
    }
}
