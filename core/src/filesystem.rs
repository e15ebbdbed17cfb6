use crate::DiskError;
use serde::{Deserialize, Serialize};

/// Sector granularity the zero-fill limit has to respect
const SECTOR_SIZE: u64 = 512;

/// Options for the FAT32 overlay volume.
///
/// The defaults produce the reference layout: a volume labelled `OVERLAY`
/// holding `OVERLAY.IMG`, with the first 64 KiB of the file zeroed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayOptions {
    pub volume_label: String,
    pub file_name: String,
    pub zero_fill_limit: u64,
}

impl Default for OverlayOptions {
    fn default() -> Self {
        Self {
            volume_label: "OVERLAY".to_string(),
            file_name: "OVERLAY.IMG".to_string(),
            zero_fill_limit: 64 * 1024,
        }
    }
}

impl OverlayOptions {
    /// Parse options from a JSON blob, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self, DiskError> {
        let options: Self = serde_json::from_str(json)?;
        options.validate()?;
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), DiskError> {
        if self.volume_label.is_empty() || self.volume_label.len() > 11 {
            return Err(DiskError::InvalidInput(format!(
                "Volume label must be 1-11 characters: {:?}",
                self.volume_label
            )));
        }
        if !self.volume_label.bytes().all(|b| (0x20..0x7F).contains(&b)) {
            return Err(DiskError::InvalidInput(format!(
                "Volume label must be printable ASCII: {:?}",
                self.volume_label
            )));
        }
        if self.file_name.is_empty() || !self.file_name.is_ascii() {
            return Err(DiskError::InvalidInput(format!(
                "Invalid overlay file name: {:?}",
                self.file_name
            )));
        }
        if self.zero_fill_limit % SECTOR_SIZE != 0 {
            return Err(DiskError::InvalidInput(format!(
                "Zero fill limit {} is not a multiple of {}",
                self.zero_fill_limit, SECTOR_SIZE
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let options = OverlayOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.volume_label, "OVERLAY");
        assert_eq!(options.zero_fill_limit, 65536);
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let options = OverlayOptions::from_json(r#"{ "volume_label": "PERSIST" }"#).unwrap();
        assert_eq!(options.volume_label, "PERSIST");
        assert_eq!(options.file_name, "OVERLAY.IMG");
        assert_eq!(options.zero_fill_limit, 65536);
    }

    #[test]
    fn test_rejects_bad_options() {
        let long_label = OverlayOptions { volume_label: "ABCDEFGHIJKL".to_string(), ..Default::default() };
        assert!(matches!(long_label.validate(), Err(DiskError::InvalidInput(_))));

        let unaligned = OverlayOptions { zero_fill_limit: 1000, ..Default::default() };
        assert!(matches!(unaligned.validate(), Err(DiskError::InvalidInput(_))));

        assert!(matches!(
            OverlayOptions::from_json("{ not json"),
            Err(DiskError::Serialization(_))
        ));
    }
}
