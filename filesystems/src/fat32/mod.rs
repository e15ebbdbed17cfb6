// FAT32 overlay volume: layout math, formatter and read-back verifier

pub mod layout;
pub mod formatter_native;
pub mod validator;

pub use layout::{OverlayLayout, sectors_per_cluster_for, DEFAULT_ZERO_FILL_LIMIT};
pub use formatter_native::{Fat32OverlayFormatter, FormatReport};
pub use validator::{OverlayVerifier, OverlayVerification};
