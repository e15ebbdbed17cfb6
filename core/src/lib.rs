pub mod device;
pub mod error;
pub mod filesystem;
pub mod progress;

pub use device::RawDevice;
pub use error::DiskError;
pub use filesystem::OverlayOptions;
pub use progress::{FnProgress, LoggingProgress, NoOpProgress, ProgressCallback, WriteProgress};
