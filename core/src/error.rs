use thiserror::Error;

#[derive(Debug, Error)]
pub enum DiskError {
    #[error("Seek failed: {0}")]
    SeekFailure(String),

    #[error("Read failed: {0}")]
    ReadFailure(String),

    #[error("Write failed: {0}")]
    WriteFailure(String),

    #[error("Partition table is full")]
    TableFull,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
