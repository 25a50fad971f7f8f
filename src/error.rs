use thiserror::Error;

use crate::tracker::RecordId;

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid calorie amount: '{0}'")]
    InvalidAmount(String),

    #[error("Index {index} out of range for {len} records")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Record {0} not found")]
    UnknownRecord(RecordId),

    #[error("No element with id '{0}' to mount into")]
    MountPointMissing(String),

    #[error("Tracker is already initialized")]
    AlreadyInitialized,

    #[error("Tracker is not initialized")]
    NotInitialized,
}

pub type Result<T> = std::result::Result<T, TrackerError>;
