use crate::id::RecordId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollabError {
    #[error("Unknown field: {field}")]
    UnknownField { field: String },

    #[error("Record not found: {0}")]
    RecordNotFound(RecordId),

    #[error("Record is deleted: {0}")]
    RecordDeleted(RecordId),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid point amount: {0}")]
    InvalidAmount(i64),

    #[error("Concurrent modification conflict: {0}")]
    ConcurrencyConflict(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for CollabError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CollabError>;
