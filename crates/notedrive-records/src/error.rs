//! Error types for record store operations.

use notedrive_types::{NoteId, TypeError};
use thiserror::Error;

use crate::query::SortField;

/// Errors that can occur while talking to a record store.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Transport failure between the client and the remote collection.
    #[error("network error: {0}")]
    Network(String),

    /// The note is visible to the caller but not owned by it.
    #[error("not authorized to modify note {id}")]
    Authorization { id: NoteId },

    /// The id is stale, or the note is not visible to the caller.
    #[error("note not found: {id}")]
    NotFound { id: NoteId },

    /// Required create/update fields are missing or blank.
    #[error("invalid note: {0}")]
    Validation(#[from] TypeError),

    /// The backend cannot order by this field (e.g. missing index).
    #[error("sorted query on {field} is not supported")]
    SortUnsupported { field: SortField },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecordError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }
}

impl From<serde_json::Error> for RecordError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Convenience type alias for record store operations.
pub type RecordResult<T> = std::result::Result<T, RecordError>;
