use std::time::Duration;

use notedrive_blobs::BlobError;
use notedrive_records::RecordError;
use notedrive_types::{MediaPath, TypeError};
use thiserror::Error;

/// Errors surfaced by the sync coordinator.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The draft was rejected before any remote call was made.
    #[error("invalid note: {0}")]
    Validation(#[from] TypeError),

    #[error("record store: {0}")]
    Records(#[from] RecordError),

    #[error("blob store: {0}")]
    Blobs(#[from] BlobError),

    /// Both read paths failed; the cached view was left untouched.
    #[error(transparent)]
    Refresh(#[from] RefreshError),
}

impl SyncError {
    /// True for failures a caller may reasonably retry as-is.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Validation(_) => false,
            Self::Records(e) => e.is_transient(),
            Self::Blobs(e) => e.is_transient(),
            Self::Refresh(e) => e.fallback.is_transient(),
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Records(RecordError::Validation(_))
        )
    }
}

/// A refresh whose sorted query and list fallback both failed.
#[derive(Debug, Error)]
#[error("refresh failed: sorted query: {sorted}; list fallback: {fallback}")]
pub struct RefreshError {
    pub sorted: RecordError,
    pub fallback: RecordError,
}

/// A single note's image URL could not be resolved.
///
/// Never escapes a refresh: the note is published without an image URL.
#[derive(Debug, Error)]
pub enum PartialEnrichmentError {
    #[error("resolving {path}: {source}")]
    Resolve {
        path: MediaPath,
        #[source]
        source: BlobError,
    },

    #[error("resolving {path} timed out after {timeout:?}")]
    Timeout { path: MediaPath, timeout: Duration },
}

pub type SyncResult<T> = Result<T, SyncError>;
