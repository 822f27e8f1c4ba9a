use notedrive_types::MediaPath;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// Transport failure between the client and the object store.
    #[error("network error: {0}")]
    Network(String),

    /// The caller may not write or delete under this path.
    #[error("not authorized for {path}")]
    Authorization { path: MediaPath },

    /// No object is stored at this path.
    #[error("blob not found: {path}")]
    NotFound { path: MediaPath },

    /// The path is not a valid media path.
    #[error("invalid blob path: {0}")]
    InvalidPath(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BlobError {
    /// Whether retrying the same call may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Io(_))
    }
}

impl From<serde_json::Error> for BlobError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
