use thiserror::Error;

/// Errors produced by type construction and validation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    /// A required field is missing or blank.
    #[error("validation failed: {field} {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("invalid owner id {value:?}: {reason}")]
    InvalidOwner { value: String, reason: String },

    #[error("invalid media path {value:?}: {reason}")]
    InvalidMediaPath { value: String, reason: String },

    #[error("invalid note id: {0}")]
    InvalidNoteId(String),

    #[error("unknown status: {0}")]
    UnknownStatus(String),
}

impl TypeError {
    pub(crate) fn blank(field: &'static str) -> Self {
        Self::Validation {
            field,
            reason: "must not be empty".into(),
        }
    }
}
