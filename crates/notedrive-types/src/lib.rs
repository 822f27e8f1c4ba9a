//! Foundation types for NoteDrive.
//!
//! This crate provides the record, identity, and path types shared by the
//! record store, the blob store, and the sync layer. Every other NoteDrive
//! crate depends on `notedrive-types`.
//!
//! # Key Types
//!
//! - [`Note`]: A stored note record
//! - [`NewNote`] / [`NotePatch`]: Create and partial-update payloads
//! - [`NoteId`]: Server-assigned UUID v7 record identifier
//! - [`OwnerId`]: Identity of the caller that owns records and blobs
//! - [`NoteStatus`] / [`StatusFilter`]: Lifecycle status and view filter
//! - [`MediaPath`]: Validated reference into the blob namespace

pub mod error;
pub mod identity;
pub mod media;
pub mod note;
pub mod status;

pub use error::TypeError;
pub use identity::{NoteId, OwnerId};
pub use media::MediaPath;
pub use note::{NewNote, Note, NotePatch};
pub use status::{NoteStatus, StatusFilter};
