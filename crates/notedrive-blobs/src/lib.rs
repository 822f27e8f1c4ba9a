//! Blob store client for NoteDrive.
//!
//! Note images live in an object store under a per-owner namespace,
//! `media/{owner}/{filename}-{timestamp_millis}`. This crate exposes the three
//! operations the sync layer needs (upload, resolve to a time-limited URL, and
//! delete) behind the [`BlobStore`] trait.
//!
//! # Storage Backends
//!
//! - [`InMemoryBlobStore`]: `HashMap`-based bucket for tests and embedding
//! - [`FsBlobStore`]: objects as files under a root directory

pub mod error;
pub mod fs;
pub mod memory;
pub mod object;
pub mod traits;

pub use error::{BlobError, BlobResult};
pub use fs::FsBlobStore;
pub use memory::InMemoryBlobStore;
pub use object::{expiry_after, BlobMeta, ResolvedUrl, DEFAULT_URL_TTL};
pub use traits::BlobStore;
