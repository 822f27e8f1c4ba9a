use async_trait::async_trait;
use bytes::Bytes;
use notedrive_types::MediaPath;

use crate::error::BlobResult;
use crate::object::ResolvedUrl;

/// Remote object store holding note images.
///
/// Implementations must satisfy these rules:
/// - Writes and deletes are limited to the caller's own `media/{owner}/`
///   namespace.
/// - Any authenticated caller may resolve any existing object.
/// - Each call is independent; a failure on one path says nothing about
///   another.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `data` at `path`. An existing object at the same path is
    /// overwritten.
    async fn upload(&self, path: &MediaPath, data: Bytes, content_type: &str) -> BlobResult<()>;

    /// Produce a time-limited URL for the object at `path`.
    async fn resolve_url(&self, path: &MediaPath) -> BlobResult<ResolvedUrl>;

    /// Remove the object at `path`. Missing objects fail with `NotFound`.
    async fn delete(&self, path: &MediaPath) -> BlobResult<()>;
}
