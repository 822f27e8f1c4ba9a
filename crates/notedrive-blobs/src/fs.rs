//! Filesystem-backed blob store.
//!
//! Objects are written to `<root>/<media path>` with a JSON sidecar
//! `<root>/<media path>.meta.json` carrying content type and size. Resolved
//! URLs are `file://` URLs of the canonical object path.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use notedrive_types::{MediaPath, OwnerId};
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::object::{expiry_after, BlobMeta, ResolvedUrl, DEFAULT_URL_TTL};
use crate::traits::BlobStore;

const META_SUFFIX: &str = ".meta.json";

#[derive(Debug)]
pub struct FsBlobStore {
    caller: OwnerId,
    root: PathBuf,
    url_ttl: Duration,
}

impl FsBlobStore {
    pub async fn open(root: impl AsRef<Path>, caller: OwnerId) -> BlobResult<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self {
            caller,
            root,
            url_ttl: DEFAULT_URL_TTL,
        })
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn object_path(&self, path: &MediaPath) -> PathBuf {
        self.root.join(path.as_str())
    }

    fn meta_path(&self, path: &MediaPath) -> PathBuf {
        self.root.join(format!("{}{META_SUFFIX}", path.as_str()))
    }

    /// Read the metadata sidecar of a stored object.
    pub async fn meta(&self, path: &MediaPath) -> BlobResult<BlobMeta> {
        match tokio::fs::read(self.meta_path(path)).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(BlobError::NotFound { path: path.clone() })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn check_write(&self, path: &MediaPath) -> BlobResult<()> {
        if path.is_owned_by(&self.caller) {
            Ok(())
        } else {
            Err(BlobError::Authorization { path: path.clone() })
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn upload(&self, path: &MediaPath, data: Bytes, content_type: &str) -> BlobResult<()> {
        self.check_write(path)?;
        let target = self.object_path(path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let meta = BlobMeta {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            uploaded_at: Utc::now(),
        };
        tokio::fs::write(&target, &data).await?;
        tokio::fs::write(self.meta_path(path), serde_json::to_vec_pretty(&meta)?).await?;
        debug!(%path, size = meta.size, file = %target.display(), "blob written");
        Ok(())
    }

    async fn resolve_url(&self, path: &MediaPath) -> BlobResult<ResolvedUrl> {
        let absolute = match tokio::fs::canonicalize(self.object_path(path)).await {
            Ok(p) => p,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlobError::NotFound { path: path.clone() })
            }
            Err(e) => return Err(e.into()),
        };
        Ok(ResolvedUrl {
            url: format!("file://{}", absolute.display()),
            expires_at: expiry_after(Utc::now(), self.url_ttl),
        })
    }

    async fn delete(&self, path: &MediaPath) -> BlobResult<()> {
        self.check_write(path)?;
        match tokio::fs::remove_file(self.object_path(path)).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(BlobError::NotFound { path: path.clone() })
            }
            Err(e) => return Err(e.into()),
        }
        // A missing sidecar is not worth failing a delete over.
        if let Err(e) = tokio::fs::remove_file(self.meta_path(path)).await {
            debug!(%path, error = %e, "no metadata sidecar removed");
        }
        Ok(())
    }
}
