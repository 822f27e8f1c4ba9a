use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use notedrive_types::{MediaPath, OwnerId};
use tracing::debug;

use crate::error::{BlobError, BlobResult};
use crate::object::{expiry_after, BlobMeta, ResolvedUrl, DEFAULT_URL_TTL};
use crate::traits::BlobStore;

#[derive(Clone, Debug)]
struct StoredBlob {
    data: Bytes,
    meta: BlobMeta,
}

/// In-memory, HashMap-based blob store.
///
/// Intended for tests and embedding. Objects live behind a shared `RwLock`;
/// handles created with [`session`](Self::session) act as other callers over
/// the same bucket.
pub struct InMemoryBlobStore {
    caller: OwnerId,
    base_url: String,
    url_ttl: Duration,
    objects: Arc<RwLock<HashMap<MediaPath, StoredBlob>>>,
}

impl InMemoryBlobStore {
    /// Create an empty bucket accessed as `caller`.
    pub fn new(caller: OwnerId) -> Self {
        Self {
            caller,
            base_url: "memory://notedrive".into(),
            url_ttl: DEFAULT_URL_TTL,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    /// A handle on the same bucket, acting as another caller.
    pub fn session(&self, caller: OwnerId) -> Self {
        Self {
            caller,
            base_url: self.base_url.clone(),
            url_ttl: self.url_ttl,
            objects: Arc::clone(&self.objects),
        }
    }

    /// Number of objects currently stored.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &MediaPath) -> bool {
        self.objects
            .read()
            .expect("lock poisoned")
            .contains_key(path)
    }

    /// Raw object contents, for inspection in tests.
    pub fn get(&self, path: &MediaPath) -> Option<(Bytes, BlobMeta)> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(path)
            .map(|blob| (blob.data.clone(), blob.meta.clone()))
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
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, path: &MediaPath, data: Bytes, content_type: &str) -> BlobResult<()> {
        self.check_write(path)?;
        let meta = BlobMeta {
            content_type: content_type.to_string(),
            size: data.len() as u64,
            uploaded_at: Utc::now(),
        };
        debug!(%path, size = meta.size, "blob uploaded");
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(path.clone(), StoredBlob { data, meta });
        Ok(())
    }

    async fn resolve_url(&self, path: &MediaPath) -> BlobResult<ResolvedUrl> {
        if !self.contains(path) {
            return Err(BlobError::NotFound { path: path.clone() });
        }
        let expires_at = expiry_after(Utc::now(), self.url_ttl);
        Ok(ResolvedUrl {
            url: format!("{}/{}?expires={}", self.base_url, path, expires_at.timestamp()),
            expires_at,
        })
    }

    async fn delete(&self, path: &MediaPath) -> BlobResult<()> {
        self.check_write(path)?;
        match self.objects.write().expect("lock poisoned").remove(path) {
            Some(_) => Ok(()),
            None => Err(BlobError::NotFound { path: path.clone() }),
        }
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("caller", &self.caller)
            .field("object_count", &self.len())
            .finish()
    }
}
