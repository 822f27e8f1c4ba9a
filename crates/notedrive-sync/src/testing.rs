//! Scriptable store doubles for coordinator tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use notedrive_blobs::{BlobError, BlobResult, BlobStore, InMemoryBlobStore, ResolvedUrl};
use notedrive_records::{
    InMemoryRecordStore, RecordError, RecordPredicate, RecordResult, RecordStore, SortDirection,
    SortField,
};
use notedrive_types::{MediaPath, NewNote, Note, NoteId, NotePatch, OwnerId};
use tokio::sync::{oneshot, Notify};

use crate::config::SyncConfig;
use crate::coordinator::SyncCoordinator;

#[derive(Debug)]
pub struct ScriptedRecords {
    pub inner: InMemoryRecordStore,
    pub fail_sorted: AtomicBool,
    pub fail_list: AtomicBool,
    pub fail_create: AtomicBool,
    pub sorted_calls: AtomicUsize,
    pub list_calls: AtomicUsize,
}

impl ScriptedRecords {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            inner: InMemoryRecordStore::new(owner),
            fail_sorted: AtomicBool::new(false),
            fail_list: AtomicBool::new(false),
            fail_create: AtomicBool::new(false),
            sorted_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl RecordStore for ScriptedRecords {
    async fn list(&self, predicate: Option<&RecordPredicate>) -> RecordResult<Vec<Note>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RecordError::Network("list: connection reset".into()));
        }
        self.inner.list(predicate).await
    }

    async fn sorted_range_query(
        &self,
        field: SortField,
        range_start: DateTime<Utc>,
        direction: SortDirection,
    ) -> RecordResult<Vec<Note>> {
        self.sorted_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_sorted.load(Ordering::SeqCst) {
            return Err(RecordError::SortUnsupported { field });
        }
        self.inner.sorted_range_query(field, range_start, direction).await
    }

    async fn create(&self, note: NewNote) -> RecordResult<Note> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(RecordError::Network("create: timed out".into()));
        }
        self.inner.create(note).await
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> RecordResult<Note> {
        self.inner.update(id, patch).await
    }

    async fn delete(&self, id: &NoteId) -> RecordResult<()> {
        self.inner.delete(id).await
    }
}

pub struct ScriptedBlobs {
    pub inner: InMemoryBlobStore,
    pub fail_upload: AtomicBool,
    pub fail_delete: AtomicBool,
    pub failing_paths: Mutex<HashSet<MediaPath>>,
    pub hanging_paths: Mutex<HashSet<MediaPath>>,
    pub resolve_calls: AtomicUsize,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
    /// When set, the next `resolve_url` call signals `gate_reached` and
    /// waits for the sender to fire.
    pub gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub gate_reached: Notify,
}

impl ScriptedBlobs {
    pub fn new(owner: OwnerId) -> Self {
        Self {
            inner: InMemoryBlobStore::new(owner),
            fail_upload: AtomicBool::new(false),
            fail_delete: AtomicBool::new(false),
            failing_paths: Mutex::new(HashSet::new()),
            hanging_paths: Mutex::new(HashSet::new()),
            resolve_calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            gate: Mutex::new(None),
            gate_reached: Notify::new(),
        }
    }

    /// Arm the gate; the returned sender releases the gated call.
    pub fn arm_gate(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock().unwrap() = Some(rx);
        tx
    }

    pub fn fail_resolve(&self, path: &MediaPath) {
        self.failing_paths.lock().unwrap().insert(path.clone());
    }

    pub fn hang_resolve(&self, path: &MediaPath) {
        self.hanging_paths.lock().unwrap().insert(path.clone());
    }
}

#[async_trait]
impl BlobStore for ScriptedBlobs {
    async fn upload(&self, path: &MediaPath, data: Bytes, content_type: &str) -> BlobResult<()> {
        if self.fail_upload.load(Ordering::SeqCst) {
            return Err(BlobError::Network("upload: connection reset".into()));
        }
        self.inner.upload(path, data, content_type).await
    }

    async fn resolve_url(&self, path: &MediaPath) -> BlobResult<ResolvedUrl> {
        self.resolve_calls.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().take();
        if let Some(rx) = gate {
            self.gate_reached.notify_one();
            let _ = rx.await;
        }
        let hang = self.hanging_paths.lock().unwrap().contains(path);
        if hang {
            std::future::pending::<()>().await;
        }
        tokio::task::yield_now().await;

        let fail = self.failing_paths.lock().unwrap().contains(path);
        let result = if fail {
            Err(BlobError::Network("signer unavailable".into()))
        } else {
            self.inner.resolve_url(path).await
        };
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn delete(&self, path: &MediaPath) -> BlobResult<()> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(BlobError::Network("delete: connection refused".into()));
        }
        self.inner.delete(path).await
    }
}

pub struct Harness {
    pub owner: OwnerId,
    pub records: Arc<ScriptedRecords>,
    pub blobs: Arc<ScriptedBlobs>,
    pub coordinator: SyncCoordinator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(SyncConfig::default())
    }

    pub fn with_config(config: SyncConfig) -> Self {
        let owner = OwnerId::new("owner-1").unwrap();
        let records = Arc::new(ScriptedRecords::new(owner.clone()));
        let blobs = Arc::new(ScriptedBlobs::new(owner.clone()));
        let coordinator = SyncCoordinator::new(
            owner.clone(),
            records.clone() as Arc<dyn RecordStore>,
            blobs.clone() as Arc<dyn BlobStore>,
            config,
        );
        Self {
            owner,
            records,
            blobs,
            coordinator,
        }
    }

    /// Put an image straight into the blob store.
    pub async fn seed_image(&self, name: &str, at_ms: i64) -> MediaPath {
        let at = DateTime::<Utc>::from_timestamp_millis(at_ms).unwrap();
        let path = MediaPath::for_upload(&self.owner, name, at).unwrap();
        self.blobs
            .inner
            .upload(&path, Bytes::from_static(b"img"), "image/png")
            .await
            .unwrap();
        path
    }
}
