//! The sync coordinator: orchestrates record and blob calls and keeps the
//! view cache consistent with the remote stores.

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use notedrive_blobs::{BlobError, BlobStore, ResolvedUrl};
use notedrive_records::{sort_notes, RecordStore, SortDirection, SortField};
use notedrive_types::{
    MediaPath, NewNote, Note, NoteId, NotePatch, NoteStatus, OwnerId, StatusFilter,
};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::cache::ViewCache;
use crate::config::SyncConfig;
use crate::error::{PartialEnrichmentError, RefreshError, SyncResult};
use crate::view::{EnrichedNote, View};

/// User-supplied fields for a new note.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteDraft {
    pub name: String,
    pub description: String,
    pub status: NoteStatus,
}

impl NoteDraft {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: NoteStatus::default(),
        }
    }

    pub fn with_status(mut self, status: NoteStatus) -> Self {
        self.status = status;
        self
    }
}

/// An image to attach to a new note.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    /// Original client-side file name; becomes part of the blob path.
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new(filename: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data,
        }
    }
}

/// Result of a delete. The record is gone; the blob may not be.
#[derive(Debug, Default)]
pub struct DeleteOutcome {
    /// Set when the image could not be removed and was left behind.
    pub blob_error: Option<BlobError>,
}

/// What a refresh did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RefreshSummary {
    /// Ticket number of this refresh.
    pub generation: u64,
    /// False if a newer refresh published first and this result was dropped.
    pub published: bool,
    /// The sorted query failed and `list` was used instead.
    pub used_fallback: bool,
    /// Notes fetched, across all statuses.
    pub total: usize,
    /// Notes passing the filter at publish time.
    pub visible: usize,
    /// Notes whose image URL could not be resolved.
    pub degraded: usize,
}

/// Coordinates a record store and a blob store on behalf of one owner.
///
/// Every mutation refreshes from the remote stores afterwards; the cache is
/// never edited optimistically. Mutations hold the write side of `cycle`
/// for their whole mutate-then-refresh sequence, while plain refreshes hold
/// the read side, so a mutation waits for in-flight refreshes and no
/// unrelated refresh starts in the middle of one.
pub struct SyncCoordinator {
    owner: OwnerId,
    records: Arc<dyn RecordStore>,
    blobs: Arc<dyn BlobStore>,
    config: SyncConfig,
    cache: ViewCache,
    cycle: RwLock<()>,
}

impl SyncCoordinator {
    pub fn new(
        owner: OwnerId,
        records: Arc<dyn RecordStore>,
        blobs: Arc<dyn BlobStore>,
        config: SyncConfig,
    ) -> Self {
        Self {
            owner,
            records,
            blobs,
            config,
            cache: ViewCache::new(),
            cycle: RwLock::new(()),
        }
    }

    pub fn owner(&self) -> &OwnerId {
        &self.owner
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// The last successfully published view.
    pub fn current_view(&self) -> Arc<View> {
        self.cache.current_view()
    }

    pub fn current_filter(&self) -> StatusFilter {
        self.cache.filter()
    }

    pub fn is_loading(&self) -> bool {
        self.cache.is_loading()
    }

    // ---- Reads ----

    /// Re-fetch every visible note, resolve image URLs, and publish a new view.
    ///
    /// `Some(filter)` also becomes the displayed filter. On failure the cached
    /// view is left as it was.
    pub async fn refresh(&self, filter: Option<StatusFilter>) -> SyncResult<RefreshSummary> {
        let _cycle = self.cycle.read().await;
        self.refresh_locked(filter).await
    }

    /// Switch the displayed filter.
    ///
    /// The cached set is re-projected immediately, then refreshed.
    pub async fn set_filter(&self, filter: StatusFilter) -> SyncResult<RefreshSummary> {
        self.cache.set_filter(filter);
        self.refresh(Some(filter)).await
    }

    async fn refresh_locked(&self, filter: Option<StatusFilter>) -> SyncResult<RefreshSummary> {
        if let Some(filter) = filter {
            self.cache.set_filter(filter);
        }
        let ticket = self.cache.begin_refresh();
        let generation = ticket.seq();

        let (notes, used_fallback) = self.fetch_all().await?;
        let total = notes.len();
        let enriched = self.enrich(notes).await;
        let degraded = enriched.iter().filter(|n| n.is_degraded()).count();

        let (published, visible) = match ticket.publish(enriched) {
            Some(view) => {
                info!(
                    generation,
                    total,
                    visible = view.len(),
                    degraded,
                    filter = %view.filter(),
                    "view refreshed"
                );
                (true, view.len())
            }
            None => (false, 0),
        };

        Ok(RefreshSummary {
            generation,
            published,
            used_fallback,
            total,
            visible,
            degraded,
        })
    }

    /// Fetch the full visible set, newest first.
    ///
    /// The sorted query may legitimately be unavailable; `list` is the
    /// fallback, sorted here so the order does not depend on the path taken.
    async fn fetch_all(&self) -> SyncResult<(Vec<Note>, bool)> {
        let sorted = self
            .records
            .sorted_range_query(
                SortField::CreatedAt,
                DateTime::<Utc>::UNIX_EPOCH,
                SortDirection::Descending,
            )
            .await;
        match sorted {
            Ok(notes) => Ok((notes, false)),
            Err(sorted) => {
                warn!(error = %sorted, "sorted query failed, falling back to list");
                match self.records.list(None).await {
                    Ok(mut notes) => {
                        sort_notes(&mut notes, SortField::CreatedAt, SortDirection::Descending);
                        Ok((notes, true))
                    }
                    Err(fallback) => Err(RefreshError { sorted, fallback }.into()),
                }
            }
        }
    }

    /// Resolve image URLs with bounded concurrency. Order is preserved and
    /// all resolutions finish before this returns.
    async fn enrich(&self, notes: Vec<Note>) -> Vec<EnrichedNote> {
        stream::iter(notes)
            .map(|note| self.enrich_one(note))
            .buffered(self.config.concurrency())
            .collect()
            .await
    }

    async fn enrich_one(&self, note: Note) -> EnrichedNote {
        let Some(path) = note.image_path.clone() else {
            return EnrichedNote::new(note, None);
        };
        match self.resolve(path).await {
            Ok(url) => EnrichedNote::new(note, Some(url)),
            Err(e) => {
                warn!(note_id = %note.id, error = %e, "image url unavailable");
                EnrichedNote::new(note, None)
            }
        }
    }

    async fn resolve(&self, path: MediaPath) -> Result<ResolvedUrl, PartialEnrichmentError> {
        let timeout = self.config.resolve_timeout();
        match tokio::time::timeout(timeout, self.blobs.resolve_url(&path)).await {
            Ok(Ok(url)) => Ok(url),
            Ok(Err(source)) => Err(PartialEnrichmentError::Resolve { path, source }),
            Err(_) => Err(PartialEnrichmentError::Timeout { path, timeout }),
        }
    }

    // ---- Mutations ----

    /// Create a note, uploading its image first if one is given.
    ///
    /// The draft is validated before anything is uploaded. If the upload
    /// succeeds but the record cannot be created, the blob stays orphaned.
    pub async fn create(&self, draft: NoteDraft, image: Option<ImageUpload>) -> SyncResult<Note> {
        let _cycle = self.cycle.write().await;

        let now = Utc::now();
        let mut new = NewNote {
            name: draft.name,
            description: draft.description,
            status: draft.status,
            image_path: None,
            created_at: now,
        };
        new.validate()?;

        if let Some(image) = image {
            let path = MediaPath::for_upload(&self.owner, &image.filename, now)?;
            self.blobs
                .upload(&path, image.data, &image.content_type)
                .await?;
            debug!(%path, "image uploaded");
            new.image_path = Some(path);
        }

        let orphan = new.image_path.clone();
        let note = match self.records.create(new).await {
            Ok(note) => note,
            Err(e) => {
                if let Some(path) = orphan {
                    warn!(%path, error = %e, "note creation failed, uploaded image is orphaned");
                }
                return Err(e.into());
            }
        };
        info!(note_id = %note.id, has_image = note.image_path.is_some(), "note created");

        self.refresh_locked(None).await?;
        Ok(note)
    }

    /// Delete a note and, first, its image.
    ///
    /// A blob failure never blocks the record deletion; it is reported in
    /// the outcome and the blob is left behind.
    pub async fn delete(
        &self,
        id: &NoteId,
        image_path: Option<&MediaPath>,
    ) -> SyncResult<DeleteOutcome> {
        let _cycle = self.cycle.write().await;

        let mut outcome = DeleteOutcome::default();
        if let Some(path) = image_path {
            if let Err(e) = self.blobs.delete(path).await {
                warn!(note_id = %id, %path, error = %e, "image delete failed, blob left behind");
                outcome.blob_error = Some(e);
            }
        }

        self.records.delete(id).await?;
        info!(note_id = %id, "note deleted");

        self.refresh_locked(None).await?;
        Ok(outcome)
    }

    /// Change a note's status, then refresh from the store.
    pub async fn update_status(&self, id: &NoteId, status: NoteStatus) -> SyncResult<Note> {
        let _cycle = self.cycle.write().await;

        let note = self.records.update(id, NotePatch::status(status)).await?;
        info!(note_id = %id, %status, "note status updated");

        self.refresh_locked(None).await?;
        Ok(note)
    }
}

impl std::fmt::Debug for SyncCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncCoordinator")
            .field("owner", &self.owner)
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish()
    }
}
