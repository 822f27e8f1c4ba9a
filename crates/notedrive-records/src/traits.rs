//! The [`RecordStore`] trait defining the remote collection interface.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notedrive_types::{NewNote, Note, NoteId, NotePatch};

use crate::error::RecordResult;
use crate::query::{RecordPredicate, SortDirection, SortField};

/// Typed access to the remote note collection.
///
/// Every call is implicitly scoped to the caller the client was built for:
/// results include the caller's own notes plus notes shared with it, and
/// mutations are only allowed on owned notes.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// All visible notes matching `predicate`. Ordering is unspecified.
    async fn list(&self, predicate: Option<&RecordPredicate>) -> RecordResult<Vec<Note>>;

    /// Visible notes with `field >= range_start`, ordered by `field`.
    ///
    /// Backends without an index on `field` fail with
    /// [`RecordError::SortUnsupported`](crate::RecordError::SortUnsupported).
    /// Callers are expected to treat that as an ordinary outcome.
    async fn sorted_range_query(
        &self,
        field: SortField,
        range_start: DateTime<Utc>,
        direction: SortDirection,
    ) -> RecordResult<Vec<Note>>;

    /// Create a note. The store assigns the id and owner.
    async fn create(&self, note: NewNote) -> RecordResult<Note>;

    /// Apply a partial update to an owned note.
    async fn update(&self, id: &NoteId, patch: NotePatch) -> RecordResult<Note>;

    /// Delete an owned note. Deleting a missing id fails with `NotFound`.
    async fn delete(&self, id: &NoteId) -> RecordResult<()>;
}
