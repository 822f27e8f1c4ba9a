//! In-memory record store for tests and embedding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notedrive_types::{NewNote, Note, NoteId, NotePatch, OwnerId};
use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::query::{RecordPredicate, SortDirection, SortField};
use crate::table::NoteTable;
use crate::traits::RecordStore;

/// An in-memory implementation of [`RecordStore`].
///
/// The note table is shared between handles created with
/// [`session`](Self::session), so several callers can be simulated against
/// one collection. Data is lost when the last handle is dropped.
#[derive(Debug)]
pub struct InMemoryRecordStore {
    caller: OwnerId,
    table: Arc<RwLock<NoteTable>>,
    sort_index: Arc<AtomicBool>,
}

impl InMemoryRecordStore {
    /// Create an empty collection accessed as `caller`.
    pub fn new(caller: OwnerId) -> Self {
        Self {
            caller,
            table: Arc::new(RwLock::new(NoteTable::new())),
            sort_index: Arc::new(AtomicBool::new(true)),
        }
    }

    /// A handle on the same collection, acting as another caller.
    pub fn session(&self, caller: OwnerId) -> Self {
        Self {
            caller,
            table: Arc::clone(&self.table),
            sort_index: Arc::clone(&self.sort_index),
        }
    }

    pub fn caller(&self) -> &OwnerId {
        &self.caller
    }

    /// Enable or drop the `createdAt` index used by sorted queries.
    pub fn set_sort_index(&self, enabled: bool) {
        self.sort_index.store(enabled, Ordering::SeqCst);
    }

    /// Share all of this caller's notes with `reader`.
    pub fn grant_read(&self, reader: OwnerId) {
        self.table
            .write()
            .expect("lock poisoned")
            .grant_read(self.caller.clone(), reader);
    }

    pub fn revoke_read(&self, reader: &OwnerId) -> bool {
        self.table
            .write()
            .expect("lock poisoned")
            .revoke_read(&self.caller, reader)
    }

    /// Total notes across all callers.
    pub fn len(&self) -> usize {
        self.table.read().expect("lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn list(&self, predicate: Option<&RecordPredicate>) -> RecordResult<Vec<Note>> {
        let table = self.table.read().expect("lock poisoned");
        Ok(table.list(&self.caller, predicate))
    }

    async fn sorted_range_query(
        &self,
        field: SortField,
        range_start: DateTime<Utc>,
        direction: SortDirection,
    ) -> RecordResult<Vec<Note>> {
        if !self.sort_index.load(Ordering::SeqCst) {
            return Err(RecordError::SortUnsupported { field });
        }
        let table = self.table.read().expect("lock poisoned");
        Ok(table.sorted_range(&self.caller, field, range_start, direction))
    }

    async fn create(&self, note: NewNote) -> RecordResult<Note> {
        let created = self
            .table
            .write()
            .expect("lock poisoned")
            .insert(&self.caller, note)?;
        debug!(note_id = %created.id, owner = %self.caller, "note created");
        Ok(created)
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> RecordResult<Note> {
        let mut table = self.table.write().expect("lock poisoned");
        table.update(&self.caller, id, patch)
    }

    async fn delete(&self, id: &NoteId) -> RecordResult<()> {
        let mut table = self.table.write().expect("lock poisoned");
        table.remove(&self.caller, id)?;
        debug!(note_id = %id, owner = %self.caller, "note deleted");
        Ok(())
    }
}
