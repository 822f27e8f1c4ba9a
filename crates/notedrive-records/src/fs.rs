//! Filesystem-backed record store.
//!
//! The whole collection lives in a single pretty-printed JSON document,
//! `<dir>/notes.json`. Each call loads the document, applies the operation
//! through a [`NoteTable`], and (for mutations) writes it back via a temp file
//! and rename so a crash never leaves a torn file behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use notedrive_types::{NewNote, Note, NoteId, NotePatch, OwnerId};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{RecordError, RecordResult};
use crate::query::{RecordPredicate, SortDirection, SortField};
use crate::table::{NoteTable, TableFile};
use crate::traits::RecordStore;

const FILE_NAME: &str = "notes.json";

#[derive(Debug)]
pub struct FsRecordStore {
    caller: OwnerId,
    path: PathBuf,
    sort_index: bool,
    io: Mutex<()>,
}

impl FsRecordStore {
    /// Open (or lazily create) the collection stored in `dir`.
    pub async fn open(dir: impl AsRef<Path>, caller: OwnerId) -> RecordResult<Self> {
        let dir = dir.as_ref();
        tokio::fs::create_dir_all(dir).await?;
        Ok(Self {
            caller,
            path: dir.join(FILE_NAME),
            sort_index: true,
            io: Mutex::new(()),
        })
    }

    /// Enable or disable sorted queries.
    pub fn with_sort_index(mut self, enabled: bool) -> Self {
        self.sort_index = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Share all of this caller's notes with `reader`.
    pub async fn grant_read(&self, reader: OwnerId) -> RecordResult<()> {
        let caller = self.caller.clone();
        self.mutate(move |table| {
            table.grant_read(caller, reader);
            Ok(())
        })
        .await
    }

    async fn load(&self) -> RecordResult<NoteTable> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let file: TableFile = serde_json::from_slice(&bytes)?;
                Ok(NoteTable::from(file))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(NoteTable::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, table: &NoteTable) -> RecordResult<()> {
        let bytes = serde_json::to_vec_pretty(&TableFile::from(table))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn read<T>(&self, f: impl FnOnce(&NoteTable) -> T) -> RecordResult<T> {
        let _guard = self.io.lock().await;
        let table = self.load().await?;
        Ok(f(&table))
    }

    async fn mutate<T>(
        &self,
        f: impl FnOnce(&mut NoteTable) -> RecordResult<T>,
    ) -> RecordResult<T> {
        let _guard = self.io.lock().await;
        let mut table = self.load().await?;
        let out = f(&mut table)?;
        self.save(&table).await?;
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for FsRecordStore {
    async fn list(&self, predicate: Option<&RecordPredicate>) -> RecordResult<Vec<Note>> {
        self.read(|table| table.list(&self.caller, predicate)).await
    }

    async fn sorted_range_query(
        &self,
        field: SortField,
        range_start: DateTime<Utc>,
        direction: SortDirection,
    ) -> RecordResult<Vec<Note>> {
        if !self.sort_index {
            return Err(RecordError::SortUnsupported { field });
        }
        self.read(|table| table.sorted_range(&self.caller, field, range_start, direction))
            .await
    }

    async fn create(&self, note: NewNote) -> RecordResult<Note> {
        let created = self.mutate(|table| table.insert(&self.caller, note)).await?;
        debug!(note_id = %created.id, path = %self.path.display(), "note persisted");
        Ok(created)
    }

    async fn update(&self, id: &NoteId, patch: NotePatch) -> RecordResult<Note> {
        self.mutate(|table| table.update(&self.caller, id, patch)).await
    }

    async fn delete(&self, id: &NoteId) -> RecordResult<()> {
        self.mutate(|table| table.remove(&self.caller, id).map(|_| ()))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedrive_types::NoteStatus;

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
        assert!(!store.path().exists());
    }

    #[tokio::test]
    async fn notes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let created = {
            let store = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
            store.create(NewNote::new("A", "d")).await.unwrap()
        };

        let reopened = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
        let listed = reopened.list(None).await.unwrap();
        assert_eq!(listed, vec![created]);
    }

    #[tokio::test]
    async fn update_and_delete_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
        let created = store.create(NewNote::new("A", "d")).await.unwrap();

        store
            .update(&created.id, NotePatch::status(NoteStatus::Inactive))
            .await
            .unwrap();
        let listed = store.list(None).await.unwrap();
        assert_eq!(listed[0].status, NoteStatus::Inactive);

        store.delete(&created.id).await.unwrap();
        assert!(store.list(None).await.unwrap().is_empty());
        let err = store.delete(&created.id).await.unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[tokio::test]
    async fn sort_index_can_be_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsRecordStore::open(dir.path(), owner("alice"))
            .await
            .unwrap()
            .with_sort_index(false);
        let err = store
            .sorted_range_query(
                SortField::CreatedAt,
                DateTime::<Utc>::UNIX_EPOCH,
                SortDirection::Descending,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RecordError::SortUnsupported { .. }));
    }

    #[tokio::test]
    async fn grants_are_shared_through_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let bob = FsRecordStore::open(dir.path(), owner("bob")).await.unwrap();
        bob.create(NewNote::new("B", "d")).await.unwrap();
        bob.grant_read(owner("alice")).await.unwrap();

        let alice = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
        assert_eq!(alice.list(None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(FILE_NAME), b"{not json").unwrap();
        let store = FsRecordStore::open(dir.path(), owner("alice")).await.unwrap();
        let err = store.list(None).await.unwrap_err();
        assert!(matches!(err, RecordError::Serialization(_)));
    }
}
