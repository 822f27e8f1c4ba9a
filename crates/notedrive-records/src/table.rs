//! Caller-scoped note table shared by the record store backends.
//!
//! The table enforces the visibility rules the remote collection applies:
//! a caller sees the notes it owns plus those of owners that granted it read
//! access, and may only mutate its own notes.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use notedrive_types::{NewNote, Note, NoteId, NotePatch, OwnerId};
use serde::{Deserialize, Serialize};

use crate::error::{RecordError, RecordResult};
use crate::query::{sort_notes, RecordPredicate, SortDirection, SortField};

#[derive(Clone, Debug, Default)]
pub struct NoteTable {
    notes: BTreeMap<NoteId, Note>,
    /// owner -> readers granted access to all of the owner's notes
    grants: BTreeMap<OwnerId, BTreeSet<OwnerId>>,
}

impl NoteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn can_read(&self, caller: &OwnerId, note: &Note) -> bool {
        &note.owner == caller
            || self
                .grants
                .get(&note.owner)
                .is_some_and(|readers| readers.contains(caller))
    }

    fn visible<'a>(&'a self, caller: &'a OwnerId) -> impl Iterator<Item = &'a Note> + 'a {
        self.notes.values().filter(move |n| self.can_read(caller, n))
    }

    pub fn list(&self, caller: &OwnerId, predicate: Option<&RecordPredicate>) -> Vec<Note> {
        self.visible(caller)
            .filter(|n| predicate.map_or(true, |p| p.matches(n)))
            .cloned()
            .collect()
    }

    pub fn sorted_range(
        &self,
        caller: &OwnerId,
        field: SortField,
        range_start: DateTime<Utc>,
        direction: SortDirection,
    ) -> Vec<Note> {
        let mut notes: Vec<Note> = match field {
            SortField::CreatedAt => self
                .visible(caller)
                .filter(|n| n.created_at >= range_start)
                .cloned()
                .collect(),
        };
        sort_notes(&mut notes, field, direction);
        notes
    }

    pub fn insert(&mut self, caller: &OwnerId, new: NewNote) -> RecordResult<Note> {
        new.validate()?;
        let note = new.into_note(NoteId::new(), caller.clone());
        self.notes.insert(note.id, note.clone());
        Ok(note)
    }

    pub fn update(
        &mut self,
        caller: &OwnerId,
        id: &NoteId,
        patch: NotePatch,
    ) -> RecordResult<Note> {
        patch.validate()?;
        self.check_owned(caller, id)?;
        let note = self
            .notes
            .get_mut(id)
            .ok_or(RecordError::NotFound { id: *id })?;
        note.apply(patch);
        Ok(note.clone())
    }

    pub fn remove(&mut self, caller: &OwnerId, id: &NoteId) -> RecordResult<Note> {
        self.check_owned(caller, id)?;
        self.notes
            .remove(id)
            .ok_or(RecordError::NotFound { id: *id })
    }

    fn check_owned(&self, caller: &OwnerId, id: &NoteId) -> RecordResult<()> {
        match self.notes.get(id) {
            Some(note) if &note.owner == caller => Ok(()),
            Some(note) if self.can_read(caller, note) => {
                Err(RecordError::Authorization { id: *id })
            }
            _ => Err(RecordError::NotFound { id: *id }),
        }
    }

    /// Let `reader` see every note owned by `owner`.
    pub fn grant_read(&mut self, owner: OwnerId, reader: OwnerId) {
        if owner != reader {
            self.grants.entry(owner).or_default().insert(reader);
        }
    }

    /// Returns `true` if the grant existed.
    pub fn revoke_read(&mut self, owner: &OwnerId, reader: &OwnerId) -> bool {
        let Some(readers) = self.grants.get_mut(owner) else {
            return false;
        };
        let removed = readers.remove(reader);
        if readers.is_empty() {
            self.grants.remove(owner);
        }
        removed
    }
}

/// On-disk layout of a [`NoteTable`].
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TableFile {
    #[serde(default)]
    notes: Vec<Note>,
    #[serde(default)]
    read_grants: Vec<ReadGrant>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ReadGrant {
    owner: OwnerId,
    reader: OwnerId,
}

impl From<&NoteTable> for TableFile {
    fn from(table: &NoteTable) -> Self {
        Self {
            notes: table.notes.values().cloned().collect(),
            read_grants: table
                .grants
                .iter()
                .flat_map(|(owner, readers)| {
                    readers.iter().map(move |reader| ReadGrant {
                        owner: owner.clone(),
                        reader: reader.clone(),
                    })
                })
                .collect(),
        }
    }
}

impl From<TableFile> for NoteTable {
    fn from(file: TableFile) -> Self {
        let mut table = NoteTable::new();
        for note in file.notes {
            table.notes.insert(note.id, note);
        }
        for grant in file.read_grants {
            table.grant_read(grant.owner, grant.reader);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notedrive_types::NoteStatus;

    fn owner(s: &str) -> OwnerId {
        OwnerId::new(s).unwrap()
    }

    #[test]
    fn insert_assigns_id_and_owner() {
        let mut table = NoteTable::new();
        let note = table.insert(&owner("alice"), NewNote::new("A", "d")).unwrap();
        assert_eq!(note.owner, owner("alice"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn insert_rejects_blank_fields() {
        let mut table = NoteTable::new();
        let err = table.insert(&owner("alice"), NewNote::new("", "d")).unwrap_err();
        assert!(matches!(err, RecordError::Validation(_)));
        assert!(table.is_empty());
    }

    #[test]
    fn callers_only_see_their_own_notes() {
        let mut table = NoteTable::new();
        table.insert(&owner("alice"), NewNote::new("A", "d")).unwrap();
        table.insert(&owner("bob"), NewNote::new("B", "d")).unwrap();
        let seen = table.list(&owner("alice"), None);
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].name, "A");
    }

    #[test]
    fn read_grant_exposes_notes_but_not_mutation() {
        let mut table = NoteTable::new();
        let bobs = table.insert(&owner("bob"), NewNote::new("B", "d")).unwrap();
        table.grant_read(owner("bob"), owner("alice"));

        assert_eq!(table.list(&owner("alice"), None).len(), 1);
        let err = table
            .update(&owner("alice"), &bobs.id, NotePatch::status(NoteStatus::Inactive))
            .unwrap_err();
        assert!(matches!(err, RecordError::Authorization { .. }));
        let err = table.remove(&owner("alice"), &bobs.id).unwrap_err();
        assert!(matches!(err, RecordError::Authorization { .. }));

        assert!(table.revoke_read(&owner("bob"), &owner("alice")));
        assert!(table.list(&owner("alice"), None).is_empty());
        let err = table.remove(&owner("alice"), &bobs.id).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[test]
    fn remove_missing_is_not_found() {
        let mut table = NoteTable::new();
        let err = table.remove(&owner("alice"), &NoteId::new()).unwrap_err();
        assert!(matches!(err, RecordError::NotFound { .. }));
    }

    #[test]
    fn file_layout_round_trips_grants() {
        let mut table = NoteTable::new();
        table.insert(&owner("bob"), NewNote::new("B", "d")).unwrap();
        table.grant_read(owner("bob"), owner("alice"));

        let json = serde_json::to_string(&TableFile::from(&table)).unwrap();
        let restored = NoteTable::from(serde_json::from_str::<TableFile>(&json).unwrap());
        assert_eq!(restored.len(), 1);
        assert_eq!(restored.list(&owner("alice"), None).len(), 1);
    }
}
