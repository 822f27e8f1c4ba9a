//! Predicates and ordering for record queries.

use std::cmp::Ordering;
use std::fmt;

use notedrive_types::{Note, NoteStatus, OwnerId};
use serde::{Deserialize, Serialize};

/// Field equality filter for [`RecordStore::list`](crate::RecordStore::list).
///
/// All present conditions must hold. The empty predicate matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPredicate {
    pub status: Option<NoteStatus>,
    pub owner: Option<OwnerId>,
}

impl RecordPredicate {
    pub fn status(status: NoteStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn owner(owner: OwnerId) -> Self {
        Self {
            owner: Some(owner),
            ..Default::default()
        }
    }

    pub fn matches(&self, note: &Note) -> bool {
        if let Some(status) = self.status {
            if note.status != status {
                return false;
            }
        }
        if let Some(ref owner) = self.owner {
            if &note.owner != owner {
                return false;
            }
        }
        true
    }
}

/// Fields a store may be able to order by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortField {
    CreatedAt,
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedAt => f.write_str("createdAt"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SortDirection {
    Ascending,
    #[default]
    Descending,
}

impl SortField {
    /// Compare two notes on this field, ties broken by id.
    pub fn compare(&self, a: &Note, b: &Note) -> Ordering {
        match self {
            Self::CreatedAt => a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)),
        }
    }
}

/// Sort `notes` in place by `field` in the given direction.
pub fn sort_notes(notes: &mut [Note], field: SortField, direction: SortDirection) {
    notes.sort_by(|a, b| {
        let ord = field.compare(a, b);
        match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use notedrive_types::{NewNote, NoteId};

    fn note(owner: &str, status: NoteStatus, secs: i64) -> Note {
        NewNote::new("n", "d")
            .with_status(status)
            .with_created_at(Utc.timestamp_opt(secs, 0).unwrap())
            .into_note(NoteId::new(), OwnerId::new(owner).unwrap())
    }

    #[test]
    fn empty_predicate_matches_everything() {
        let p = RecordPredicate::default();
        assert!(p.matches(&note("a", NoteStatus::Active, 1)));
        assert!(p.matches(&note("b", NoteStatus::Inactive, 1)));
    }

    #[test]
    fn predicate_conditions_are_conjunctive() {
        let p = RecordPredicate {
            status: Some(NoteStatus::Inactive),
            owner: Some(OwnerId::new("a").unwrap()),
        };
        assert!(p.matches(&note("a", NoteStatus::Inactive, 1)));
        assert!(!p.matches(&note("a", NoteStatus::Active, 1)));
        assert!(!p.matches(&note("b", NoteStatus::Inactive, 1)));
    }

    #[test]
    fn sort_descending_by_created_at() {
        let mut notes = vec![
            note("a", NoteStatus::Active, 2),
            note("a", NoteStatus::Active, 3),
            note("a", NoteStatus::Active, 1),
        ];
        sort_notes(&mut notes, SortField::CreatedAt, SortDirection::Descending);
        let secs: Vec<i64> = notes.iter().map(|n| n.created_at.timestamp()).collect();
        assert_eq!(secs, vec![3, 2, 1]);
    }

    #[test]
    fn equal_timestamps_break_ties_by_id() {
        let first = note("a", NoteStatus::Active, 5);
        let second = note("a", NoteStatus::Active, 5);
        let mut notes = vec![first.clone(), second.clone()];
        sort_notes(&mut notes, SortField::CreatedAt, SortDirection::Descending);
        assert_eq!(notes[0].id, second.id);
        sort_notes(&mut notes, SortField::CreatedAt, SortDirection::Ascending);
        assert_eq!(notes[0].id, first.id);
    }
}
