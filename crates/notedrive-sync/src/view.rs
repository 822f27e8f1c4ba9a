//! Enriched notes and the filtered, counted view built from them.

use notedrive_blobs::ResolvedUrl;
use notedrive_types::{Note, NoteId, NoteStatus, StatusFilter};
use serde::Serialize;

/// A note plus its resolved image URL, if any.
///
/// Transient: rebuilt on every refresh and never persisted. URLs are
/// time-limited and are not carried over from one refresh to the next.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichedNote {
    #[serde(flatten)]
    pub note: Note,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<ResolvedUrl>,
}

impl EnrichedNote {
    pub fn new(note: Note, image_url: Option<ResolvedUrl>) -> Self {
        Self { note, image_url }
    }

    pub fn id(&self) -> &NoteId {
        &self.note.id
    }

    pub fn status(&self) -> NoteStatus {
        self.note.status
    }

    /// The note references an image but no URL could be resolved.
    pub fn is_degraded(&self) -> bool {
        self.note.image_path.is_some() && self.image_url.is_none()
    }
}

/// Per-status counts over the full note set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StatusCounts {
    pub all: usize,
    pub active: usize,
    pub inactive: usize,
}

impl StatusCounts {
    pub fn tally<'a>(notes: impl IntoIterator<Item = &'a EnrichedNote>) -> Self {
        let (mut active, mut inactive) = (0, 0);
        for note in notes {
            match note.status() {
                NoteStatus::Active => active += 1,
                NoteStatus::Inactive => inactive += 1,
            }
        }
        Self {
            all: active + inactive,
            active,
            inactive,
        }
    }

    pub fn for_filter(&self, filter: StatusFilter) -> usize {
        match filter {
            StatusFilter::All => self.all,
            StatusFilter::Active => self.active,
            StatusFilter::Inactive => self.inactive,
        }
    }
}

/// The presentable projection of the caller's notes.
///
/// `notes` holds only the entries passing `filter`, newest first; `counts`
/// always describes the full set, so `counts.all == counts.active +
/// counts.inactive` whatever filter is displayed.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct View {
    notes: Vec<EnrichedNote>,
    filter: StatusFilter,
    counts: StatusCounts,
    generation: u64,
}

impl View {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Project the full enriched set through `filter`.
    pub fn project(full: &[EnrichedNote], filter: StatusFilter, generation: u64) -> Self {
        Self {
            notes: full
                .iter()
                .filter(|n| filter.matches(n.status()))
                .cloned()
                .collect(),
            filter,
            counts: StatusCounts::tally(full),
            generation,
        }
    }

    pub fn notes(&self) -> &[EnrichedNote] {
        &self.notes
    }

    pub fn filter(&self) -> StatusFilter {
        self.filter
    }

    pub fn counts(&self) -> StatusCounts {
        self.counts
    }

    /// Ticket of the refresh that produced this view; 0 before the first.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    pub fn get(&self, id: &NoteId) -> Option<&EnrichedNote> {
        self.notes.iter().find(|n| n.id() == id)
    }
}
