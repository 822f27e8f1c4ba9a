//! Record/blob synchronization for NoteDrive.
//!
//! The [`SyncCoordinator`] sits between the presentation layer and the two
//! remote stores. It fetches the caller's full note set (sorted query first,
//! plain `list` as the fallback), resolves image URLs with a bounded fan-out
//! joined before publishing, and swaps the result into the [`ViewCache`] as
//! one immutable [`View`].
//!
//! # Guarantees
//!
//! 1. A failed refresh never replaces the last good view.
//! 2. One unresolvable image degrades one note, never the refresh.
//! 3. Counts are computed over the full set, whatever filter is displayed.
//! 4. A refresh that started earlier never overwrites one that started later.
//! 5. Mutations are never applied to the cache locally; every mutation is
//!    followed by a refresh from the stores.
//! 6. A blob failure never blocks a record delete. Orphaned blobs (from a
//!    failed create or a failed blob delete) are left in place.

pub mod cache;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod view;

#[cfg(test)]
mod testing;

pub use cache::{RefreshTicket, ViewCache};
pub use config::SyncConfig;
pub use coordinator::{DeleteOutcome, ImageUpload, NoteDraft, RefreshSummary, SyncCoordinator};
pub use error::{PartialEnrichmentError, RefreshError, SyncError, SyncResult};
pub use view::{EnrichedNote, StatusCounts, View};
