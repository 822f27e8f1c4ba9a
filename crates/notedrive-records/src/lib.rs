//! Record store client for NoteDrive.
//!
//! Typed access to the remote note collection: list, sorted range query,
//! create, update, and delete. Every call is scoped to the caller the client
//! was constructed for; the store applies ownership and shared-read rules and
//! the sync layer only assumes them.
//!
//! # Modules
//!
//! - [`error`]: [`RecordError`] and the [`RecordResult`] alias
//! - [`query`]: [`RecordPredicate`], [`SortField`], [`SortDirection`]
//! - [`traits`]: The [`RecordStore`] trait
//! - [`table`]: Caller-scoped [`NoteTable`] shared by the backends
//! - [`memory`]: [`InMemoryRecordStore`] for tests and embedding
//! - [`fs`]: [`FsRecordStore`], a single-file JSON collection

pub mod error;
pub mod fs;
pub mod memory;
pub mod query;
pub mod table;
pub mod traits;

pub use error::{RecordError, RecordResult};
pub use fs::FsRecordStore;
pub use memory::InMemoryRecordStore;
pub use query::{sort_notes, RecordPredicate, SortDirection, SortField};
pub use table::NoteTable;
pub use traits::RecordStore;
