//! The view cache: the only shared mutable state of the sync layer.
//!
//! The cache holds one `{view, loading, filter}` state. A refresh takes a
//! [`RefreshTicket`] when it starts and hands the enriched set back through
//! [`RefreshTicket::publish`]. Tickets are numbered in start order; a ticket
//! only publishes if no ticket issued after it has published already, so a
//! slow refresh can never overwrite the result of a newer one. Publishing
//! swaps a fully built `Arc<View>` under a single write lock, so readers see
//! either the old view or the new one.

use std::sync::{Arc, RwLock};

use notedrive_types::StatusFilter;
use tracing::debug;

use crate::view::{EnrichedNote, View};

#[derive(Debug)]
struct CacheState {
    view: Arc<View>,
    full: Arc<[EnrichedNote]>,
    filter: StatusFilter,
    in_flight: usize,
    issued: u64,
    published: u64,
}

#[derive(Debug)]
pub struct ViewCache {
    state: RwLock<CacheState>,
}

impl ViewCache {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(CacheState {
                view: Arc::new(View::empty()),
                full: Arc::from(Vec::new()),
                filter: StatusFilter::All,
                in_flight: 0,
                issued: 0,
                published: 0,
            }),
        }
    }

    /// The last published view.
    pub fn current_view(&self) -> Arc<View> {
        Arc::clone(&self.state.read().expect("lock poisoned").view)
    }

    pub fn filter(&self) -> StatusFilter {
        self.state.read().expect("lock poisoned").filter
    }

    /// True while any refresh is in flight.
    pub fn is_loading(&self) -> bool {
        self.state.read().expect("lock poisoned").in_flight > 0
    }

    /// Ticket number of the last published refresh.
    pub fn published_generation(&self) -> u64 {
        self.state.read().expect("lock poisoned").published
    }

    /// Change the displayed filter and re-project the cached full set.
    ///
    /// No remote call is involved; the view generation is unchanged.
    pub fn set_filter(&self, filter: StatusFilter) -> Arc<View> {
        let mut state = self.state.write().expect("lock poisoned");
        state.filter = filter;
        if state.view.filter() != filter {
            state.view = Arc::new(View::project(&state.full, filter, state.published));
        }
        Arc::clone(&state.view)
    }

    /// Register a refresh as started.
    pub fn begin_refresh(&self) -> RefreshTicket<'_> {
        let mut state = self.state.write().expect("lock poisoned");
        state.issued += 1;
        state.in_flight += 1;
        RefreshTicket {
            cache: self,
            seq: state.issued,
        }
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Proof that a refresh is in flight. Dropping it without publishing (for
/// instance on error) leaves the cached view untouched.
#[derive(Debug)]
pub struct RefreshTicket<'a> {
    cache: &'a ViewCache,
    seq: u64,
}

impl RefreshTicket<'_> {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Publish the refreshed full set under the current filter.
    ///
    /// Returns the new view, or `None` if a newer refresh already published.
    pub fn publish(self, full: Vec<EnrichedNote>) -> Option<Arc<View>> {
        let mut state = self.cache.state.write().expect("lock poisoned");
        if self.seq <= state.published {
            debug!(
                ticket = self.seq,
                published = state.published,
                "discarding stale refresh"
            );
            return None;
        }
        let full: Arc<[EnrichedNote]> = Arc::from(full);
        let view = Arc::new(View::project(&full, state.filter, self.seq));
        state.full = full;
        state.view = Arc::clone(&view);
        state.published = self.seq;
        Some(view)
    }
}

impl Drop for RefreshTicket<'_> {
    fn drop(&mut self) {
        let mut state = self.cache.state.write().expect("lock poisoned");
        state.in_flight = state.in_flight.saturating_sub(1);
    }
}
