//! Search controller.
//!
//! Owns the active filter, the continuation cursor and the displayed
//! collection. Every request is tagged with the epoch it was issued under:
//! `search` bumps the epoch, and a completion whose epoch is no longer the
//! latest is discarded instead of applied. Nothing is cancelled on the
//! wire; stale responses are simply dropped when they arrive.
//!
//! State lives behind a `parking_lot` mutex that is only ever held between
//! awaits, never across one.

use crate::collection::DisplayedCollection;
use crate::error::{QueryError, QueryResult};
use crate::gate::SessionGate;
use crate::hydrator::PageHydrator;
use kennel_client::Backend;
use kennel_core::{SearchCursor, SearchFilter, SearchSettings};
use parking_lot::Mutex;
use std::sync::Arc;

/// Summary of an applied first page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSummary {
    /// Epoch the page was applied under.
    pub epoch: u64,
    /// Records now displayed.
    pub loaded: usize,
    /// Total matches reported by the backend.
    pub total: u64,
    /// `ceil(total / display_page_size)`.
    pub total_pages: u64,
    /// Whether a continuation cursor was returned.
    pub has_more: bool,
}

/// Result of [`SearchController::search`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The page replaced the displayed collection.
    Applied(PageSummary),
    /// A newer search was issued while this one was in flight.
    Superseded,
}

/// Result of [`SearchController::load_more`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    /// Records were appended to the displayed collection.
    Appended { appended: usize, has_more: bool },
    /// No cursor: never searched, or the last page was already loaded.
    Exhausted,
    /// A continuation of the displayed results is already in flight.
    AlreadyLoading,
    /// A newer search was issued, either before this call or while it was
    /// in flight. The stored cursor belongs to results about to be replaced.
    Superseded,
}

struct SearchState {
    /// Epoch of the most recently issued search.
    latest_epoch: u64,
    /// Epoch of the search whose results are applied.
    generation: u64,
    /// Epoch of the latest search while it has not completed.
    pending: Option<u64>,
    filter: Option<SearchFilter>,
    cursor: Option<SearchCursor>,
    collection: Arc<DisplayedCollection>,
    total: u64,
    total_pages: u64,
    /// Generation being continued, if a continuation is in flight.
    loading_more: Option<u64>,
}

/// Clears the pending marker on every exit path of `search`.
struct PendingGuard<'a> {
    state: &'a Mutex<SearchState>,
    epoch: u64,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        // A newer search owns the marker once issued.
        if state.pending == Some(self.epoch) {
            state.pending = None;
        }
    }
}

/// Releases the loading flag on every exit path of `load_more`.
struct LoadingGuard<'a> {
    state: &'a Mutex<SearchState>,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock();
        // A newer generation may have started its own continuation.
        if state.loading_more == Some(self.generation) {
            state.loading_more = None;
        }
    }
}

/// Turns filters into an ordered, stale-free sequence of pages.
pub struct SearchController {
    backend: Arc<dyn Backend>,
    gate: SessionGate,
    hydrator: Arc<PageHydrator>,
    display_page_size: u64,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(
        backend: Arc<dyn Backend>,
        gate: SessionGate,
        hydrator: Arc<PageHydrator>,
        settings: &SearchSettings,
    ) -> Self {
        Self {
            backend,
            gate,
            hydrator,
            display_page_size: u64::from(settings.display_page_size.max(1)),
            state: Mutex::new(SearchState {
                latest_epoch: 0,
                generation: 0,
                pending: None,
                filter: None,
                cursor: None,
                collection: Arc::new(DisplayedCollection::new()),
                total: 0,
                total_pages: 0,
                loading_more: None,
            }),
        }
    }

    /// Start a fresh search.
    ///
    /// Older in-flight searches and continuations become stale immediately,
    /// and no continuation is issued until this search completes. The
    /// collection, cursor and filter are replaced together once the first
    /// page is hydrated; on failure they keep their previous values.
    pub async fn search(&self, filter: SearchFilter) -> QueryResult<SearchOutcome> {
        filter.validate()?;

        let epoch = {
            let mut state = self.state.lock();
            state.latest_epoch += 1;
            state.pending = Some(state.latest_epoch);
            state.latest_epoch
        };
        let _pending = PendingGuard {
            state: &self.state,
            epoch,
        };
        tracing::info!("Search #{} started ({})", epoch, filter);

        let page = match self.gate.check("search", self.backend.search(&filter).await) {
            Ok(page) => page,
            Err(err) => {
                self.discard_if_stale(epoch, err)?;
                return Ok(SearchOutcome::Superseded);
            }
        };

        if !self.is_latest(epoch) {
            tracing::debug!("Search #{} superseded before hydration", epoch);
            return Ok(SearchOutcome::Superseded);
        }

        let dogs = match self.hydrator.hydrate(&page.ids).await {
            Ok(dogs) => dogs,
            Err(err) => {
                self.discard_if_stale(epoch, err)?;
                return Ok(SearchOutcome::Superseded);
            }
        };

        let mut state = self.state.lock();
        if state.latest_epoch != epoch {
            tracing::debug!("Search #{} superseded after hydration", epoch);
            return Ok(SearchOutcome::Superseded);
        }

        let total_pages = page.total.div_ceil(self.display_page_size);
        state.generation = epoch;
        state.filter = Some(filter);
        state.cursor = page.next;
        state.collection = Arc::new(DisplayedCollection::from_dogs(dogs));
        state.total = page.total;
        state.total_pages = total_pages;

        let summary = PageSummary {
            epoch,
            loaded: state.collection.len(),
            total: page.total,
            total_pages,
            has_more: state.cursor.is_some(),
        };
        drop(state);

        tracing::info!(
            "Search #{} applied: {} records, {} total, {} pages",
            epoch,
            summary.loaded,
            summary.total,
            summary.total_pages
        );
        Ok(SearchOutcome::Applied(summary))
    }

    /// Fetch the next page with the stored cursor and append it.
    ///
    /// A call while a continuation of the displayed results is in flight is
    /// dropped, not queued. A call while a search is pending sends nothing.
    pub async fn load_more(&self) -> QueryResult<LoadMoreOutcome> {
        let (issued_at, generation, cursor) = {
            let mut state = self.state.lock();
            if state.pending.is_some() {
                return Ok(LoadMoreOutcome::Superseded);
            }
            let Some(cursor) = state.cursor.clone() else {
                return Ok(LoadMoreOutcome::Exhausted);
            };
            if state.loading_more == Some(state.generation) {
                return Ok(LoadMoreOutcome::AlreadyLoading);
            }
            state.loading_more = Some(state.generation);
            (state.latest_epoch, state.generation, cursor)
        };
        let _loading = LoadingGuard {
            state: &self.state,
            generation,
        };
        tracing::debug!("Continuation of search #{} from {}", generation, cursor);

        let page = match self
            .gate
            .check("search_next", self.backend.search_next(&cursor).await)
        {
            Ok(page) => page,
            Err(err) => {
                self.discard_if_stale(issued_at, err)?;
                return Ok(LoadMoreOutcome::Superseded);
            }
        };

        if !self.still_applies(issued_at, generation) {
            return Ok(LoadMoreOutcome::Superseded);
        }

        let dogs = match self.hydrator.hydrate(&page.ids).await {
            Ok(dogs) => dogs,
            Err(err) => {
                self.discard_if_stale(issued_at, err)?;
                return Ok(LoadMoreOutcome::Superseded);
            }
        };

        let mut state = self.state.lock();
        if state.latest_epoch != issued_at || state.generation != generation {
            tracing::debug!("Continuation of search #{} discarded", generation);
            return Ok(LoadMoreOutcome::Superseded);
        }

        state.cursor = page.next;
        let appended = Arc::make_mut(&mut state.collection).append(dogs);
        let has_more = state.cursor.is_some();
        let loaded = state.collection.len();
        drop(state);

        tracing::info!(
            "Appended {} records ({} loaded, more: {})",
            appended,
            loaded,
            has_more
        );
        Ok(LoadMoreOutcome::Appended { appended, has_more })
    }

    /// Snapshot of the displayed records.
    pub fn collection(&self) -> Arc<DisplayedCollection> {
        self.state.lock().collection.clone()
    }

    /// Filter of the applied results.
    pub fn filter(&self) -> Option<SearchFilter> {
        self.state.lock().filter.clone()
    }

    pub fn total(&self) -> u64 {
        self.state.lock().total
    }

    pub fn total_pages(&self) -> u64 {
        self.state.lock().total_pages
    }

    /// Whether a continuation cursor is stored.
    pub fn has_more(&self) -> bool {
        self.state.lock().cursor.is_some()
    }

    /// Whether a continuation of the displayed results is in flight.
    pub fn is_loading_more(&self) -> bool {
        let state = self.state.lock();
        state.loading_more == Some(state.generation)
    }

    /// Whether the latest search has not completed yet.
    pub fn is_searching(&self) -> bool {
        self.state.lock().pending.is_some()
    }

    /// Epoch of the most recently issued search.
    pub fn epoch(&self) -> u64 {
        self.state.lock().latest_epoch
    }

    pub fn display_page_size(&self) -> usize {
        self.display_page_size as usize
    }

    fn is_latest(&self, epoch: u64) -> bool {
        self.state.lock().latest_epoch == epoch
    }

    fn still_applies(&self, issued_at: u64, generation: u64) -> bool {
        let state = self.state.lock();
        state.latest_epoch == issued_at && state.generation == generation
    }

    /// Swallow a transport failure of a stale request. Session expiry and
    /// failures of current requests propagate.
    fn discard_if_stale(&self, epoch: u64, err: QueryError) -> QueryResult<()> {
        if err.is_auth_expired() || self.is_latest(epoch) {
            return Err(err);
        }
        tracing::debug!("Ignoring failure of stale request #{}: {}", epoch, err);
        Ok(())
    }
}
