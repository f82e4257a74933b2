//! Prefetching of the next cursor page.
//!
//! The presentation layer reports every page change. When the viewed page
//! comes within `lead_pages` UI pages of the end of the loaded records, the
//! coordinator asks the controller for the next cursor page so it is
//! already hydrated when the user gets there.

use crate::controller::{LoadMoreOutcome, SearchController};
use crate::error::QueryResult;
use kennel_core::PrefetchSettings;
use parking_lot::Mutex;
use std::sync::Arc;

/// What a page-change signal led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefetchDecision {
    /// Prefetching is turned off.
    Disabled,
    /// The last page of the sequence is already loaded.
    Exhausted,
    /// A continuation or a fresh search is already running.
    InFlight,
    /// Enough records are buffered ahead of the viewed page.
    NotNeeded,
    /// A continuation was requested.
    Triggered(LoadMoreOutcome),
}

/// Counters for prefetch activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefetchStats {
    pub signals: usize,
    pub triggered: usize,
    pub appended: usize,
    pub skipped_in_flight: usize,
}

/// Whether viewing `page_index` (zero-based) of `page_size` rows, with
/// `loaded` records buffered, calls for the next page.
///
/// Evaluates `p * s >= n - lead * s` as `p * s + lead * s >= n`.
pub fn should_prefetch(page_index: usize, page_size: usize, loaded: usize, lead_pages: usize) -> bool {
    let viewed = page_index.saturating_mul(page_size);
    let lead = lead_pages.saturating_mul(page_size);
    viewed.saturating_add(lead) >= loaded
}

/// Drives continuations from page-change signals.
pub struct PrefetchCoordinator {
    controller: Arc<SearchController>,
    settings: PrefetchSettings,
    stats: Mutex<PrefetchStats>,
}

impl PrefetchCoordinator {
    pub fn new(controller: Arc<SearchController>, settings: PrefetchSettings) -> Self {
        Self {
            controller,
            settings,
            stats: Mutex::new(PrefetchStats::default()),
        }
    }

    /// Handle a page change to `page_index` with `page_size` rows per page.
    pub async fn on_page_change(
        &self,
        page_index: usize,
        page_size: usize,
    ) -> QueryResult<PrefetchDecision> {
        self.stats.lock().signals += 1;

        if !self.settings.enabled {
            return Ok(PrefetchDecision::Disabled);
        }
        if self.controller.is_searching() {
            return Ok(PrefetchDecision::InFlight);
        }
        if !self.controller.has_more() {
            return Ok(PrefetchDecision::Exhausted);
        }
        if self.controller.is_loading_more() {
            self.stats.lock().skipped_in_flight += 1;
            return Ok(PrefetchDecision::InFlight);
        }

        let loaded = self.controller.collection().len();
        if !should_prefetch(page_index, page_size, loaded, self.settings.lead_pages) {
            return Ok(PrefetchDecision::NotNeeded);
        }

        tracing::debug!(
            "Prefetching at page {} (size {}, {} loaded)",
            page_index,
            page_size,
            loaded
        );
        let outcome = self.controller.load_more().await?;

        let mut stats = self.stats.lock();
        match outcome {
            LoadMoreOutcome::Appended { appended, .. } => {
                stats.triggered += 1;
                stats.appended += appended;
            }
            LoadMoreOutcome::AlreadyLoading => stats.skipped_in_flight += 1,
            LoadMoreOutcome::Exhausted | LoadMoreOutcome::Superseded => {}
        }
        Ok(PrefetchDecision::Triggered(outcome))
    }

    /// Whether a continuation for the current search is running.
    pub fn is_loading_more(&self) -> bool {
        self.controller.is_loading_more()
    }

    pub fn stats(&self) -> PrefetchStats {
        self.stats.lock().clone()
    }

    pub fn settings(&self) -> &PrefetchSettings {
        &self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{Route, SessionGate};
    use crate::hydrator::PageHydrator;
    use crate::testing::{numbered_ids, page, Call, ScriptedBackend};
    use kennel_core::{HydrationSettings, SearchFilter, SearchSettings};

    fn coordinator(backend: Arc<ScriptedBackend>, settings: PrefetchSettings) -> PrefetchCoordinator {
        let gate = SessionGate::new(Route::Browse);
        let hydrator = Arc::new(PageHydrator::new(
            backend.clone(),
            gate.clone(),
            &HydrationSettings::default(),
        ));
        let controller = Arc::new(SearchController::new(
            backend,
            gate,
            hydrator,
            &SearchSettings::default(),
        ));
        PrefetchCoordinator::new(controller, settings)
    }

    fn next_calls(backend: &ScriptedBackend) -> usize {
        backend.count(|c| matches!(c, Call::Next(_)))
    }

    #[test]
    fn test_should_prefetch_rule() {
        assert!(should_prefetch(8, 10, 100, 2));
        assert!(!should_prefetch(7, 10, 100, 2));
        assert!(should_prefetch(9, 10, 100, 2));
        // Fewer records than the lead window never underflows.
        assert!(should_prefetch(0, 10, 5, 2));
        assert!(should_prefetch(0, 10, 0, 2));
        assert!(!should_prefetch(0, 10, 100, 0));
        assert!(should_prefetch(usize::MAX, usize::MAX, 100, 2));
    }

    #[tokio::test]
    async fn test_trigger_near_end_issues_one_continuation() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..100), 300, Some("/dogs/search?from=10")));
        backend.set_next_page("/dogs/search?from=10", page(numbered_ids("d", 100..200), 300, Some("/p3")));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();

        let decision = prefetch.on_page_change(8, 10).await.unwrap();

        assert_eq!(
            decision,
            PrefetchDecision::Triggered(LoadMoreOutcome::Appended {
                appended: 100,
                has_more: true,
            })
        );
        assert_eq!(next_calls(&backend), 1);
        assert_eq!(prefetch.controller.collection().len(), 200);
        assert_eq!(prefetch.stats().appended, 100);
    }

    #[tokio::test]
    async fn test_early_pages_do_not_trigger() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..100), 300, Some("/p2")));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();

        for index in 0..8 {
            assert_eq!(
                prefetch.on_page_change(index, 10).await.unwrap(),
                PrefetchDecision::NotNeeded
            );
        }
        assert_eq!(next_calls(&backend), 0);
        assert_eq!(prefetch.stats().signals, 8);
    }

    #[tokio::test]
    async fn test_signals_while_loading_are_dropped() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..100), 300, Some("/p2")));
        backend.set_next_page("/p2", page(numbered_ids("d", 100..200), 300, Some("/p3")));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();
        let hold = backend.hold("next:/p2");

        let first = prefetch.on_page_change(8, 10);
        let repeat = async {
            assert!(prefetch.is_loading_more());
            let decision = prefetch.on_page_change(9, 10).await;
            hold.notify_one();
            decision
        };
        let (first, repeat) = tokio::join!(first, repeat);

        assert!(matches!(first.unwrap(), PrefetchDecision::Triggered(_)));
        assert_eq!(repeat.unwrap(), PrefetchDecision::InFlight);
        assert_eq!(next_calls(&backend), 1);
        assert!(!prefetch.is_loading_more());
    }

    #[tokio::test]
    async fn test_signals_during_fresh_search_are_dropped() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..20), 40, Some("/p2")));
        backend.set_first_page(Some("Beagle"), page(numbered_ids("b", 0..20), 40, Some("/b2")));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();
        let hold = backend.hold("search:Beagle");

        let switch = prefetch.controller.search(SearchFilter::for_breed("Beagle"));
        let signal = async {
            let decision = prefetch.on_page_change(1, 10).await;
            hold.notify_one();
            decision
        };
        let (switch, signal) = tokio::join!(switch, signal);

        assert!(switch.is_ok());
        assert_eq!(signal.unwrap(), PrefetchDecision::InFlight);
        assert_eq!(next_calls(&backend), 0);
    }

    #[tokio::test]
    async fn test_terminal_sequence_is_noop() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..20), 20, None));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();

        assert_eq!(
            prefetch.on_page_change(1, 10).await.unwrap(),
            PrefetchDecision::Exhausted
        );
        assert_eq!(next_calls(&backend), 0);
    }

    #[tokio::test]
    async fn test_disabled() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..20), 40, Some("/p2")));
        let settings = PrefetchSettings {
            enabled: false,
            ..PrefetchSettings::default()
        };
        let prefetch = coordinator(backend.clone(), settings);
        prefetch.controller.search(SearchFilter::default()).await.unwrap();

        assert_eq!(
            prefetch.on_page_change(1, 10).await.unwrap(),
            PrefetchDecision::Disabled
        );
        assert_eq!(next_calls(&backend), 0);
    }

    #[tokio::test]
    async fn test_failed_prefetch_can_retry() {
        let backend = ScriptedBackend::new();
        backend.set_first_page(None, page(numbered_ids("d", 0..20), 40, Some("/p2")));
        backend.set_next_page("/p2", page(numbered_ids("d", 20..40), 40, None));
        let prefetch = coordinator(backend.clone(), PrefetchSettings::default());
        prefetch.controller.search(SearchFilter::default()).await.unwrap();

        backend.fail("next");
        assert!(prefetch.on_page_change(1, 10).await.is_err());
        assert!(!prefetch.is_loading_more());

        backend.recover("next");
        assert!(matches!(
            prefetch.on_page_change(1, 10).await.unwrap(),
            PrefetchDecision::Triggered(LoadMoreOutcome::Appended { appended: 20, has_more: false })
        ));
    }
}
