//! Search and hydration orchestration for the Kennel client.
//!
//! Turns a filter into a stream of fully populated dog records:
//! - Epoch-tagged searches whose stale responses are discarded
//! - Cursor continuation with a per-epoch loading guard
//! - Batched, order-preserving hydration
//! - Prefetching ahead of the viewed page
//! - Favorites and match negotiation

pub mod collection;
pub mod controller;
pub mod error;
pub mod favorites;
pub mod gate;
pub mod hydrator;
pub mod prefetch;
pub mod session;

#[cfg(test)]
mod testing;

pub use collection::DisplayedCollection;
pub use controller::{LoadMoreOutcome, PageSummary, SearchController, SearchOutcome};
pub use error::{QueryError, QueryResult};
pub use favorites::{FavoriteAndMatchManager, FavoriteSet, MatchOutcome};
pub use gate::{Route, SessionGate};
pub use hydrator::{PageHydrator, MAX_BATCH_SIZE};
pub use prefetch::{should_prefetch, PrefetchCoordinator, PrefetchDecision, PrefetchStats};
pub use session::{BrowseSession, InitReport};
