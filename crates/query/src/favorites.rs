//! Favorites and match negotiation.

use crate::error::QueryResult;
use crate::gate::SessionGate;
use crate::hydrator::PageHydrator;
use im::OrdSet;
use kennel_client::Backend;
use kennel_core::{Dog, DogId};
use parking_lot::Mutex;
use std::sync::Arc;

/// Immutable set of favorited ids.
///
/// Every toggle produces a new value that shares structure with the old
/// one; holders of an older snapshot are not affected. Iteration order is
/// the id order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoriteSet(Arc<OrdSet<DogId>>);

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of this set with `id` flipped.
    pub fn toggled(&self, id: &DogId) -> Self {
        let ids = if self.0.contains(id) {
            self.0.without(id)
        } else {
            self.0.update(id.clone())
        };
        Self(Arc::new(ids))
    }

    pub fn contains(&self, id: &DogId) -> bool {
        self.0.contains(id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DogId> {
        self.0.iter()
    }

    pub fn to_vec(&self) -> Vec<DogId> {
        self.0.iter().cloned().collect()
    }

    /// Whether both values are the same allocation.
    pub fn same_as(&self, other: &FavoriteSet) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl FromIterator<DogId> for FavoriteSet {
    fn from_iter<I: IntoIterator<Item = DogId>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

/// Result of [`FavoriteAndMatchManager::request_match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No favorites; nothing was sent.
    Skipped,
    /// The backend had no match, or the matched id has no record.
    NoMatch,
    Matched(Dog),
}

struct MatchState {
    result: Option<Dog>,
    /// Sequence number of the last request issued.
    issued: u64,
}

/// Tracks favorites and the last negotiated match.
pub struct FavoriteAndMatchManager {
    backend: Arc<dyn Backend>,
    gate: SessionGate,
    hydrator: Arc<PageHydrator>,
    favorites: Mutex<FavoriteSet>,
    matched: Mutex<MatchState>,
}

impl FavoriteAndMatchManager {
    pub fn new(backend: Arc<dyn Backend>, gate: SessionGate, hydrator: Arc<PageHydrator>) -> Self {
        Self {
            backend,
            gate,
            hydrator,
            favorites: Mutex::new(FavoriteSet::new()),
            matched: Mutex::new(MatchState {
                result: None,
                issued: 0,
            }),
        }
    }

    /// Flip `id` in the favorite set. Returns whether it is now a favorite.
    pub fn toggle(&self, id: &DogId) -> bool {
        let mut favorites = self.favorites.lock();
        *favorites = favorites.toggled(id);
        favorites.contains(id)
    }

    /// Current favorites.
    pub fn favorites(&self) -> FavoriteSet {
        self.favorites.lock().clone()
    }

    pub fn is_favorite(&self, id: &DogId) -> bool {
        self.favorites.lock().contains(id)
    }

    /// Last negotiated match.
    pub fn match_result(&self) -> Option<Dog> {
        self.matched.lock().result.clone()
    }

    /// Ask the backend to pick one dog from the current favorites.
    ///
    /// The stored result changes only when a match is found and hydrated.
    /// A response that arrives after a newer request was issued is returned
    /// but not stored.
    pub async fn request_match(&self) -> QueryResult<MatchOutcome> {
        let snapshot = self.favorites();
        if snapshot.is_empty() {
            tracing::debug!("No favorites; match skipped");
            return Ok(MatchOutcome::Skipped);
        }

        let seq = {
            let mut state = self.matched.lock();
            state.issued += 1;
            state.issued
        };
        tracing::info!("Requesting match among {} favorites", snapshot.len());

        let ids = snapshot.to_vec();
        let Some(id) = self.gate.check("match", self.backend.match_dog(&ids).await)? else {
            tracing::info!("No match returned");
            return Ok(MatchOutcome::NoMatch);
        };

        let Some(dog) = self.hydrator.hydrate_one(&id).await? else {
            tracing::warn!("Matched id {} has no record", id);
            return Ok(MatchOutcome::NoMatch);
        };

        let mut state = self.matched.lock();
        if state.issued == seq {
            state.result = Some(dog.clone());
        }
        drop(state);

        tracing::info!("Matched {} ({})", dog.name, dog.id);
        Ok(MatchOutcome::Matched(dog))
    }
}
