//! Browse session.
//!
//! Wires one backend into the controller, hydrator, prefetch coordinator
//! and favorites manager, and owns the sign-in route and the breed
//! directory.

use crate::controller::{SearchController, SearchOutcome};
use crate::error::{QueryError, QueryResult};
use crate::favorites::FavoriteAndMatchManager;
use crate::gate::{Route, SessionGate};
use crate::hydrator::PageHydrator;
use crate::prefetch::PrefetchCoordinator;
use kennel_client::{Backend, HttpBackend};
use kennel_core::KennelConfig;
use parking_lot::RwLock;
use std::sync::Arc;

/// What `initialize` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitReport {
    /// Breeds loaded into the directory.
    pub breeds: usize,
    /// Outcome of the default search.
    pub search: SearchOutcome,
}

/// Shared session state.
#[derive(Clone)]
pub struct BrowseSession {
    backend: Arc<dyn Backend>,
    gate: SessionGate,
    config: Arc<KennelConfig>,
    controller: Arc<SearchController>,
    prefetch: Arc<PrefetchCoordinator>,
    favorites: Arc<FavoriteAndMatchManager>,
    breeds: Arc<RwLock<Vec<String>>>,
}

impl BrowseSession {
    pub fn new(backend: Arc<dyn Backend>, config: KennelConfig) -> QueryResult<Self> {
        config.validate().map_err(QueryError::InvalidConfig)?;

        let gate = SessionGate::new(Route::SignIn);
        let hydrator = Arc::new(PageHydrator::new(
            backend.clone(),
            gate.clone(),
            &config.hydration,
        ));
        let controller = Arc::new(SearchController::new(
            backend.clone(),
            gate.clone(),
            hydrator.clone(),
            &config.search,
        ));
        let prefetch = Arc::new(PrefetchCoordinator::new(
            controller.clone(),
            config.prefetch.clone(),
        ));
        let favorites = Arc::new(FavoriteAndMatchManager::new(
            backend.clone(),
            gate.clone(),
            hydrator,
        ));

        Ok(Self {
            backend,
            gate,
            config: Arc::new(config),
            controller,
            prefetch,
            favorites,
            breeds: Arc::new(RwLock::new(Vec::new())),
        })
    }

    /// Session over the HTTP backend at `config.backend.base_url`.
    pub fn connect(config: KennelConfig) -> QueryResult<Self> {
        let backend = HttpBackend::new(&config.backend)
            .map_err(|e| QueryError::InvalidConfig(e.to_string()))?;
        Self::new(Arc::new(backend), config)
    }

    /// Open a session and switch to the browse route.
    pub async fn login(&self, name: &str, email: &str) -> QueryResult<()> {
        self.gate.check("login", self.backend.login(name, email).await)?;
        tracing::info!("Signed in as {}", name);
        self.gate.enter_browse();
        Ok(())
    }

    /// Close the session. The route switches to sign-in even if the
    /// request fails.
    pub async fn logout(&self) -> QueryResult<()> {
        let result = self.gate.check("logout", self.backend.logout().await);
        self.gate.redirect_to_sign_in();
        result
    }

    /// Load the breed directory, then run the default search.
    ///
    /// A 401 on the directory stops here. Other directory failures leave it
    /// empty and the search still runs.
    pub async fn initialize(&self) -> QueryResult<InitReport> {
        let breeds = match self.refresh_breeds().await {
            Ok(count) => count,
            Err(QueryError::AuthExpired) => return Err(QueryError::AuthExpired),
            Err(err) => {
                tracing::warn!("Breed directory unavailable: {}", err);
                0
            }
        };

        let search = self
            .controller
            .search(self.config.default_filter())
            .await?;
        Ok(InitReport { breeds, search })
    }

    /// Reload the breed directory. Returns the number of breeds.
    pub async fn refresh_breeds(&self) -> QueryResult<usize> {
        let breeds = self.gate.check("breeds", self.backend.breeds().await)?;
        let count = breeds.len();
        *self.breeds.write() = breeds;
        tracing::info!("Loaded {} breeds", count);
        Ok(count)
    }

    pub fn breeds(&self) -> Vec<String> {
        self.breeds.read().clone()
    }

    pub fn route(&self) -> Route {
        self.gate.route()
    }

    pub fn gate(&self) -> &SessionGate {
        &self.gate
    }

    pub fn config(&self) -> &KennelConfig {
        &self.config
    }

    pub fn controller(&self) -> &Arc<SearchController> {
        &self.controller
    }

    pub fn prefetch(&self) -> &Arc<PrefetchCoordinator> {
        &self.prefetch
    }

    pub fn favorites(&self) -> &Arc<FavoriteAndMatchManager> {
        &self.favorites
    }
}
