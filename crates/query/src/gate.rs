//! Uniform handling of unauthenticated responses.
//!
//! Every backend result passes through [`SessionGate::check`]. A 401 from
//! any endpoint flips the route to [`Route::SignIn`] at the point of
//! detection, so no caller has to remember to do it.

use crate::error::{QueryError, QueryResult};
use kennel_client::ClientResult;
use std::sync::Arc;
use tokio::sync::watch;

/// Which view the presentation layer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    SignIn,
    Browse,
}

/// Shared navigation signal.
#[derive(Debug, Clone)]
pub struct SessionGate {
    route: Arc<watch::Sender<Route>>,
}

impl SessionGate {
    pub fn new(initial: Route) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { route: Arc::new(tx) }
    }

    /// Current route.
    pub fn route(&self) -> Route {
        *self.route.borrow()
    }

    /// Subscribe to route changes.
    pub fn subscribe(&self) -> watch::Receiver<Route> {
        self.route.subscribe()
    }

    pub fn enter_browse(&self) {
        self.route.send_replace(Route::Browse);
    }

    pub fn redirect_to_sign_in(&self) {
        self.route.send_replace(Route::SignIn);
    }

    /// Map a backend result, signalling sign-in on 401.
    pub fn check<T>(&self, op: &str, result: ClientResult<T>) -> QueryResult<T> {
        match result {
            Ok(value) => Ok(value),
            Err(err) if err.is_unauthorized() => {
                tracing::warn!("{} rejected the session, redirecting to sign-in", op);
                self.redirect_to_sign_in();
                Err(QueryError::AuthExpired)
            }
            Err(err) => {
                tracing::warn!("{} failed: {}", op, err);
                Err(QueryError::Transport(err))
            }
        }
    }
}

impl Default for SessionGate {
    fn default() -> Self {
        Self::new(Route::SignIn)
    }
}
