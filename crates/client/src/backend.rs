//! Backend contract consumed by the orchestration layer.

use crate::error::ClientResult;
use async_trait::async_trait;
use kennel_core::{Dog, DogId, ResultPage, SearchCursor, SearchFilter};

/// The catalog service, as seen by the search and hydration components.
///
/// Implementations own credential attachment. Every method reports an
/// unauthenticated session as [`ClientError::Unauthorized`].
///
/// [`ClientError::Unauthorized`]: crate::ClientError::Unauthorized
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /dogs/breeds`
    async fn breeds(&self) -> ClientResult<Vec<String>>;

    /// `GET /dogs/search` for the first page of a filter.
    async fn search(&self, filter: &SearchFilter) -> ClientResult<ResultPage>;

    /// `GET <cursor>` for a continuation page.
    async fn search_next(&self, cursor: &SearchCursor) -> ClientResult<ResultPage>;

    /// `POST /dogs` with at most 100 identifiers.
    async fn dogs(&self, ids: &[DogId]) -> ClientResult<Vec<Dog>>;

    /// `POST /dogs/match`
    async fn match_dog(&self, ids: &[DogId]) -> ClientResult<Option<DogId>>;

    /// `POST /auth/login`
    async fn login(&self, name: &str, email: &str) -> ClientResult<()>;

    /// `POST /auth/logout`
    async fn logout(&self) -> ClientResult<()>;
}
