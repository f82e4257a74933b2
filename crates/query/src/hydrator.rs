//! Batched hydration of dog identifiers into full records.
//!
//! Identifiers are split into contiguous chunks of at most `batch_size`,
//! one `POST /dogs` per chunk. Chunks may be in flight concurrently but are
//! always reassembled in input order, and a single failing chunk fails the
//! whole call so callers never see a page with holes.

use crate::error::QueryResult;
use crate::gate::SessionGate;
use futures::stream::{self, StreamExt, TryStreamExt};
use kennel_client::Backend;
use kennel_core::{Dog, DogId, HydrationSettings};
use std::collections::HashMap;
use std::sync::Arc;

/// Backend limit on identifiers per hydration request.
pub const MAX_BATCH_SIZE: usize = 100;

/// Resolves identifiers into [`Dog`] records.
pub struct PageHydrator {
    backend: Arc<dyn Backend>,
    gate: SessionGate,
    batch_size: usize,
    max_concurrent_chunks: usize,
}

impl PageHydrator {
    pub fn new(backend: Arc<dyn Backend>, gate: SessionGate, settings: &HydrationSettings) -> Self {
        Self {
            backend,
            gate,
            batch_size: settings.batch_size.clamp(1, MAX_BATCH_SIZE),
            max_concurrent_chunks: settings.max_concurrent_chunks.max(1),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Number of requests needed for `n` identifiers.
    pub fn chunk_count(&self, n: usize) -> usize {
        n.div_ceil(self.batch_size)
    }

    /// Hydrate `ids`, preserving their order.
    pub async fn hydrate(&self, ids: &[DogId]) -> QueryResult<Vec<Dog>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        tracing::debug!(
            "Hydrating {} ids in {} chunks",
            ids.len(),
            self.chunk_count(ids.len())
        );

        // `buffered` yields in submission order regardless of completion order.
        let chunks: Vec<Vec<Dog>> = stream::iter(ids.chunks(self.batch_size))
            .map(|chunk| self.hydrate_chunk(chunk))
            .buffered(self.max_concurrent_chunks)
            .try_collect()
            .await?;

        Ok(chunks.into_iter().flatten().collect())
    }

    /// Hydrate a single identifier.
    pub async fn hydrate_one(&self, id: &DogId) -> QueryResult<Option<Dog>> {
        let mut dogs = self.hydrate(std::slice::from_ref(id)).await?;
        Ok(dogs.pop())
    }

    async fn hydrate_chunk(&self, chunk: &[DogId]) -> QueryResult<Vec<Dog>> {
        let records = self.gate.check("hydrate", self.backend.dogs(chunk).await)?;
        Ok(correlate(chunk, records))
    }
}

/// Order `records` to match `requested` by id.
///
/// Records for ids that were not requested are dropped, and requested ids
/// with no record are skipped.
fn correlate(requested: &[DogId], records: Vec<Dog>) -> Vec<Dog> {
    let received = records.len();
    let mut by_id: HashMap<DogId, Dog> = records
        .into_iter()
        .map(|dog| (dog.id.clone(), dog))
        .collect();

    let ordered: Vec<Dog> = requested
        .iter()
        .filter_map(|id| by_id.remove(id))
        .collect();

    if ordered.len() != requested.len() {
        tracing::warn!(
            "Hydration returned {} of {} requested records",
            ordered.len(),
            requested.len()
        );
    }
    if !by_id.is_empty() {
        tracing::warn!(
            "Dropping {} unrequested records (received {})",
            by_id.len(),
            received
        );
    }

    ordered
}
